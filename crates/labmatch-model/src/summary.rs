//! Run summary counters and source overlap statistics.

use serde::{Deserialize, Serialize};

/// Patient-id overlap between the cohort and one other extract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlapStats {
    /// Name of the compared extract ("labs" or "cancer").
    pub table: String,
    pub cohort_patients: usize,
    pub table_patients: usize,
    pub shared_patients: usize,
    /// Share of distinct cohort patients found in the other extract.
    pub percent_of_cohort: f64,
}

impl OverlapStats {
    pub fn new(
        table: impl Into<String>,
        cohort_patients: usize,
        table_patients: usize,
        shared_patients: usize,
    ) -> Self {
        let percent_of_cohort = if cohort_patients == 0 {
            0.0
        } else {
            shared_patients as f64 * 100.0 / cohort_patients as f64
        };
        Self {
            table: table.into(),
            cohort_patients,
            table_patients,
            shared_patients,
            percent_of_cohort,
        }
    }
}

/// Overlap of the cohort with the lab and cancer extracts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceOverlap {
    pub labs: OverlapStats,
    pub cancer: OverlapStats,
}

/// One resolved duplicate group, kept as a bounded sample for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroupSample {
    pub patient_id: String,
    pub reference_date: String,
    pub test_type_code: String,
    pub rows: usize,
    /// Date diff of the kept row, `None` when no row in the group matched.
    pub kept_date_diff: Option<u32>,
}

/// Counters describing one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub patients_processed: usize,
    pub unique_test_types: usize,
    /// Cells of the pruned result matrix (rows x columns).
    pub total_measurements: usize,
    /// Non-null cells of the pruned result matrix.
    pub non_null_measurements: usize,
    pub columns_before_pruning: usize,
    pub columns_after_pruning: usize,
    pub pruned_columns: Vec<String>,
    pub duplicate_groups: usize,
    pub matrix_rows: usize,
    pub long_format_rows: usize,
    pub suffix_rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap: Option<SourceOverlap>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl RunSummary {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Share of result cells holding a value, in percent.
    pub fn fill_rate(&self) -> f64 {
        if self.total_measurements == 0 {
            0.0
        } else {
            self.non_null_measurements as f64 * 100.0 / self.total_measurements as f64
        }
    }
}
