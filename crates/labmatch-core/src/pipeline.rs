//! One analysis run: match, reshape, long format, suffix matrices.

use std::time::Instant;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, info_span};

use labmatch_model::{
    AnalysisOptions, CohortPatient, LabObservation, LongRecord, MatchedDetail, MatchedRecord,
    PatientLimit, RunSummary, TestTypeCode, WideMatrix,
};

use crate::batch::{ProgressSink, match_cohort, select_patients};
use crate::long_format::build_long_format;
use crate::matcher::LabIndex;
use crate::reshape::{
    ColumnPredicate, DigitOnly, DuplicateReport, Reshaped, columns_to_prune, prune_pair, reshape,
};
use crate::suffix::{SuffixMatrices, build_suffix_matrices};
use crate::universe::TestTypeUniverse;

/// Errors raised before any computation starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("invalid option {option}: {message}")]
    InvalidOption {
        option: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Normalized inputs of one run.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisInput<'a> {
    pub cohort: &'a [CohortPatient],
    pub labs: &'a [LabObservation],
}

/// Every table produced by one run, plus its counters.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub universe: TestTypeUniverse,
    pub matched: Vec<MatchedRecord>,
    pub results: WideMatrix<String>,
    pub dates: WideMatrix<NaiveDate>,
    pub details: Vec<MatchedDetail>,
    pub long_format: Vec<LongRecord>,
    pub suffix: SuffixMatrices,
    pub duplicates: DuplicateReport,
    pub summary: RunSummary,
}

/// Reject option values the run cannot honor.
pub fn validate_options(options: &AnalysisOptions) -> Result<()> {
    if options.max_date_diff_days == 0 {
        return Err(AnalysisError::InvalidOption {
            option: "max_date_diff_days",
            message: "must be a positive number of days".to_string(),
        });
    }
    if options.patient_limit == PatientLimit::Bounded(0) {
        return Err(AnalysisError::InvalidOption {
            option: "patient_limit",
            message: "must be positive or \"unbounded\"".to_string(),
        });
    }
    if options.progress_interval == 0 {
        return Err(AnalysisError::InvalidOption {
            option: "progress_interval",
            message: "must be positive".to_string(),
        });
    }
    Ok(())
}

/// Run the analysis with the digit-only pruning rule.
pub fn run_analysis(
    input: AnalysisInput<'_>,
    options: &AnalysisOptions,
    progress: &mut dyn ProgressSink,
) -> Result<AnalysisOutput> {
    run_analysis_with_predicate(input, options, &DigitOnly, progress)
}

/// Run the analysis, pruning columns selected by `predicate` when
/// `options.prune_digit_only_columns` is set.
pub fn run_analysis_with_predicate(
    input: AnalysisInput<'_>,
    options: &AnalysisOptions,
    predicate: &dyn ColumnPredicate,
    progress: &mut dyn ProgressSink,
) -> Result<AnalysisOutput> {
    validate_options(options)?;
    let span = info_span!(
        "analysis",
        max_date_diff_days = options.max_date_diff_days,
        patient_limit = %options.patient_limit
    );
    let _guard = span.enter();
    let run_start = Instant::now();

    let patients = select_patients(input.cohort, options.patient_limit);
    let universe = TestTypeUniverse::from_labs(input.labs);
    let index = LabIndex::new(input.labs);
    let columns: Vec<TestTypeCode> = universe.codes().cloned().collect();
    let prune = options.prune_digit_only_columns.then_some(predicate);

    let matched = info_span!("match").in_scope(|| {
        match_cohort(
            patients,
            &index,
            &universe,
            options.max_date_diff_days,
            options.progress_interval,
            progress,
        )
    });

    let Reshaped {
        results,
        dates,
        details,
        duplicates,
        columns_before_pruning,
        pruned,
    } = info_span!("reshape").in_scope(|| {
        let start = Instant::now();
        let reshaped = reshape(&matched, patients, &columns, prune);
        info!(
            rows = reshaped.results.row_count(),
            columns = reshaped.results.column_count(),
            duplicate_groups = reshaped.duplicates.groups,
            duration_ms = start.elapsed().as_millis(),
            "reshape complete"
        );
        reshaped
    });

    let long_format = info_span!("long_format").in_scope(|| {
        let start = Instant::now();
        let rows = build_long_format(patients, &index, options.max_date_diff_days);
        info!(
            rows = rows.len(),
            duration_ms = start.elapsed().as_millis(),
            "long format complete"
        );
        rows
    });

    let suffix = info_span!("suffix").in_scope(|| {
        let start = Instant::now();
        let mut suffix = build_suffix_matrices(&long_format, &universe);
        if let Some(predicate) = prune {
            let drop = columns_to_prune(&suffix.results.columns, predicate);
            prune_pair(&mut suffix.results, &mut suffix.dates, &drop);
        }
        info!(
            rows = suffix.results.row_count(),
            columns = suffix.results.column_count(),
            duration_ms = start.elapsed().as_millis(),
            "suffix matrices complete"
        );
        suffix
    });

    let mut warnings = Vec::new();
    if !duplicates.is_empty() {
        warnings.push(format!(
            "{} duplicate (patient, reference date, test type) groups resolved by minimal date diff",
            duplicates.groups
        ));
    }

    let summary = RunSummary {
        patients_processed: patients.len(),
        unique_test_types: universe.len(),
        total_measurements: results.total_cells(),
        non_null_measurements: results.non_null_count(),
        columns_before_pruning,
        columns_after_pruning: results.column_count(),
        pruned_columns: pruned.iter().map(ToString::to_string).collect(),
        duplicate_groups: duplicates.groups,
        matrix_rows: results.row_count(),
        long_format_rows: long_format.len(),
        suffix_rows: suffix.results.row_count(),
        overlap: None,
        warnings,
    };

    info!(
        patients = summary.patients_processed,
        test_types = summary.unique_test_types,
        non_null = summary.non_null_measurements,
        total = summary.total_measurements,
        duration_ms = run_start.elapsed().as_millis(),
        "analysis complete"
    );

    Ok(AnalysisOutput {
        universe,
        matched,
        results,
        dates,
        details,
        long_format,
        suffix,
        duplicates,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::NoProgress;

    #[test]
    fn invalid_options_are_rejected() {
        let input = AnalysisInput {
            cohort: &[],
            labs: &[],
        };
        let zero_window = AnalysisOptions::default().with_max_date_diff_days(0);
        let err = run_analysis(input, &zero_window, &mut NoProgress).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InvalidOption {
                option: "max_date_diff_days",
                ..
            }
        ));

        let zero_limit = AnalysisOptions::default().with_patient_limit(PatientLimit::Bounded(0));
        assert!(validate_options(&zero_limit).is_err());
        assert!(validate_options(&AnalysisOptions::default()).is_ok());
    }

    #[test]
    fn empty_inputs_give_empty_tables() {
        let input = AnalysisInput {
            cohort: &[],
            labs: &[],
        };
        let output = run_analysis(input, &AnalysisOptions::default(), &mut NoProgress).unwrap();
        assert_eq!(output.summary.patients_processed, 0);
        assert_eq!(output.results.row_count(), 0);
        assert!(output.long_format.is_empty());
        assert!(!output.summary.has_warnings());
    }
}
