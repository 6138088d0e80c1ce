//! Configuration options for a matching run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ModelError;

/// Default half-width of the matching window, in days.
pub const DEFAULT_MAX_DATE_DIFF_DAYS: u32 = 365;

/// Default number of cohort patients processed.
pub const DEFAULT_PATIENT_LIMIT: usize = 5;

/// Default number of patients between two progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// How many cohort rows (in input order) a run processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientLimit {
    Bounded(usize),
    Unbounded,
}

impl PatientLimit {
    /// Number of rows taken from a cohort of `available` rows.
    pub fn take(self, available: usize) -> usize {
        match self {
            PatientLimit::Bounded(limit) => limit.min(available),
            PatientLimit::Unbounded => available,
        }
    }
}

impl Default for PatientLimit {
    fn default() -> Self {
        PatientLimit::Bounded(DEFAULT_PATIENT_LIMIT)
    }
}

impl fmt::Display for PatientLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatientLimit::Bounded(limit) => write!(f, "{limit}"),
            PatientLimit::Unbounded => f.write_str("unbounded"),
        }
    }
}

impl FromStr for PatientLimit {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if ["unbounded", "all", "none"]
            .iter()
            .any(|word| trimmed.eq_ignore_ascii_case(word))
        {
            return Ok(PatientLimit::Unbounded);
        }
        match trimmed.parse::<usize>() {
            Ok(limit) if limit > 0 => Ok(PatientLimit::Bounded(limit)),
            _ => Err(ModelError::InvalidPatientLimit(value.to_string())),
        }
    }
}

impl Serialize for PatientLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PatientLimit::Bounded(limit) => serializer.serialize_u64(*limit as u64),
            PatientLimit::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

impl<'de> Deserialize<'de> for PatientLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Count(u64),
            Word(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Count(0) => Err(serde::de::Error::custom(ModelError::InvalidPatientLimit(
                "0".to_string(),
            ))),
            Repr::Count(limit) => usize::try_from(limit)
                .map(PatientLimit::Bounded)
                .map_err(serde::de::Error::custom),
            Repr::Word(word) => word.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Options controlling the matching and reshape stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Largest accepted |collection date - reference date|, in days.
    pub max_date_diff_days: u32,
    /// Cohort rows processed, in input order.
    pub patient_limit: PatientLimit,
    /// Drop matrix columns whose code is made of digits only.
    pub prune_digit_only_columns: bool,
    /// Recompute even when stored outputs match the current inputs.
    pub force_reprocess: bool,
    /// Patients between two progress reports.
    pub progress_interval: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_date_diff_days: DEFAULT_MAX_DATE_DIFF_DAYS,
            patient_limit: PatientLimit::default(),
            prune_digit_only_columns: true,
            force_reprocess: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_date_diff_days(mut self, days: u32) -> Self {
        self.max_date_diff_days = days;
        self
    }

    #[must_use]
    pub fn with_patient_limit(mut self, limit: PatientLimit) -> Self {
        self.patient_limit = limit;
        self
    }

    #[must_use]
    pub fn with_prune_digit_only_columns(mut self, enable: bool) -> Self {
        self.prune_digit_only_columns = enable;
        self
    }

    #[must_use]
    pub fn with_force_reprocess(mut self, enable: bool) -> Self {
        self.force_reprocess = enable;
        self
    }

    #[must_use]
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Options that change computed outputs. `force_reprocess` and the
    /// progress interval do not, so two runs differing only there share a
    /// cache entry.
    pub fn cache_key(&self) -> String {
        format!(
            "max_date_diff_days={};patient_limit={};prune_digit_only_columns={}",
            self.max_date_diff_days, self.patient_limit, self.prune_digit_only_columns
        )
    }
}

/// Required cohort column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CohortColumns {
    pub patient_id: String,
    pub reference_date: String,
}

impl Default for CohortColumns {
    fn default() -> Self {
        Self {
            patient_id: "patient_id".to_string(),
            reference_date: "reference_date".to_string(),
        }
    }
}

impl CohortColumns {
    pub fn required(&self) -> Vec<&str> {
        vec![self.patient_id.as_str(), self.reference_date.as_str()]
    }
}

/// Required lab column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabColumns {
    pub patient_id: String,
    pub collection_date: String,
    pub test_type_code: String,
    pub test_type_description: String,
    pub result_text: String,
}

impl Default for LabColumns {
    fn default() -> Self {
        Self {
            patient_id: "patient_id".to_string(),
            collection_date: "collection_date".to_string(),
            test_type_code: "test_type_code".to_string(),
            test_type_description: "test_type_description".to_string(),
            result_text: "result_text".to_string(),
        }
    }
}

impl LabColumns {
    pub fn required(&self) -> Vec<&str> {
        vec![
            self.patient_id.as_str(),
            self.collection_date.as_str(),
            self.test_type_code.as_str(),
            self.test_type_description.as_str(),
            self.result_text.as_str(),
        ]
    }
}

/// Required cancer diagnosis column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CancerColumns {
    pub patient_id: String,
    pub diagnosis_date: String,
    pub icd10_code: String,
    pub icd10_description: String,
    pub morphology: String,
    pub behaviour: String,
    pub stage: String,
}

impl Default for CancerColumns {
    fn default() -> Self {
        Self {
            patient_id: "patient_id".to_string(),
            diagnosis_date: "diagnosis_date".to_string(),
            icd10_code: "icd10_code".to_string(),
            icd10_description: "icd10_description".to_string(),
            morphology: "morphology".to_string(),
            behaviour: "behaviour".to_string(),
            stage: "stage".to_string(),
        }
    }
}

impl CancerColumns {
    pub fn required(&self) -> Vec<&str> {
        vec![
            self.patient_id.as_str(),
            self.diagnosis_date.as_str(),
            self.icd10_code.as_str(),
            self.icd10_description.as_str(),
            self.morphology.as_str(),
            self.behaviour.as_str(),
            self.stage.as_str(),
        ]
    }
}

/// Column names expected in each source extract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceColumns {
    pub cohort: CohortColumns,
    pub labs: LabColumns,
    pub cancer: CancerColumns,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_limit_parses_words_and_counts() {
        assert_eq!("5".parse::<PatientLimit>(), Ok(PatientLimit::Bounded(5)));
        assert_eq!(
            "Unbounded".parse::<PatientLimit>(),
            Ok(PatientLimit::Unbounded)
        );
        assert_eq!("all".parse::<PatientLimit>(), Ok(PatientLimit::Unbounded));
        assert!("0".parse::<PatientLimit>().is_err());
        assert!("-3".parse::<PatientLimit>().is_err());
        assert!("many".parse::<PatientLimit>().is_err());
    }

    #[test]
    fn patient_limit_take() {
        assert_eq!(PatientLimit::Bounded(5).take(3), 3);
        assert_eq!(PatientLimit::Bounded(5).take(10), 5);
        assert_eq!(PatientLimit::Unbounded.take(10), 10);
    }

    #[test]
    fn defaults_match_documented_values() {
        let options = AnalysisOptions::default();
        assert_eq!(options.max_date_diff_days, 365);
        assert_eq!(options.patient_limit, PatientLimit::Bounded(5));
        assert!(options.prune_digit_only_columns);
        assert!(!options.force_reprocess);
    }

    #[test]
    fn cache_key_ignores_force_flag() {
        let base = AnalysisOptions::default();
        let forced = base.clone().with_force_reprocess(true).with_progress_interval(1);
        assert_eq!(base.cache_key(), forced.cache_key());
        let wider = base.clone().with_max_date_diff_days(30);
        assert_ne!(base.cache_key(), wider.cache_key());
    }
}
