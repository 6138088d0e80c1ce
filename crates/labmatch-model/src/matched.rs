//! Matcher output and the long tables derived from it.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::{PatientId, TestTypeCode};

/// Distance in days between a chosen lab row and the reference date.
///
/// `NoMatch` orders after every `Days` value, so "minimal diff" comparisons
/// never prefer an absent match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DateDiff {
    Days(u32),
    NoMatch,
}

impl DateDiff {
    pub fn days(self) -> Option<u32> {
        match self {
            DateDiff::Days(days) => Some(days),
            DateDiff::NoMatch => None,
        }
    }

    pub fn is_match(self) -> bool {
        matches!(self, DateDiff::Days(_))
    }
}

impl fmt::Display for DateDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateDiff::Days(days) => write!(f, "{days}"),
            DateDiff::NoMatch => f.write_str("NA"),
        }
    }
}

/// Nearest lab row for one (patient, reference date, test type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRecord {
    pub patient_id: PatientId,
    /// Reference date `date_diff` is measured from.
    pub reference_date: NaiveDate,
    /// Requested code, or the chosen row's code when the match was unrestricted.
    pub test_type_code: Option<TestTypeCode>,
    pub result_text: Option<String>,
    pub collection_date: Option<NaiveDate>,
    pub date_diff: DateDiff,
}

impl MatchedRecord {
    /// The record returned when no lab row qualifies.
    pub fn no_match(
        patient_id: PatientId,
        reference_date: NaiveDate,
        test_type_code: Option<TestTypeCode>,
    ) -> Self {
        Self {
            patient_id,
            reference_date,
            test_type_code,
            result_text: None,
            collection_date: None,
            date_diff: DateDiff::NoMatch,
        }
    }

    pub fn is_match(&self) -> bool {
        self.date_diff.is_match()
    }
}

/// A matched record joined to a cohort reference date.
///
/// Rows of the deduplicated detail table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedDetail {
    pub patient_id: PatientId,
    pub reference_date: NaiveDate,
    pub test_type_code: TestTypeCode,
    pub result_text: Option<String>,
    pub collection_date: Option<NaiveDate>,
    pub date_diff: DateDiff,
}

impl MatchedDetail {
    pub fn key(&self) -> (&PatientId, NaiveDate, &TestTypeCode) {
        (&self.patient_id, self.reference_date, &self.test_type_code)
    }
}

/// One qualifying lab observation in the lossless long format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongRecord {
    pub patient_id: PatientId,
    pub reference_date: NaiveDate,
    pub collection_date: NaiveDate,
    pub test_type_code: TestTypeCode,
    pub test_type_description: Option<String>,
    pub result_text: String,
    pub date_diff_days: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_match_orders_last() {
        assert!(DateDiff::Days(0) < DateDiff::Days(1));
        assert!(DateDiff::Days(u32::MAX) < DateDiff::NoMatch);
        assert_eq!(
            [DateDiff::NoMatch, DateDiff::Days(3), DateDiff::Days(1)]
                .into_iter()
                .min(),
            Some(DateDiff::Days(1))
        );
    }

    #[test]
    fn no_match_record_is_empty() {
        let record = MatchedRecord::no_match(
            PatientId::new("P1").unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 10).unwrap(),
            Some(TestTypeCode::new("GLU").unwrap()),
        );
        assert!(!record.is_match());
        assert!(record.result_text.is_none());
        assert!(record.collection_date.is_none());
        assert_eq!(record.date_diff.days(), None);
        assert_eq!(record.date_diff.to_string(), "NA");
    }
}
