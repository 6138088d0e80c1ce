//! Normalized source records.

use chrono::NaiveDate;

use crate::ids::{PatientId, TestType, TestTypeCode};

/// One cohort row: a patient and the date its labs are matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortPatient {
    pub patient_id: PatientId,
    pub reference_date: NaiveDate,
}

impl CohortPatient {
    pub fn new(patient_id: PatientId, reference_date: NaiveDate) -> Self {
        Self {
            patient_id,
            reference_date,
        }
    }
}

/// One laboratory result row.
///
/// `result_text` is opaque: numeric-looking values are never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabObservation {
    pub patient_id: PatientId,
    /// `None` when the source cell was blank; such rows never fall in a window.
    pub collection_date: Option<NaiveDate>,
    pub test_type: TestType,
    pub result_text: String,
}

impl LabObservation {
    pub fn code(&self) -> &TestTypeCode {
        &self.test_type.code
    }

    pub fn description(&self) -> Option<&str> {
        self.test_type.label.as_deref()
    }

    /// Absolute whole-day distance between collection and reference date.
    pub fn days_from(&self, reference_date: NaiveDate) -> Option<u32> {
        let collected = self.collection_date?;
        let days = (collected - reference_date).num_days().unsigned_abs();
        u32::try_from(days).ok()
    }
}

/// Cancer diagnosis extract, carried through as text.
///
/// Only the required columns are kept, in their configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancerTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Position of the patient id column within `headers`.
    pub patient_id_index: usize,
}

impl CancerTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn patient_ids(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(|row| row.get(self.patient_id_index))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn observation(collected: Option<NaiveDate>) -> LabObservation {
        LabObservation {
            patient_id: PatientId::new("P1").unwrap(),
            collection_date: collected,
            test_type: TestType::new(TestTypeCode::new("A1C").unwrap(), None),
            result_text: "6.5".to_string(),
        }
    }

    #[test]
    fn days_from_is_absolute() {
        let reference = date(2020, 1, 10);
        assert_eq!(observation(Some(date(2020, 1, 5))).days_from(reference), Some(5));
        assert_eq!(observation(Some(date(2020, 1, 15))).days_from(reference), Some(5));
        assert_eq!(observation(Some(reference)).days_from(reference), Some(0));
        assert_eq!(observation(None).days_from(reference), None);
    }

    #[test]
    fn cancer_patient_ids_skip_blank_cells() {
        let table = CancerTable {
            headers: vec!["patient_id".to_string(), "stage".to_string()],
            rows: vec![
                vec!["P1".to_string(), "II".to_string()],
                vec![" ".to_string(), "I".to_string()],
            ],
            patient_id_index: 0,
        };
        assert_eq!(table.patient_ids().collect::<Vec<_>>(), vec!["P1"]);
    }
}
