//! Nearest-date matching of lab rows to a reference date.

use std::collections::HashMap;

use chrono::NaiveDate;

use labmatch_model::{DateDiff, LabObservation, MatchedRecord, PatientId, TestTypeCode};

/// Lab rows grouped by patient id, input order preserved within a patient.
#[derive(Debug, Default)]
pub struct LabIndex<'a> {
    by_patient: HashMap<&'a str, Vec<&'a LabObservation>>,
}

impl<'a> LabIndex<'a> {
    pub fn new(labs: &'a [LabObservation]) -> Self {
        let mut by_patient: HashMap<&'a str, Vec<&'a LabObservation>> = HashMap::new();
        for lab in labs {
            by_patient.entry(lab.patient_id.as_str()).or_default().push(lab);
        }
        Self { by_patient }
    }

    /// The patient's rows, in input order.
    pub fn rows_for(&self, patient_id: &str) -> &[&'a LabObservation] {
        self.by_patient
            .get(patient_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Pick the lab row closest to `reference_date` for one patient.
///
/// Rows are filtered to `patient_id` and, when given, to `test_type_code`.
/// Rows without a collection date or further than `max_date_diff_days`
/// away never qualify. The strictly smallest distance wins; on a tie the
/// row seen first in `labs` is kept. When nothing qualifies the no-match
/// record is returned.
pub fn match_nearest<'a>(
    patient_id: &PatientId,
    reference_date: NaiveDate,
    labs: impl IntoIterator<Item = &'a LabObservation>,
    test_type_code: Option<&TestTypeCode>,
    max_date_diff_days: u32,
) -> MatchedRecord {
    let mut best: Option<(&LabObservation, u32)> = None;
    for lab in labs {
        if lab.patient_id != *patient_id {
            continue;
        }
        if test_type_code.is_some_and(|code| lab.code() != code) {
            continue;
        }
        let Some(days) = lab.days_from(reference_date) else {
            continue;
        };
        if days > max_date_diff_days {
            continue;
        }
        if best.is_none_or(|(_, best_days)| days < best_days) {
            best = Some((lab, days));
        }
    }

    match best {
        Some((lab, days)) => MatchedRecord {
            patient_id: patient_id.clone(),
            reference_date,
            test_type_code: Some(lab.code().clone()),
            result_text: Some(lab.result_text.clone()),
            collection_date: lab.collection_date,
            date_diff: DateDiff::Days(days),
        },
        None => MatchedRecord::no_match(patient_id.clone(), reference_date, test_type_code.cloned()),
    }
}
