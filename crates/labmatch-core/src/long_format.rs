//! Lossless long format: every lab row inside the window.

use labmatch_model::{CohortPatient, LongRecord};

use crate::matcher::LabIndex;

/// All qualifying lab rows of the processed patients.
///
/// Unlike the matrices, nothing is collapsed: a patient with three A1C
/// results inside the window contributes three rows. The table is sorted by
/// (patient id, test type code, date diff) with a stable sort, so equal keys
/// keep cohort order and then lab input order.
pub fn build_long_format(
    patients: &[CohortPatient],
    labs: &LabIndex<'_>,
    max_date_diff_days: u32,
) -> Vec<LongRecord> {
    let mut rows = Vec::new();
    for patient in patients {
        for lab in labs.rows_for(patient.patient_id.as_str()) {
            let Some(collection_date) = lab.collection_date else {
                continue;
            };
            let Some(days) = lab.days_from(patient.reference_date) else {
                continue;
            };
            if days > max_date_diff_days {
                continue;
            }
            rows.push(LongRecord {
                patient_id: patient.patient_id.clone(),
                reference_date: patient.reference_date,
                collection_date,
                test_type_code: lab.code().clone(),
                test_type_description: lab.description().map(str::to_string),
                result_text: lab.result_text.clone(),
                date_diff_days: days,
            });
        }
    }
    rows.sort_by(|a, b| {
        a.patient_id
            .cmp(&b.patient_id)
            .then_with(|| a.test_type_code.cmp(&b.test_type_code))
            .then_with(|| a.date_diff_days.cmp(&b.date_diff_days))
    });
    rows
}
