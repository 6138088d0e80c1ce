//! Suffix-disambiguated wide matrices built from the long format.
//!
//! Every long-format row gets a 1-based ordinal within its (patient, code)
//! group, in long-table order. Rows are keyed by `<patient>_<ordinal>` and
//! the reference date, so a patient with three same-type results occupies
//! three rows instead of being collapsed to one.

use std::collections::HashMap;

use chrono::NaiveDate;

use labmatch_model::{LongRecord, PatientId, TestTypeCode, WideMatrix, WideRow};

use crate::universe::TestTypeUniverse;

/// Suffixed result and date matrices, column-aligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixMatrices {
    pub results: WideMatrix<String>,
    pub dates: WideMatrix<NaiveDate>,
}

/// Ordinal of each long row within its (patient, code) group.
///
/// Ordinals follow the order of `rows`. The long format is sorted by
/// ascending date diff, so `_1` is the result nearest the reference date,
/// not the first row of the lab extract.
pub fn assign_ordinals(rows: &[LongRecord]) -> Vec<usize> {
    let mut counters: HashMap<(&PatientId, &TestTypeCode), usize> = HashMap::new();
    rows.iter()
        .map(|row| {
            let counter = counters
                .entry((&row.patient_id, &row.test_type_code))
                .or_insert(0);
            *counter += 1;
            *counter
        })
        .collect()
}

/// Pivot the long format on (unique patient id, reference date) x code.
///
/// Columns are the codes present in `rows`, in universe order.
pub fn build_suffix_matrices(rows: &[LongRecord], universe: &TestTypeUniverse) -> SuffixMatrices {
    let columns = universe.ordered(rows.iter().map(|row| &row.test_type_code));
    let column_of: HashMap<&TestTypeCode, usize> =
        columns.iter().enumerate().map(|(i, c)| (c, i)).collect();
    let width = columns.len();

    let mut results = WideMatrix::new(columns.clone());
    let mut dates = WideMatrix::new(columns.clone());
    let mut row_of: HashMap<(String, NaiveDate), usize> = HashMap::new();

    for (row, ordinal) in rows.iter().zip(assign_ordinals(rows)) {
        let unique_id = row.patient_id.with_ordinal(ordinal);
        let slot = *row_of
            .entry((unique_id.clone(), row.reference_date))
            .or_insert_with(|| {
                results.rows.push(WideRow {
                    row_id: unique_id.clone(),
                    original_patient_id: Some(row.patient_id.clone()),
                    reference_date: row.reference_date,
                    cells: vec![None; width],
                });
                dates.rows.push(WideRow {
                    row_id: unique_id.clone(),
                    original_patient_id: Some(row.patient_id.clone()),
                    reference_date: row.reference_date,
                    cells: vec![None; width],
                });
                results.rows.len() - 1
            });
        let Some(&column) = column_of.get(&row.test_type_code) else {
            continue;
        };
        results.rows[slot].cells[column] = Some(row.result_text.clone());
        dates.rows[slot].cells[column] = Some(row.collection_date);
    }

    SuffixMatrices { results, dates }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labmatch_model::{LabObservation, TestType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn long(patient: &str, code: &str, result: &str, days: u32) -> LongRecord {
        LongRecord {
            patient_id: PatientId::new(patient).unwrap(),
            reference_date: date(2020, 1, 10),
            collection_date: date(2020, 1, 10) + chrono::Days::new(u64::from(days)),
            test_type_code: TestTypeCode::new(code).unwrap(),
            test_type_description: None,
            result_text: result.to_string(),
            date_diff_days: days,
        }
    }

    fn universe(codes: &[&str]) -> TestTypeUniverse {
        let labs: Vec<LabObservation> = codes
            .iter()
            .map(|code| LabObservation {
                patient_id: PatientId::new("P").unwrap(),
                collection_date: None,
                test_type: TestType::new(TestTypeCode::new(*code).unwrap(), None),
                result_text: String::new(),
            })
            .collect();
        TestTypeUniverse::from_labs(&labs)
    }

    #[test]
    fn ordinals_count_within_patient_and_code() {
        let rows = vec![
            long("P1", "A1C", "a", 1),
            long("P1", "CBC", "b", 1),
            long("P1", "CBC", "c", 2),
            long("P2", "CBC", "d", 0),
            long("P1", "CBC", "e", 3),
        ];
        assert_eq!(assign_ordinals(&rows), vec![1, 1, 2, 1, 3]);
    }

    #[test]
    fn three_same_type_rows_become_three_matrix_rows() {
        let rows = vec![
            long("P1", "A1C", "a1", 2),
            long("P1", "CBC", "c1", 1),
            long("P1", "CBC", "c2", 4),
            long("P1", "CBC", "c3", 9),
        ];
        let matrices = build_suffix_matrices(&rows, &universe(&["GLU", "CBC", "A1C"]));
        let results = &matrices.results;

        assert_eq!(results.column_names(), vec!["CBC", "A1C"]);
        let ids: Vec<&str> = results.rows.iter().map(|r| r.row_id.as_str()).collect();
        assert_eq!(ids, vec!["P1_1", "P1_2", "P1_3"]);
        assert!(results.rows.iter().all(|r| r.original_patient_id.is_some()));
        assert_eq!(
            results.rows[0].cells,
            vec![Some("c1".to_string()), Some("a1".to_string())]
        );
        assert_eq!(results.rows[2].cells, vec![Some("c3".to_string()), None]);
        assert_eq!(
            results.rows[1].original_patient_id.as_ref().map(PatientId::as_str),
            Some("P1")
        );
        assert_eq!(matrices.dates.rows[2].cells[0], Some(date(2020, 1, 19)));
        assert_eq!(matrices.dates.columns, results.columns);
    }

    #[test]
    fn empty_long_format_gives_empty_matrices() {
        let matrices = build_suffix_matrices(&[], &universe(&["A1C"]));
        assert_eq!(matrices.results.row_count(), 0);
        assert_eq!(matrices.results.column_count(), 0);
    }
}
