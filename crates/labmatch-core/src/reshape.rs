//! Matched records to wide result and date matrices.
//!
//! The reshape runs in four steps:
//! 1. key every matched record by the cohort row it was matched for,
//! 2. collapse (patient, reference date, code) groups with more than one row,
//! 3. pivot to one row per cohort (patient, reference date),
//! 4. optionally drop columns selected by a [`ColumnPredicate`].

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use labmatch_model::{
    CohortPatient, DuplicateGroupSample, MatchedDetail, MatchedRecord, PatientId, TestTypeCode,
    WideMatrix, WideRow,
};

/// Resolved duplicate groups kept in the report.
pub const DUPLICATE_SAMPLE_SIZE: usize = 5;

/// Decides which matrix columns are dropped.
pub trait ColumnPredicate {
    fn should_drop(&self, code: &TestTypeCode) -> bool;
}

/// Drops codes made of ASCII digits only.
#[derive(Debug, Default, Clone, Copy)]
pub struct DigitOnly;

impl ColumnPredicate for DigitOnly {
    fn should_drop(&self, code: &TestTypeCode) -> bool {
        code.is_digit_only()
    }
}

impl<F> ColumnPredicate for F
where
    F: Fn(&TestTypeCode) -> bool,
{
    fn should_drop(&self, code: &TestTypeCode) -> bool {
        self(code)
    }
}

/// Duplicate groups found in the joined table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    /// Groups that had more than one row.
    pub groups: usize,
    /// Rows removed while collapsing them.
    pub rows_removed: usize,
    /// The first few groups, in first-appearance order.
    pub samples: Vec<DuplicateGroupSample>,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.groups == 0
    }
}

/// Output of [`reshape`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reshaped {
    pub results: WideMatrix<String>,
    pub dates: WideMatrix<NaiveDate>,
    /// Deduplicated long detail table.
    pub details: Vec<MatchedDetail>,
    pub duplicates: DuplicateReport,
    pub columns_before_pruning: usize,
    /// Dropped codes, in universe order.
    pub pruned: Vec<TestTypeCode>,
}

/// Attach reference dates to matched records.
///
/// Each record stays on the cohort row it was matched for: it is kept only
/// when its own (patient, reference date) is in `cohort`. A patient listed
/// under two reference dates therefore gets two independent rows. Records
/// without a code cannot be keyed and are left out.
pub fn join_reference_dates(
    records: &[MatchedRecord],
    cohort: &[CohortPatient],
) -> Vec<MatchedDetail> {
    let keys: HashSet<(&PatientId, NaiveDate)> = cohort
        .iter()
        .map(|patient| (&patient.patient_id, patient.reference_date))
        .collect();

    let mut joined = Vec::with_capacity(records.len());
    for record in records {
        let Some(code) = &record.test_type_code else {
            continue;
        };
        if !keys.contains(&(&record.patient_id, record.reference_date)) {
            continue;
        }
        joined.push(MatchedDetail {
            patient_id: record.patient_id.clone(),
            reference_date: record.reference_date,
            test_type_code: code.clone(),
            result_text: record.result_text.clone(),
            collection_date: record.collection_date,
            date_diff: record.date_diff,
        });
    }
    joined
}

/// Collapse rows sharing (patient, reference date, code).
///
/// The row with the smallest date diff is kept (no-match ranks last); on a
/// tie the first-encountered row stays. Groups keep their first-appearance
/// position.
pub fn resolve_duplicates(rows: Vec<MatchedDetail>) -> (Vec<MatchedDetail>, DuplicateReport) {
    let mut kept: Vec<MatchedDetail> = Vec::with_capacity(rows.len());
    let mut sizes: Vec<usize> = Vec::with_capacity(rows.len());
    let mut slots: HashMap<(PatientId, NaiveDate, TestTypeCode), usize> = HashMap::new();

    for row in rows {
        let key = (
            row.patient_id.clone(),
            row.reference_date,
            row.test_type_code.clone(),
        );
        match slots.get(&key) {
            Some(&slot) => {
                sizes[slot] += 1;
                if row.date_diff < kept[slot].date_diff {
                    kept[slot] = row;
                }
            }
            None => {
                slots.insert(key, kept.len());
                kept.push(row);
                sizes.push(1);
            }
        }
    }

    let mut report = DuplicateReport::default();
    for (row, &size) in kept.iter().zip(&sizes) {
        if size < 2 {
            continue;
        }
        report.groups += 1;
        report.rows_removed += size - 1;
        if report.samples.len() < DUPLICATE_SAMPLE_SIZE {
            report.samples.push(DuplicateGroupSample {
                patient_id: row.patient_id.to_string(),
                reference_date: row.reference_date.to_string(),
                test_type_code: row.test_type_code.to_string(),
                rows: size,
                kept_date_diff: row.date_diff.days(),
            });
        }
    }
    (kept, report)
}

/// Pivot duplicate-free details into result and date matrices.
///
/// One row per distinct (patient, reference date) of `cohort`, in cohort
/// order, whether or not anything matched; one column per entry of
/// `columns`, in that order. Details outside the cohort are ignored.
pub fn pivot(
    details: &[MatchedDetail],
    cohort: &[CohortPatient],
    columns: &[TestTypeCode],
) -> (WideMatrix<String>, WideMatrix<NaiveDate>) {
    let column_of: HashMap<&TestTypeCode, usize> =
        columns.iter().enumerate().map(|(i, c)| (c, i)).collect();
    let mut results = WideMatrix::new(columns.to_vec());
    let mut dates = WideMatrix::new(columns.to_vec());
    let mut row_of: HashMap<(&PatientId, NaiveDate), usize> = HashMap::new();

    for patient in cohort {
        let key = (&patient.patient_id, patient.reference_date);
        if row_of.contains_key(&key) {
            continue;
        }
        row_of.insert(key, results.rows.len());
        results.rows.push(empty_row(patient, columns.len()));
        dates.rows.push(empty_row(patient, columns.len()));
    }

    for detail in details {
        let Some(&row) = row_of.get(&(&detail.patient_id, detail.reference_date)) else {
            continue;
        };
        let Some(&column) = column_of.get(&detail.test_type_code) else {
            continue;
        };
        if detail.date_diff.is_match() {
            results.rows[row].cells[column] = detail.result_text.clone();
            dates.rows[row].cells[column] = detail.collection_date;
        }
    }
    (results, dates)
}

fn empty_row<T: Clone>(patient: &CohortPatient, width: usize) -> WideRow<T> {
    WideRow {
        row_id: patient.patient_id.to_string(),
        original_patient_id: None,
        reference_date: patient.reference_date,
        cells: vec![None; width],
    }
}

/// Codes of `columns` selected by `predicate`.
pub fn columns_to_prune(
    columns: &[TestTypeCode],
    predicate: &dyn ColumnPredicate,
) -> Vec<TestTypeCode> {
    columns
        .iter()
        .filter(|code| predicate.should_drop(code))
        .cloned()
        .collect()
}

/// Remove the same column set from a pair of aligned matrices.
pub fn prune_pair<A, B>(
    first: &mut WideMatrix<A>,
    second: &mut WideMatrix<B>,
    drop: &[TestTypeCode],
) {
    let drop: BTreeSet<TestTypeCode> = drop.iter().cloned().collect();
    first.drop_columns(&drop);
    second.drop_columns(&drop);
}

/// Join, deduplicate, pivot and prune.
///
/// `columns` is the full test type universe in its order; `prune` selects
/// columns to drop, `None` keeps every column.
pub fn reshape(
    records: &[MatchedRecord],
    cohort: &[CohortPatient],
    columns: &[TestTypeCode],
    prune: Option<&dyn ColumnPredicate>,
) -> Reshaped {
    let joined = join_reference_dates(records, cohort);
    let joined_rows = joined.len();
    let (details, duplicates) = resolve_duplicates(joined);

    if !duplicates.is_empty() {
        let sample_codes: Vec<&str> = duplicates
            .samples
            .iter()
            .map(|sample| sample.test_type_code.as_str())
            .collect();
        warn!(
            groups = duplicates.groups,
            rows_removed = duplicates.rows_removed,
            sample_codes = ?sample_codes,
            "resolved duplicate (patient, reference date, test type) groups by minimal date diff"
        );
    }

    let (mut results, mut dates) = pivot(&details, cohort, columns);
    let columns_before_pruning = results.column_count();
    let pruned = prune
        .map(|predicate| columns_to_prune(columns, predicate))
        .unwrap_or_default();
    prune_pair(&mut results, &mut dates, &pruned);

    debug!(
        joined_rows,
        detail_rows = details.len(),
        matrix_rows = results.row_count(),
        columns_before_pruning,
        columns_after_pruning = results.column_count(),
        "reshaped matched records"
    );

    Reshaped {
        results,
        dates,
        details,
        duplicates,
        columns_before_pruning,
        pruned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labmatch_model::DateDiff;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn code(value: &str) -> TestTypeCode {
        TestTypeCode::new(value).unwrap()
    }

    fn pid(value: &str) -> PatientId {
        PatientId::new(value).unwrap()
    }

    fn record(patient: &str, test: &str, result: Option<(&str, NaiveDate, u32)>) -> MatchedRecord {
        record_for(patient, date(2020, 1, 10), test, result)
    }

    fn record_for(
        patient: &str,
        reference_date: NaiveDate,
        test: &str,
        result: Option<(&str, NaiveDate, u32)>,
    ) -> MatchedRecord {
        match result {
            Some((text, collected, days)) => MatchedRecord {
                patient_id: pid(patient),
                reference_date,
                test_type_code: Some(code(test)),
                result_text: Some(text.to_string()),
                collection_date: Some(collected),
                date_diff: DateDiff::Days(days),
            },
            None => MatchedRecord::no_match(pid(patient), reference_date, Some(code(test))),
        }
    }

    fn detail(patient: &str, test: &str, text: &str, diff: DateDiff) -> MatchedDetail {
        MatchedDetail {
            patient_id: pid(patient),
            reference_date: date(2020, 1, 10),
            test_type_code: code(test),
            result_text: Some(text.to_string()),
            collection_date: Some(date(2020, 1, 10)),
            date_diff: diff,
        }
    }

    #[test]
    fn join_keeps_each_record_on_its_own_reference_date() {
        let cohort = vec![
            CohortPatient::new(pid("P1"), date(2020, 1, 10)),
            CohortPatient::new(pid("P2"), date(2021, 1, 10)),
            CohortPatient::new(pid("P1"), date(2020, 3, 1)),
        ];
        let records = vec![
            record_for("P1", date(2020, 1, 10), "A1C", Some(("jan", date(2020, 1, 12), 2))),
            record_for("P1", date(2020, 3, 1), "A1C", Some(("mar", date(2020, 3, 2), 1))),
            record_for("P1", date(2022, 1, 10), "A1C", Some(("stale", date(2022, 1, 9), 1))),
            record("P3", "A1C", None),
        ];
        let joined = join_reference_dates(&records, &cohort);
        let keyed: Vec<(NaiveDate, &str)> = joined
            .iter()
            .map(|d| (d.reference_date, d.result_text.as_deref().unwrap()))
            .collect();
        assert_eq!(
            keyed,
            vec![(date(2020, 1, 10), "jan"), (date(2020, 3, 1), "mar")]
        );

        let (kept, report) = resolve_duplicates(joined);
        assert_eq!(kept.len(), 2);
        assert!(report.is_empty());
    }

    #[test]
    fn duplicates_keep_minimal_diff_then_first() {
        let rows = vec![
            detail("P1", "A1C", "far", DateDiff::Days(9)),
            detail("P1", "GLU", "only", DateDiff::Days(1)),
            detail("P1", "A1C", "near", DateDiff::Days(2)),
            detail("P1", "A1C", "tied", DateDiff::Days(2)),
            detail("P1", "CBC", "none", DateDiff::NoMatch),
            detail("P1", "CBC", "hit", DateDiff::Days(40)),
        ];
        let (kept, report) = resolve_duplicates(rows);
        let texts: Vec<&str> = kept
            .iter()
            .map(|d| d.result_text.as_deref().unwrap())
            .collect();
        assert_eq!(texts, vec!["near", "only", "hit"]);
        assert_eq!(report.groups, 2);
        assert_eq!(report.rows_removed, 3);
        assert_eq!(report.samples[0].rows, 3);
        assert_eq!(report.samples[0].kept_date_diff, Some(2));
        assert_eq!(report.samples[1].test_type_code, "CBC");
    }

    #[test]
    fn duplicate_samples_are_bounded() {
        let rows: Vec<_> = (0..8)
            .flat_map(|i| {
                let test = format!("T{i}");
                vec![
                    detail("P1", &test, "a", DateDiff::Days(1)),
                    detail("P1", &test, "b", DateDiff::Days(1)),
                ]
            })
            .collect();
        let (kept, report) = resolve_duplicates(rows);
        assert_eq!(kept.len(), 8);
        assert_eq!(report.groups, 8);
        assert_eq!(report.samples.len(), DUPLICATE_SAMPLE_SIZE);
    }

    #[test]
    fn pivot_fills_missing_cells_with_null() {
        let details = vec![
            detail("P1", "A1C", "6.5", DateDiff::Days(5)),
            MatchedDetail {
                result_text: None,
                collection_date: None,
                ..detail("P1", "GLU", "", DateDiff::NoMatch)
            },
            detail("P2", "GLU", "5.2", DateDiff::Days(0)),
        ];
        let cohort = vec![
            CohortPatient::new(pid("P1"), date(2020, 1, 10)),
            CohortPatient::new(pid("P2"), date(2020, 1, 10)),
        ];
        let columns = vec![code("A1C"), code("GLU")];
        let (results, dates) = pivot(&details, &cohort, &columns);
        assert_eq!(results.row_count(), 2);
        assert_eq!(results.rows[0].cells, vec![Some("6.5".to_string()), None]);
        assert_eq!(results.rows[1].cells, vec![None, Some("5.2".to_string())]);
        assert_eq!(dates.rows[0].cells, vec![Some(date(2020, 1, 10)), None]);
    }

    #[test]
    fn pivot_rows_come_from_the_cohort() {
        let cohort = vec![
            CohortPatient::new(pid("P2"), date(2021, 6, 1)),
            CohortPatient::new(pid("P1"), date(2020, 1, 10)),
            CohortPatient::new(pid("P2"), date(2021, 6, 1)),
        ];
        let details = vec![
            detail("P1", "A1C", "6.5", DateDiff::Days(5)),
            detail("P9", "A1C", "7.0", DateDiff::Days(1)),
        ];
        let (results, dates) = pivot(&details, &cohort, &[code("A1C")]);
        let keys: Vec<(&str, NaiveDate)> = results
            .rows
            .iter()
            .map(|row| (row.row_id.as_str(), row.reference_date))
            .collect();
        assert_eq!(
            keys,
            vec![("P2", date(2021, 6, 1)), ("P1", date(2020, 1, 10))]
        );
        assert_eq!(results.rows[0].cells, vec![None]);
        assert_eq!(results.rows[1].cells, vec![Some("6.5".to_string())]);
        assert_eq!(dates.row_count(), 2);

        let (empty, _) = pivot(&[], &cohort, &[]);
        assert_eq!(empty.row_count(), 2);
        assert_eq!(empty.column_count(), 0);
    }

    #[test]
    fn reshape_prunes_both_matrices() {
        let cohort = vec![CohortPatient::new(pid("P1"), date(2020, 1, 10))];
        let records = vec![
            record("P1", "A1C", Some(("6.5", date(2020, 1, 5), 5))),
            record("P1", "4567", Some(("x", date(2020, 1, 9), 1))),
            record("P1", "GLU", None),
        ];
        let columns = vec![code("A1C"), code("4567"), code("GLU")];
        let reshaped = reshape(&records, &cohort, &columns, Some(&DigitOnly));
        assert_eq!(reshaped.columns_before_pruning, 3);
        assert_eq!(reshaped.pruned, vec![code("4567")]);
        assert_eq!(reshaped.results.column_names(), vec!["A1C", "GLU"]);
        assert_eq!(reshaped.results.columns, reshaped.dates.columns);
        assert_eq!(reshaped.details.len(), 3);
        assert!(reshaped.duplicates.is_empty());

        let kept = reshape(&records, &cohort, &columns, None);
        assert_eq!(kept.results.column_count(), 3);
        assert!(kept.pruned.is_empty());
    }

    #[test]
    fn closure_predicates_are_accepted() {
        let columns = vec![code("A1C"), code("XGLU")];
        let starts_with_x = |code: &TestTypeCode| code.as_str().starts_with('X');
        assert_eq!(columns_to_prune(&columns, &starts_with_x), vec![code("XGLU")]);
    }
}
