//! Patient-by-test-type wide matrices.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::ids::{PatientId, TestTypeCode};

/// One matrix row.
///
/// `row_id` is the patient id, or the synthesized `unique_patient_id` in a
/// suffix matrix, where `original_patient_id` keeps the source id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideRow<T> {
    pub row_id: String,
    pub original_patient_id: Option<PatientId>,
    pub reference_date: NaiveDate,
    pub cells: Vec<Option<T>>,
}

/// Rows keyed by (row id, reference date), one column per test type code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideMatrix<T> {
    pub columns: Vec<TestTypeCode>,
    pub rows: Vec<WideRow<T>>,
}

impl<T> WideMatrix<T> {
    pub fn new(columns: Vec<TestTypeCode>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, code: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.as_str() == code)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(TestTypeCode::as_str).collect()
    }

    /// Cell at (row id, reference date, code); `None` for null or unknown.
    pub fn cell(&self, row_id: &str, reference_date: NaiveDate, code: &str) -> Option<&T> {
        let column = self.column_index(code)?;
        self.rows
            .iter()
            .find(|row| row.row_id == row_id && row.reference_date == reference_date)
            .and_then(|row| row.cells.get(column))
            .and_then(Option::as_ref)
    }

    pub fn total_cells(&self) -> usize {
        self.rows.len() * self.columns.len()
    }

    pub fn non_null_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.cells.iter().filter(|cell| cell.is_some()).count())
            .sum()
    }

    /// Removes the given columns from the header and from every row.
    pub fn drop_columns(&mut self, drop: &BTreeSet<TestTypeCode>) {
        if drop.is_empty() {
            return;
        }
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|column| !drop.contains(column))
            .collect();
        self.columns.retain(|column| !drop.contains(column));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.cells.retain(|_| flags.next().copied().unwrap_or(true));
        }
    }
}
