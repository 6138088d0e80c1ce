//! Result tables as Polars frames.
//!
//! Every column is text except the day counts. Dates are rendered as
//! `YYYY-MM-DD`; missing cells stay null and are written as empty fields.

use chrono::NaiveDate;
use polars::prelude::*;

use labmatch_core::TestTypeUniverse;
use labmatch_model::{LongRecord, MatchedDetail, WideMatrix};

use crate::error::{OutputError, Result};

fn frame(table: &'static str, columns: Vec<Column>) -> Result<DataFrame> {
    DataFrame::new(columns).map_err(|e| OutputError::Frame {
        table,
        message: e.to_string(),
    })
}

fn text_column(name: &str, values: Vec<Option<String>>) -> Column {
    Series::new(name.into(), values).into()
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Key column names of the wide matrices. No test type code may reuse one.
pub const KEY_COLUMNS: [&str; 4] = [
    "patient_id",
    "reference_date",
    "original_patient_id",
    "unique_patient_id",
];

/// How the rows of a wide matrix are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKey {
    /// `patient_id`, `reference_date`.
    Patient,
    /// `original_patient_id`, `unique_patient_id`, `reference_date`.
    UniquePatient,
}

/// A wide matrix with cells rendered by `render`.
///
/// Key columns come first, then one column per code. A code named like a
/// key column is rejected.
pub fn wide_frame<T>(
    table: &'static str,
    matrix: &WideMatrix<T>,
    key: RowKey,
    render: impl Fn(&T) -> String,
) -> Result<DataFrame> {
    if let Some(code) = matrix
        .columns
        .iter()
        .find(|code| KEY_COLUMNS.contains(&code.as_str()))
    {
        return Err(OutputError::ReservedColumn {
            table,
            code: code.to_string(),
        });
    }
    let mut columns = Vec::with_capacity(matrix.column_count() + 3);
    let row_ids: Vec<Option<String>> = matrix.rows.iter().map(|r| Some(r.row_id.clone())).collect();
    if key == RowKey::UniquePatient {
        let originals: Vec<Option<String>> = matrix
            .rows
            .iter()
            .map(|r| r.original_patient_id.as_ref().map(ToString::to_string))
            .collect();
        columns.push(text_column("original_patient_id", originals));
        columns.push(text_column("unique_patient_id", row_ids));
    } else {
        columns.push(text_column("patient_id", row_ids));
    }
    columns.push(text_column(
        "reference_date",
        matrix.rows.iter().map(|r| Some(iso(r.reference_date))).collect(),
    ));
    for (idx, code) in matrix.columns.iter().enumerate() {
        let cells: Vec<Option<String>> = matrix
            .rows
            .iter()
            .map(|row| row.cells.get(idx).and_then(Option::as_ref).map(&render))
            .collect();
        columns.push(text_column(code.as_str(), cells));
    }
    frame(table, columns)
}

/// Wide result matrix.
pub fn results_frame(
    table: &'static str,
    matrix: &WideMatrix<String>,
    key: RowKey,
) -> Result<DataFrame> {
    wide_frame(table, matrix, key, String::clone)
}

/// Wide collection-date matrix.
pub fn dates_frame(
    table: &'static str,
    matrix: &WideMatrix<NaiveDate>,
    key: RowKey,
) -> Result<DataFrame> {
    wide_frame(table, matrix, key, |date| iso(*date))
}

/// Deduplicated detail table, with each code's label from `universe`.
pub fn details_frame(details: &[MatchedDetail], universe: &TestTypeUniverse) -> Result<DataFrame> {
    let columns = vec![
        text_column(
            "patient_id",
            details.iter().map(|d| Some(d.patient_id.to_string())).collect(),
        ),
        text_column(
            "reference_date",
            details.iter().map(|d| Some(iso(d.reference_date))).collect(),
        ),
        text_column(
            "test_type_code",
            details.iter().map(|d| Some(d.test_type_code.to_string())).collect(),
        ),
        text_column(
            "test_type_description",
            details
                .iter()
                .map(|d| universe.label(&d.test_type_code).map(str::to_string))
                .collect(),
        ),
        text_column(
            "result_text",
            details.iter().map(|d| d.result_text.clone()).collect(),
        ),
        text_column(
            "collection_date",
            details.iter().map(|d| d.collection_date.map(iso)).collect(),
        ),
        Series::new(
            "date_diff_days".into(),
            details.iter().map(|d| d.date_diff.days()).collect::<Vec<Option<u32>>>(),
        )
        .into(),
    ];
    frame("details", columns)
}

/// Lossless long format.
pub fn long_frame(rows: &[LongRecord]) -> Result<DataFrame> {
    let columns = vec![
        text_column(
            "patient_id",
            rows.iter().map(|r| Some(r.patient_id.to_string())).collect(),
        ),
        text_column(
            "reference_date",
            rows.iter().map(|r| Some(iso(r.reference_date))).collect(),
        ),
        text_column(
            "collection_date",
            rows.iter().map(|r| Some(iso(r.collection_date))).collect(),
        ),
        text_column(
            "test_type_code",
            rows.iter().map(|r| Some(r.test_type_code.to_string())).collect(),
        ),
        text_column(
            "test_type_description",
            rows.iter().map(|r| r.test_type_description.clone()).collect(),
        ),
        text_column(
            "result_text",
            rows.iter().map(|r| Some(r.result_text.clone())).collect(),
        ),
        Series::new(
            "date_diff_days".into(),
            rows.iter().map(|r| r.date_diff_days).collect::<Vec<u32>>(),
        )
        .into(),
    ];
    frame("long_format", columns)
}
