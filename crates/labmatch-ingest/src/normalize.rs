//! Source frames to typed tables.

use polars::prelude::DataFrame;
use tracing::debug;

use labmatch_model::{
    CancerColumns, CancerTable, CohortColumns, CohortPatient, LabColumns, LabObservation,
    PatientId, TestType, TestTypeCode,
};

use crate::dates::{
    COLLECTION_DATE_FORMAT, REFERENCE_DATE_FORMAT, parse_collection_date, parse_reference_date,
};
use crate::error::{IngestError, Result};
use crate::polars_utils::column_strings;
use crate::schema::{SourceTable, is_blank_frame, require_columns};

/// Normalized lab extract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabTable {
    pub observations: Vec<LabObservation>,
    /// Rows dropped for a blank patient id or test type code.
    pub skipped_rows: usize,
}

impl LabTable {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

/// Trimmed text of the resolved columns, one `Vec` per column.
fn projected_columns(df: &DataFrame, names: &[String]) -> Result<Vec<Vec<String>>> {
    names
        .iter()
        .map(|name| {
            column_strings(df, name)
                .map(|values| values.into_iter().map(|v| v.trim().to_string()).collect())
        })
        .collect()
}

/// Parse the cohort extract.
///
/// Every row must carry a patient id and a parseable reference date.
/// Duplicate patient ids are kept in input order.
pub fn normalize_cohort(df: &DataFrame, columns: &CohortColumns) -> Result<Vec<CohortPatient>> {
    if is_blank_frame(df) {
        return Ok(Vec::new());
    }
    let names = require_columns(df, SourceTable::Cohort, &columns.required())?;
    let values = projected_columns(df, &names)?;
    let (ids, dates) = (&values[0], &values[1]);

    let mut cohort = Vec::with_capacity(df.height());
    for (idx, (raw_id, raw_date)) in ids.iter().zip(dates).enumerate() {
        let row = idx + 1;
        let patient_id = PatientId::new(raw_id.as_str()).map_err(|_| IngestError::MissingValue {
            table: SourceTable::Cohort,
            column: columns.patient_id.clone(),
            row,
        })?;
        let reference_date =
            parse_reference_date(raw_date).ok_or_else(|| IngestError::DateParse {
                table: SourceTable::Cohort,
                column: columns.reference_date.clone(),
                row,
                value: raw_date.clone(),
                expected: REFERENCE_DATE_FORMAT,
            })?;
        cohort.push(CohortPatient::new(patient_id, reference_date));
    }

    debug!(rows = cohort.len(), "normalized cohort");
    Ok(cohort)
}

/// Parse the lab extract, projected to its five required columns.
///
/// Rows without a patient id or test type code can never be matched and are
/// skipped. A blank collection date is kept as `None`.
pub fn normalize_labs(df: &DataFrame, columns: &LabColumns) -> Result<LabTable> {
    if is_blank_frame(df) {
        return Ok(LabTable::default());
    }
    let names = require_columns(df, SourceTable::Labs, &columns.required())?;
    let values = projected_columns(df, &names)?;

    let mut table = LabTable {
        observations: Vec::with_capacity(df.height()),
        skipped_rows: 0,
    };
    for idx in 0..df.height() {
        let row = idx + 1;
        let raw_date = &values[1][idx];
        let collection_date = if raw_date.is_empty() {
            None
        } else {
            Some(
                parse_collection_date(raw_date).ok_or_else(|| IngestError::DateParse {
                    table: SourceTable::Labs,
                    column: columns.collection_date.clone(),
                    row,
                    value: raw_date.clone(),
                    expected: COLLECTION_DATE_FORMAT,
                })?,
            )
        };

        let (Ok(patient_id), Ok(code)) = (
            PatientId::new(values[0][idx].as_str()),
            TestTypeCode::new(values[2][idx].as_str()),
        ) else {
            table.skipped_rows += 1;
            continue;
        };
        let label = Some(values[3][idx].clone());
        table.observations.push(LabObservation {
            patient_id,
            collection_date,
            test_type: TestType::new(code, label),
            result_text: values[4][idx].clone(),
        });
    }

    if table.skipped_rows > 0 {
        debug!(
            skipped = table.skipped_rows,
            "skipped lab rows without patient id or test type code"
        );
    }
    debug!(rows = table.len(), "normalized labs");
    Ok(table)
}

/// Project the cancer extract to its seven required columns.
pub fn normalize_cancer(df: &DataFrame, columns: &CancerColumns) -> Result<CancerTable> {
    let headers: Vec<String> = columns.required().iter().map(|c| (*c).to_string()).collect();
    if is_blank_frame(df) {
        return Ok(CancerTable {
            headers,
            rows: Vec::new(),
            patient_id_index: 0,
        });
    }
    let names = require_columns(df, SourceTable::Cancer, &columns.required())?;
    let values = projected_columns(df, &names)?;

    let rows: Vec<Vec<String>> = (0..df.height())
        .map(|idx| values.iter().map(|column| column[idx].clone()).collect())
        .collect();

    debug!(rows = rows.len(), "normalized cancer diagnoses");
    Ok(CancerTable {
        headers,
        rows,
        patient_id_index: 0,
    })
}
