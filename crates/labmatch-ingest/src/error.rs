//! Error types for source extract ingestion.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::SourceTable;

/// Errors that can occur while loading and normalizing the source extracts.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Source file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds maximum size limit.
    #[error("file too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Unsupported file encoding.
    #[error("unsupported encoding in {path}: {encoding} (only UTF-8 is supported)")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    // === CSV Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    // === Schema Errors ===
    /// A required column is absent from a source table.
    #[error("{table} table is missing required column '{column}' (found: {})", .available.join(", "))]
    MissingColumn {
        table: SourceTable,
        column: String,
        available: Vec<String>,
    },

    // === Value Errors ===
    /// A date-like field does not parse under the expected format.
    #[error("{table} table: cannot parse {column} value '{value}' at row {row} (expected {expected})")]
    DateParse {
        table: SourceTable,
        column: String,
        row: usize,
        value: String,
        expected: &'static str,
    },

    /// A key field is blank where a value is required.
    #[error("{table} table: blank {column} at row {row}")]
    MissingValue {
        table: SourceTable,
        column: String,
        row: usize,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    /// Taxonomy name reported to users for a failed load.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::MissingColumn { .. } => "SchemaError",
            IngestError::DateParse { .. } => "DateParseError",
            IngestError::MissingValue { .. } => "ValueError",
            IngestError::FileNotFound { .. }
            | IngestError::FileRead { .. }
            | IngestError::FileTooLarge { .. } => "IoError",
            IngestError::UnsupportedEncoding { .. } => "EncodingError",
            IngestError::CsvParse { .. } | IngestError::DataFrame { .. } => "ParseError",
        }
    }

    /// The source table the error points at, when known.
    pub fn table(&self) -> Option<SourceTable> {
        match self {
            IngestError::MissingColumn { table, .. }
            | IngestError::DateParse { table, .. }
            | IngestError::MissingValue { table, .. } => Some(*table),
            _ => None,
        }
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_display() {
        let err = IngestError::MissingColumn {
            table: SourceTable::Labs,
            column: "result_text".to_string(),
            available: vec!["patient_id".to_string(), "value".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "labs table is missing required column 'result_text' (found: patient_id, value)"
        );
        assert_eq!(err.kind(), "SchemaError");
        assert_eq!(err.table(), Some(SourceTable::Labs));
    }

    #[test]
    fn test_date_parse_display() {
        let err = IngestError::DateParse {
            table: SourceTable::Cohort,
            column: "reference_date".to_string(),
            row: 3,
            value: "2020/13/45".to_string(),
            expected: "DD-Mon-YY",
        };
        assert_eq!(
            err.to_string(),
            "cohort table: cannot parse reference_date value '2020/13/45' at row 3 (expected DD-Mon-YY)"
        );
        assert_eq!(err.kind(), "DateParseError");
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
