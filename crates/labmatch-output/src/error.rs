//! Output error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing or reading run outputs.
#[derive(Debug, Error)]
pub enum OutputError {
    /// File I/O error.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Building a frame from a result table failed.
    #[error("failed to build {table} frame: {message}")]
    Frame { table: &'static str, message: String },

    /// A test type code would reuse the name of a key column.
    #[error(
        "test type code {code:?} in the {table} table clashes with a key column; rename the code in the lab extract"
    )]
    ReservedColumn { table: &'static str, code: String },

    /// Writing a CSV file failed.
    #[error("failed to write CSV {path}: {message}")]
    CsvWrite { path: PathBuf, message: String },

    /// JSON (de)serialization of the summary or manifest failed.
    #[error("failed to encode {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Staged files could not be moved into the output directory.
    #[error("failed to move {staged} into place at {target}: {source}")]
    Promote {
        staged: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl OutputError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
