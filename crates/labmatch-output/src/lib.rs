//! Writing analysis results to disk.
//!
//! Result tables become Polars frames and CSV files; a run manifest with the
//! input fingerprint lets an unchanged rerun reuse the stored outputs.

pub mod error;
pub mod frames;
pub mod hash;
pub mod manifest;
pub mod writer;

pub use error::{OutputError, Result};
pub use frames::{KEY_COLUMNS, RowKey, dates_frame, details_frame, long_frame, results_frame, wide_frame};
pub use manifest::{
    MANIFEST_FILE, ManifestFile, RunManifest, SUMMARY_FILE, cached_summary, read_manifest,
};
pub use writer::{
    DATE_MATRIX_FILE, DETAILS_FILE, LONG_FORMAT_FILE, OUTPUT_FILES, RESULT_MATRIX_FILE,
    SUFFIX_DATES_FILE, SUFFIX_MATRIX_FILE, write_csv, write_outputs,
};
