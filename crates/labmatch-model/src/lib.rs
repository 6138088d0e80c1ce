//! Data model for cohort lab matching.
//!
//! Every table handed between pipeline stages is defined here as a plain
//! value type: cohort patients and lab observations coming out of ingest,
//! matched records and wide matrices coming out of the core, and the run
//! summary handed to the output layer.

pub mod error;
pub mod ids;
pub mod matched;
pub mod matrix;
pub mod options;
pub mod records;
pub mod summary;

pub use error::{ModelError, Result};
pub use ids::{PatientId, TestType, TestTypeCode};
pub use matched::{DateDiff, LongRecord, MatchedDetail, MatchedRecord};
pub use matrix::{WideMatrix, WideRow};
pub use options::{
    AnalysisOptions, CancerColumns, CohortColumns, LabColumns, PatientLimit, SourceColumns,
};
pub use records::{CancerTable, CohortPatient, LabObservation};
pub use summary::{DuplicateGroupSample, OverlapStats, RunSummary, SourceOverlap};
