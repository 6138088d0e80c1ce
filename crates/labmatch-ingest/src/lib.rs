//! Source extract ingestion.
//!
//! Reads the cohort, lab and cancer CSV extracts with Polars, checks their
//! required columns, parses dates, and returns typed tables together with
//! patient-id overlap statistics and a content fingerprint.

pub mod dates;
pub mod error;
pub mod fingerprint;
pub mod normalize;
pub mod overlap;
pub mod polars_utils;
pub mod reader;
pub mod schema;
pub mod sources;

pub use dates::{parse_collection_date, parse_reference_date};
pub use error::{IngestError, Result};
pub use fingerprint::{FINGERPRINT_VERSION, InputFingerprint, TableFingerprint, fingerprint_inputs};
pub use normalize::{LabTable, normalize_cancer, normalize_cohort, normalize_labs};
pub use overlap::compute_overlap;
pub use reader::read_source_frame;
pub use schema::SourceTable;
pub use sources::{
    LoadedSources, SourceFrames, SourcePaths, load_sources, normalize_sources, read_sources,
};
