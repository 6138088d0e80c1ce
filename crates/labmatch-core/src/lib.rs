//! Date matching and reshape engine.
//!
//! Takes the normalized cohort and lab tables and produces:
//! - one nearest-date matched record per (patient, test type),
//! - wide result and date matrices after duplicate resolution,
//! - the lossless long format and its suffix-disambiguated matrices.
//!
//! Nothing here touches the file system; stages take tables and return
//! tables.

pub mod batch;
pub mod long_format;
pub mod matcher;
pub mod pipeline;
pub mod reshape;
pub mod suffix;
pub mod universe;

pub use batch::{LogProgress, NoProgress, ProgressSink, match_cohort, select_patients};
pub use long_format::build_long_format;
pub use matcher::{LabIndex, match_nearest};
pub use pipeline::{
    AnalysisError, AnalysisInput, AnalysisOutput, run_analysis, run_analysis_with_predicate,
    validate_options,
};
pub use reshape::{
    ColumnPredicate, DUPLICATE_SAMPLE_SIZE, DigitOnly, DuplicateReport, Reshaped, reshape,
    resolve_duplicates,
};
pub use suffix::{SuffixMatrices, assign_ordinals, build_suffix_matrices};
pub use universe::TestTypeUniverse;
