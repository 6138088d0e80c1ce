//! Loading the three source extracts as one unit.

use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::DataFrame;
use tracing::{info, info_span};

use labmatch_model::{CancerTable, CohortPatient, SourceColumns, SourceOverlap};

use crate::error::Result;
use crate::fingerprint::{InputFingerprint, fingerprint_inputs};
use crate::normalize::{LabTable, normalize_cancer, normalize_cohort, normalize_labs};
use crate::overlap::compute_overlap;
use crate::reader::read_source_frame;

/// Locations of the three CSV extracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub cohort: PathBuf,
    pub labs: PathBuf,
    pub cancer: PathBuf,
}

impl SourcePaths {
    pub fn new(
        cohort: impl Into<PathBuf>,
        labs: impl Into<PathBuf>,
        cancer: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cohort: cohort.into(),
            labs: labs.into(),
            cancer: cancer.into(),
        }
    }
}

/// Raw all-text frames, before normalization.
#[derive(Debug, Clone)]
pub struct SourceFrames {
    pub cohort: DataFrame,
    pub labs: DataFrame,
    pub cancer: DataFrame,
}

/// Normalized inputs ready for analysis.
#[derive(Debug, Clone)]
pub struct LoadedSources {
    pub cohort: Vec<CohortPatient>,
    pub labs: LabTable,
    pub cancer: CancerTable,
    pub overlap: SourceOverlap,
    pub fingerprint: InputFingerprint,
}

fn read_one(path: &Path, table: &'static str) -> Result<DataFrame> {
    let span = info_span!("read", table, path = %path.display());
    let _guard = span.enter();
    read_source_frame(path)
}

/// Read the three extracts into frames.
pub fn read_sources(paths: &SourcePaths) -> Result<SourceFrames> {
    Ok(SourceFrames {
        cohort: read_one(&paths.cohort, "cohort")?,
        labs: read_one(&paths.labs, "labs")?,
        cancer: read_one(&paths.cancer, "cancer")?,
    })
}

/// Normalize already-read frames and compute overlap and fingerprint.
pub fn normalize_sources(frames: &SourceFrames, columns: &SourceColumns) -> Result<LoadedSources> {
    let cohort = normalize_cohort(&frames.cohort, &columns.cohort)?;
    let labs = normalize_labs(&frames.labs, &columns.labs)?;
    let cancer = normalize_cancer(&frames.cancer, &columns.cancer)?;
    let overlap = compute_overlap(&cohort, &labs.observations, &cancer);
    let fingerprint = fingerprint_inputs(&cohort, &labs.observations, &cancer);
    Ok(LoadedSources {
        cohort,
        labs,
        cancer,
        overlap,
        fingerprint,
    })
}

/// Read and normalize the three extracts.
///
/// Fails on the first schema or date error; nothing partial is returned.
pub fn load_sources(paths: &SourcePaths, columns: &SourceColumns) -> Result<LoadedSources> {
    let span = info_span!("load_sources");
    let _guard = span.enter();
    let start = Instant::now();

    let frames = read_sources(paths)?;
    let loaded = normalize_sources(&frames, columns)?;

    info!(
        cohort_rows = loaded.cohort.len(),
        lab_rows = loaded.labs.len(),
        lab_rows_skipped = loaded.labs.skipped_rows,
        cancer_rows = loaded.cancer.len(),
        labs_overlap_pct = loaded.overlap.labs.percent_of_cohort,
        cancer_overlap_pct = loaded.overlap.cancer.percent_of_cohort,
        duration_ms = start.elapsed().as_millis(),
        "sources loaded"
    );
    Ok(loaded)
}
