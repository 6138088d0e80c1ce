//! Stage orchestration behind the `run` and `inspect` commands.
//!
//! Each stage error is wrapped with the stage name so the printed chain
//! reads `load sources: labs table is missing required column ...`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use labmatch_core::{AnalysisInput, DuplicateReport, ProgressSink, run_analysis, validate_options};
use labmatch_ingest::{LoadedSources, SourcePaths, load_sources};
use labmatch_model::{AnalysisOptions, RunSummary, SourceColumns, SourceOverlap};
use labmatch_output::{ManifestFile, cached_summary, write_outputs};

use crate::logging::redact_value;

/// Everything a `run` needs, after config and flags are merged.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub sources: SourcePaths,
    pub output_dir: PathBuf,
    pub options: AnalysisOptions,
    pub columns: SourceColumns,
}

/// Result of a `run`.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub summary: RunSummary,
    /// True when stored outputs were reused and nothing was written.
    pub cached: bool,
    /// Files written by this run; empty on a cache hit.
    pub files: Vec<ManifestFile>,
}

/// Row counts and overlap of the three extracts.
#[derive(Debug, Clone)]
pub struct InspectReport {
    pub cohort_rows: usize,
    pub lab_rows: usize,
    pub lab_rows_skipped: usize,
    pub cancer_rows: usize,
    pub overlap: SourceOverlap,
    pub fingerprint: String,
}

impl InspectReport {
    fn from_loaded(loaded: &LoadedSources) -> Self {
        Self {
            cohort_rows: loaded.cohort.len(),
            lab_rows: loaded.labs.len(),
            lab_rows_skipped: loaded.labs.skipped_rows,
            cancer_rows: loaded.cancer.len(),
            overlap: loaded.overlap.clone(),
            fingerprint: loaded.fingerprint.combined.clone(),
        }
    }
}

/// Load and normalize the extracts without running the analysis.
pub fn inspect_sources(sources: &SourcePaths, columns: &SourceColumns) -> Result<InspectReport> {
    let loaded = load_sources(sources, columns).context("load sources")?;
    Ok(InspectReport::from_loaded(&loaded))
}

fn log_duplicates(report: &DuplicateReport) {
    if report.is_empty() {
        return;
    }
    for sample in &report.samples {
        warn!(
            patient_id = redact_value(&sample.patient_id),
            reference_date = redact_value(&sample.reference_date),
            test_type_code = %sample.test_type_code,
            rows = sample.rows,
            kept_date_diff = ?sample.kept_date_diff,
            "duplicate group resolved"
        );
    }
}

/// Load, match, reshape and write, or reuse the stored outputs when the
/// inputs and options are unchanged.
pub fn run_pipeline(request: &RunRequest, progress: &mut dyn ProgressSink) -> Result<RunResult> {
    let span = info_span!("run", output_dir = %request.output_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    validate_options(&request.options).context("validate options")?;
    let loaded = load_sources(&request.sources, &request.columns).context("load sources")?;

    if let Some(summary) = cached_summary(&request.output_dir, &loaded.fingerprint, &request.options)
        .context("check stored outputs")?
    {
        return Ok(RunResult {
            output_dir: request.output_dir.clone(),
            summary,
            cached: true,
            files: Vec::new(),
        });
    }

    let output = run_analysis(
        AnalysisInput {
            cohort: &loaded.cohort,
            labs: &loaded.labs.observations,
        },
        &request.options,
        progress,
    )
    .context("analysis")?;
    log_duplicates(&output.duplicates);

    let mut summary = output.summary.clone();
    summary.overlap = Some(loaded.overlap.clone());
    if loaded.labs.skipped_rows > 0 {
        summary.warnings.push(format!(
            "{} lab rows without patient id or test type code were skipped",
            loaded.labs.skipped_rows
        ));
    }

    let manifest = write_outputs(
        &request.output_dir,
        &output,
        &summary,
        &loaded.fingerprint,
        &request.options,
    )
    .context("write outputs")?;

    info!(
        patients = summary.patients_processed,
        warnings = summary.warnings.len(),
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );
    Ok(RunResult {
        output_dir: request.output_dir.clone(),
        summary,
        cached: false,
        files: manifest.files,
    })
}
