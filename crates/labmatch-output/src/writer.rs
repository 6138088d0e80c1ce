//! All-or-nothing writing of a run's outputs.
//!
//! Files are first written to a staging directory inside the output
//! directory. Only when every file is written are they moved into place,
//! with `manifest.json` last, so a directory never carries a manifest that
//! describes files from another run.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::*;
use tracing::{debug, info, info_span, warn};

use labmatch_core::AnalysisOutput;
use labmatch_ingest::InputFingerprint;
use labmatch_model::{AnalysisOptions, RunSummary};

use crate::error::{OutputError, Result};
use crate::frames::{RowKey, dates_frame, details_frame, long_frame, results_frame};
use crate::hash::compute_file_hash;
use crate::manifest::{MANIFEST_FILE, ManifestFile, RunManifest, SUMMARY_FILE};

pub const RESULT_MATRIX_FILE: &str = "lab_matrix.csv";
pub const DATE_MATRIX_FILE: &str = "lab_dates.csv";
pub const DETAILS_FILE: &str = "lab_details.csv";
pub const LONG_FORMAT_FILE: &str = "lab_long_format.csv";
pub const SUFFIX_MATRIX_FILE: &str = "lab_matrix_suffix.csv";
pub const SUFFIX_DATES_FILE: &str = "lab_dates_suffix.csv";

/// Every file a run writes, in write order.
pub const OUTPUT_FILES: [&str; 8] = [
    RESULT_MATRIX_FILE,
    DATE_MATRIX_FILE,
    DETAILS_FILE,
    LONG_FORMAT_FILE,
    SUFFIX_MATRIX_FILE,
    SUFFIX_DATES_FILE,
    SUMMARY_FILE,
    MANIFEST_FILE,
];

const STAGING_PREFIX: &str = ".labmatch-staging";

/// Write a frame as CSV with a header row; nulls become empty fields.
pub fn write_csv(path: &Path, df: &mut DataFrame) -> Result<()> {
    let mut file = File::create(path).map_err(|e| OutputError::io("create", path, e))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .map_err(|e| OutputError::CsvWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    file.sync_all().map_err(|e| OutputError::io("sync", path, e))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    bytes.push(b'\n');
    fs::write(path, bytes).map_err(|e| OutputError::io("write", path, e))
}

fn staging_dir(output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{STAGING_PREFIX}-{}", std::process::id()))
}

fn stage_frame(staging: &Path, name: &str, mut df: DataFrame) -> Result<ManifestFile> {
    let path = staging.join(name);
    write_csv(&path, &mut df)?;
    debug!(file = name, rows = df.height(), columns = df.width(), "staged output");
    Ok(ManifestFile {
        name: name.to_string(),
        rows: df.height(),
        sha256: compute_file_hash(&path)?,
    })
}

fn stage_all(
    staging: &Path,
    output: &AnalysisOutput,
    summary: &RunSummary,
    manifest: &mut RunManifest,
) -> Result<()> {
    let frames = [
        (
            RESULT_MATRIX_FILE,
            results_frame("results", &output.results, RowKey::Patient)?,
        ),
        (
            DATE_MATRIX_FILE,
            dates_frame("dates", &output.dates, RowKey::Patient)?,
        ),
        (DETAILS_FILE, details_frame(&output.details, &output.universe)?),
        (LONG_FORMAT_FILE, long_frame(&output.long_format)?),
        (
            SUFFIX_MATRIX_FILE,
            results_frame("suffix_results", &output.suffix.results, RowKey::UniquePatient)?,
        ),
        (
            SUFFIX_DATES_FILE,
            dates_frame("suffix_dates", &output.suffix.dates, RowKey::UniquePatient)?,
        ),
    ];
    for (name, df) in frames {
        let file = stage_frame(staging, name, df)?;
        manifest.files.push(file);
    }

    let summary_path = staging.join(SUMMARY_FILE);
    write_json(&summary_path, summary)?;
    manifest.files.push(ManifestFile {
        name: SUMMARY_FILE.to_string(),
        rows: 0,
        sha256: compute_file_hash(&summary_path)?,
    });

    write_json(&staging.join(MANIFEST_FILE), manifest)
}

fn promote(staging: &Path, output_dir: &Path) -> Result<()> {
    let old_manifest = output_dir.join(MANIFEST_FILE);
    if old_manifest.exists() {
        fs::remove_file(&old_manifest).map_err(|e| OutputError::io("remove", &old_manifest, e))?;
    }
    for name in OUTPUT_FILES {
        let staged = staging.join(name);
        let target = output_dir.join(name);
        fs::rename(&staged, &target).map_err(|source| OutputError::Promote {
            staged,
            target,
            source,
        })?;
    }
    Ok(())
}

fn remove_staging(staging: &Path) {
    if staging.exists()
        && let Err(err) = fs::remove_dir_all(staging)
    {
        warn!(path = %staging.display(), error = %err, "failed to remove staging directory");
    }
}

/// Write every output table, `summary.json` and `manifest.json` to
/// `output_dir`.
///
/// On failure the staging directory is removed and the files already in
/// `output_dir` are left as they were.
pub fn write_outputs(
    output_dir: &Path,
    output: &AnalysisOutput,
    summary: &RunSummary,
    fingerprint: &InputFingerprint,
    options: &AnalysisOptions,
) -> Result<RunManifest> {
    let span = info_span!("write_outputs", dir = %output_dir.display());
    let _guard = span.enter();
    let start = Instant::now();

    fs::create_dir_all(output_dir).map_err(|e| OutputError::io("create", output_dir, e))?;
    let staging = staging_dir(output_dir);
    remove_staging(&staging);
    fs::create_dir_all(&staging).map_err(|e| OutputError::io("create", &staging, e))?;

    let mut manifest = RunManifest::new(fingerprint.clone(), options);
    let result = stage_all(&staging, output, summary, &mut manifest)
        .and_then(|()| promote(&staging, output_dir));
    remove_staging(&staging);
    result?;

    info!(
        files = manifest.files.len() + 1,
        duration_ms = start.elapsed().as_millis(),
        "outputs written"
    );
    Ok(manifest)
}
