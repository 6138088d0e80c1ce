//! Run manifest and the fingerprint cache.
//!
//! A finished run leaves `manifest.json` next to its outputs. A later run
//! whose input fingerprint and output-affecting options are equal can reuse
//! the stored `summary.json` instead of recomputing.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use labmatch_ingest::InputFingerprint;
use labmatch_model::{AnalysisOptions, RunSummary};

use crate::error::{OutputError, Result};
use crate::hash::compute_file_hash;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// Current manifest layout.
pub const MANIFEST_VERSION: u32 = 1;

/// One written output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    pub name: String,
    pub rows: usize,
    pub sha256: String,
}

/// Record of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub manifest_version: u32,
    pub tool_version: String,
    pub created_at: DateTime<Utc>,
    pub fingerprint: InputFingerprint,
    pub options: AnalysisOptions,
    pub options_key: String,
    pub files: Vec<ManifestFile>,
}

impl RunManifest {
    pub fn new(fingerprint: InputFingerprint, options: &AnalysisOptions) -> Self {
        Self {
            manifest_version: MANIFEST_VERSION,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            fingerprint,
            options: options.clone(),
            options_key: options.cache_key(),
            files: Vec::new(),
        }
    }

    /// Same inputs and same output-affecting options.
    pub fn matches(&self, fingerprint: &InputFingerprint, options: &AnalysisOptions) -> bool {
        self.manifest_version == MANIFEST_VERSION
            && self.fingerprint == *fingerprint
            && self.options_key == options.cache_key()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| OutputError::io("read", path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| OutputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// The manifest in `dir`, if one exists and parses.
pub fn read_manifest(dir: &Path) -> Result<Option<RunManifest>> {
    let path = dir.join(MANIFEST_FILE);
    if !path.exists() {
        return Ok(None);
    }
    match read_json(&path) {
        Ok(manifest) => Ok(Some(manifest)),
        Err(OutputError::Json { source, .. }) => {
            debug!(path = %path.display(), error = %source, "ignoring unreadable manifest");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// The stored summary when `dir` already holds the outputs of an
/// equivalent run.
///
/// Returns `None` when `force_reprocess` is set, when there is no manifest,
/// when inputs or options differ, or when a listed file is missing or was
/// modified.
pub fn cached_summary(
    dir: &Path,
    fingerprint: &InputFingerprint,
    options: &AnalysisOptions,
) -> Result<Option<RunSummary>> {
    if options.force_reprocess {
        debug!("cache bypassed by force_reprocess");
        return Ok(None);
    }
    let Some(manifest) = read_manifest(dir)? else {
        return Ok(None);
    };
    if !manifest.matches(fingerprint, options) {
        debug!(
            stored = %manifest.fingerprint.combined,
            current = %fingerprint.combined,
            "inputs or options changed since last run"
        );
        return Ok(None);
    }
    for file in &manifest.files {
        let path = dir.join(&file.name);
        if !path.exists() || compute_file_hash(&path)? != file.sha256 {
            debug!(file = %file.name, "stored output missing or modified");
            return Ok(None);
        }
    }

    let summary: RunSummary = match read_json(&dir.join(SUMMARY_FILE)) {
        Ok(summary) => summary,
        Err(OutputError::Json { .. }) => return Ok(None),
        Err(err) => return Err(err),
    };
    info!(
        dir = %dir.display(),
        created_at = %manifest.created_at,
        "inputs unchanged, reusing stored outputs"
    );
    Ok(Some(summary))
}
