//! Run configuration: built-in defaults, then an optional TOML file, then
//! command-line flags.
//!
//! ```toml
//! [analysis]
//! max_date_diff_days = 180
//! patient_limit = "unbounded"
//!
//! [columns.cohort]
//! reference_date = "index_date"
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use labmatch_model::{AnalysisOptions, PatientLimit, SourceColumns};

/// Contents of a `--config` file. Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub analysis: AnalysisOptions,
    pub columns: SourceColumns,
}

impl RunConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse TOML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Defaults when `path` is `None`.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// Option values given on the command line; `None` keeps the file value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub max_date_diff_days: Option<u32>,
    pub patient_limit: Option<PatientLimit>,
    pub keep_digit_columns: bool,
    pub force_reprocess: bool,
    pub progress_interval: Option<usize>,
}

impl OptionOverrides {
    pub fn apply(&self, mut options: AnalysisOptions) -> AnalysisOptions {
        if let Some(days) = self.max_date_diff_days {
            options.max_date_diff_days = days;
        }
        if let Some(limit) = self.patient_limit {
            options.patient_limit = limit;
        }
        if self.keep_digit_columns {
            options.prune_digit_only_columns = false;
        }
        if self.force_reprocess {
            options.force_reprocess = true;
        }
        if let Some(interval) = self.progress_interval {
            options.progress_interval = interval;
        }
        options
    }
}
