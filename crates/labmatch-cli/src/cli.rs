//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use labmatch_model::PatientLimit;

#[derive(Parser)]
#[command(
    name = "labmatch",
    version,
    about = "Match cohort reference dates to the nearest laboratory results",
    long_about = "Match every cohort patient's reference date to the nearest lab result of each \
                  test type within a window, and write wide, long and suffix-disambiguated \
                  result tables as CSV."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match the cohort against the lab extract and write result tables.
    Run(RunArgs),

    /// Load the extracts and print row counts and patient overlap.
    Inspect(InspectArgs),
}

/// The three source extracts.
#[derive(Args)]
pub struct SourceArgs {
    /// Cohort CSV (patient id, reference date).
    #[arg(long, value_name = "CSV")]
    pub cohort: PathBuf,

    /// Lab results CSV.
    #[arg(long, value_name = "CSV")]
    pub labs: PathBuf,

    /// Cancer diagnosis CSV.
    #[arg(long, value_name = "CSV")]
    pub cancer: PathBuf,

    /// TOML file with [analysis] and [columns] sections.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Directory receiving the CSV tables, summary.json and manifest.json.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Largest accepted distance between collection and reference date, in days.
    #[arg(long = "max-date-diff", value_name = "DAYS")]
    pub max_date_diff: Option<u32>,

    /// Number of cohort patients processed, or "unbounded".
    #[arg(long = "patient-limit", value_name = "N")]
    pub patient_limit: Option<PatientLimit>,

    /// Keep matrix columns whose test type code is digits only.
    #[arg(long = "keep-digit-columns")]
    pub keep_digit_columns: bool,

    /// Recompute even when the stored outputs match the inputs.
    #[arg(long)]
    pub force: bool,

    /// Patients between two progress updates.
    #[arg(long = "progress-interval", value_name = "N")]
    pub progress_interval: Option<usize>,

    /// Do not draw a progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
