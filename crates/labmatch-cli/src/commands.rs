use anyhow::Result;
use labmatch_cli::config::{OptionOverrides, RunConfig};
use labmatch_cli::pipeline::{InspectReport, RunRequest, RunResult, inspect_sources, run_pipeline};
use labmatch_cli::progress::BarProgress;
use labmatch_core::{LogProgress, NoProgress, ProgressSink};
use labmatch_ingest::SourcePaths;

use crate::cli::{InspectArgs, RunArgs, SourceArgs};

fn source_paths(args: &SourceArgs) -> SourcePaths {
    SourcePaths::new(&args.cohort, &args.labs, &args.cancer)
}

pub fn run_command(args: &RunArgs, draw_progress: bool) -> Result<RunResult> {
    let config = RunConfig::load_optional(args.sources.config.as_deref())?;
    let overrides = OptionOverrides {
        max_date_diff_days: args.max_date_diff,
        patient_limit: args.patient_limit,
        keep_digit_columns: args.keep_digit_columns,
        force_reprocess: args.force,
        progress_interval: args.progress_interval,
    };
    let request = RunRequest {
        sources: source_paths(&args.sources),
        output_dir: args.output_dir.clone(),
        options: overrides.apply(config.analysis),
        columns: config.columns,
    };

    let mut progress: Box<dyn ProgressSink> = if args.no_progress {
        Box::new(NoProgress)
    } else if draw_progress {
        Box::new(BarProgress::new())
    } else {
        Box::new(LogProgress::default())
    };
    run_pipeline(&request, progress.as_mut())
}

pub fn inspect_command(args: &InspectArgs) -> Result<InspectReport> {
    let config = RunConfig::load_optional(args.sources.config.as_deref())?;
    inspect_sources(&source_paths(&args.sources), &config.columns)
}
