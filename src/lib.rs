//! rowdupe - single-pass record grouping for delimited files
//!
//! Assigns every record a group identifier (UID). Records whose normalized
//! email, phone or other configured match value was seen before inherit the
//! earlier record's UID; the first occurrence of a value opens a new group.
//!
//! The engine lives in [`matching`] and works on plain rows. Everything else
//! (files, CLI, progress, signals) is glue around it for the binary.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod matching;
pub mod progress;
pub mod runner;
pub mod signal;

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Config;
use crate::dataset::default_output_path;
use crate::error::ExitCode;
use crate::progress::{NoProgress, Progress, ProgressCallback};

/// Run the binary with parsed arguments.
///
/// # Errors
///
/// Returns configuration, I/O and interrupt errors; see
/// [`ExitCode::for_error`] for how they map to exit codes.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let mut config = Config::load(cli.config.as_deref());
    config.merge_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let shutdown = signal::install_handler();

    let progress: Box<dyn ProgressCallback> = if config.progress {
        Box::new(Progress::new())
    } else {
        Box::new(NoProgress)
    };

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cli.input, &config.output_suffix));

    let report = runner::group_file(&cli.input, &output, &config, progress.as_ref(), &shutdown)?;
    runner::print_summary(&report, cli.summary_format())?;

    Ok(ExitCode::Success)
}
