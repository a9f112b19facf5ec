//! File-to-file runs: read, group, write atomically, report.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use yansi::Paint;

use crate::cli::SummaryFormat;
use crate::config::Config;
use crate::dataset::{delimiter_byte, AtomicCsvWriter, DatasetReader};
use crate::error::Interrupted;
use crate::matching::{GroupingSession, MatchError, RunStatistics, StreamProcessor};
use crate::progress::ProgressCallback;
use crate::signal::ShutdownHandler;

/// Outcome of a completed file run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Input file.
    pub input: PathBuf,
    /// Output file that was written.
    pub output: PathBuf,
    /// Match types the run was configured with.
    pub match_types: Vec<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in seconds.
    pub elapsed_secs: f64,
    /// Counters from the matching engine.
    pub stats: RunStatistics,
}

/// Group `input` into `output`.
///
/// The output file only appears once every row has been written. Errors,
/// including a Ctrl+C observed through `shutdown`, leave any existing file
/// at `output` untouched.
///
/// # Errors
///
/// Returns [`MatchError`] for configuration problems, [`Interrupted`] when
/// stopped by the user, and I/O or CSV errors otherwise.
pub fn group_file(
    input: &Path,
    output: &Path,
    config: &Config,
    progress: &dyn ProgressCallback,
    shutdown: &ShutdownHandler,
) -> Result<RunReport> {
    if same_file(input, output) {
        bail!(
            "Output path {} is the same as the input file",
            output.display()
        );
    }

    let started_at = Utc::now();
    let timer = Instant::now();

    let delimiter = delimiter_byte(config.delimiter)?;
    let processor = StreamProcessor::new(&config.match_types)?;

    let mut reader = DatasetReader::open(input, delimiter)?;
    let header = reader
        .next()
        .ok_or(MatchError::MissingHeader)?
        .with_context(|| format!("Failed to read header of {}", input.display()))?;
    let mut session = processor.begin(header.as_slice())?;

    let mut writer = AtomicCsvWriter::new(output, delimiter)?;
    writer.write_row(session.output_header())?;

    progress.on_start(&input.display().to_string());
    let streamed = stream_rows(reader, &mut session, &mut writer, input, progress, shutdown);
    progress.on_finish();
    streamed?;

    let output = writer.finish()?;
    let stats = session.finish();

    log::info!(
        "Grouped {} rows into {} groups ({} duplicates)",
        stats.rows_processed,
        stats.groups,
        stats.duplicates
    );

    Ok(RunReport {
        input: input.to_path_buf(),
        output,
        match_types: processor
            .match_types()
            .iter()
            .map(|t| t.token().to_string())
            .collect(),
        started_at,
        elapsed_secs: timer.elapsed().as_secs_f64(),
        stats,
    })
}

/// Copy every remaining row through the session into the writer.
fn stream_rows<R: Read>(
    reader: DatasetReader<R>,
    session: &mut GroupingSession,
    writer: &mut AtomicCsvWriter,
    input: &Path,
    progress: &dyn ProgressCallback,
    shutdown: &ShutdownHandler,
) -> Result<()> {
    for row in reader {
        if shutdown.is_shutdown_requested() {
            let rows = session.rows_processed();
            log::warn!("Interrupted after {} rows", rows);
            return Err(Interrupted { rows }.into());
        }

        let row = row.with_context(|| format!("Failed to read {}", input.display()))?;
        let out = session.process_row(row);
        writer.write_row(&out)?;
        progress.on_row(session.rows_processed(), session.duplicates());
    }
    Ok(())
}

/// Print the end-of-run summary to stdout.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_summary(report: &RunReport, format: SummaryFormat) -> Result<()> {
    match format {
        SummaryFormat::None => {}
        SummaryFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        SummaryFormat::Text => {
            let stats = &report.stats;
            println!(
                "{} {} rows in {:.2}s",
                "Processed".bold(),
                stats.rows_processed,
                report.elapsed_secs
            );
            println!("  Groups:      {}", stats.groups.green());
            println!(
                "  Duplicates:  {} ({:.1}%)",
                stats.duplicates.yellow(),
                stats.duplicate_rate()
            );
            for (field_type, entries) in &stats.index_entries {
                println!("  {:<12} {} distinct", format!("{field_type}:"), entries);
            }
            println!("  Output:      {}", report.output.display().cyan());
        }
    }
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
