//! Progress reporting utilities using indicatif.
//!
//! The matching engine never prints; the runner reports through
//! [`ProgressCallback`], and [`Progress`] renders it as a terminal spinner.
//! Runs with progress disabled use [`NoProgress`].

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// How often the spinner message is refreshed, in rows.
const MESSAGE_INTERVAL: u64 = 1_000;

/// Progress callback for a grouping run.
pub trait ProgressCallback: Send + Sync {
    /// Called once the header has been resolved and rows start flowing.
    ///
    /// # Arguments
    ///
    /// * `source` - Display name of the input
    fn on_start(&self, source: &str);

    /// Called after each data row.
    ///
    /// # Arguments
    ///
    /// * `rows` - Rows processed so far
    /// * `duplicates` - Duplicates found so far
    fn on_row(&self, rows: u64, duplicates: u64);

    /// Called when the run ends, successfully or not.
    fn on_finish(&self) {}
}

/// Callback that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&self, _source: &str) {}
    fn on_row(&self, _rows: u64, _duplicates: u64) {}
}

/// Progress reporter using indicatif.
#[derive(Default)]
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
}

impl Progress {
    /// Create a new progress reporter. The spinner appears on the first
    /// [`ProgressCallback::on_start`].
    ///
    /// # Examples
    ///
    /// ```
    /// use rowdupe::progress::Progress;
    ///
    /// let progress = Progress::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {pos} rows ({per_sec}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }
}

impl ProgressCallback for Progress {
    fn on_start(&self, source: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::style());
        pb.set_message(format!("Grouping {source}"));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut bar) = self.bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_row(&self, rows: u64, duplicates: u64) {
        if let Ok(bar) = self.bar.lock() {
            if let Some(ref pb) = *bar {
                pb.set_position(rows);
                if rows % MESSAGE_INTERVAL == 0 {
                    pb.set_message(format!("{duplicates} duplicates"));
                }
            }
        }
    }

    fn on_finish(&self) {
        if let Ok(mut bar) = self.bar.lock() {
            if let Some(pb) = bar.take() {
                pb.finish_and_clear();
            }
        }
    }
}
