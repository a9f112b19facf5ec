//! File-to-file runs through the runner.

use rowdupe::config::Config;
use rowdupe::dataset::default_output_path;
use rowdupe::error::{ExitCode, Interrupted};
use rowdupe::matching::MatchError;
use rowdupe::cli::SummaryFormat;
use rowdupe::progress::{NoProgress, ProgressCallback};
use rowdupe::runner::{group_file, print_summary};
use rowdupe::signal::ShutdownHandler;
use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::tempdir;

const CONTACTS: &str = "\
Name,Email,Phone
Ann,ann@x.com,(555) 123-4567
\"Smith, Bob\",bob@x.com,
Annie,,+1 555 123 4567
Bobby,BOB@X.com,555-999-0000
";

fn config(match_types: &[&str]) -> Config {
    Config {
        match_types: match_types.iter().map(|t| (*t).to_string()).collect(),
        progress: false,
        ..Config::default()
    }
}

/// Counts progress events.
#[derive(Default)]
struct RecordingProgress {
    started: AtomicU64,
    rows: AtomicU64,
    finished: AtomicU64,
}

impl ProgressCallback for RecordingProgress {
    fn on_start(&self, _source: &str) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn on_row(&self, rows: u64, _duplicates: u64) {
        self.rows.store(rows, Ordering::SeqCst);
    }

    fn on_finish(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_group_file_writes_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("contacts.csv");
    fs::write(&input, CONTACTS).unwrap();
    let output = default_output_path(&input, "_output");

    let report = group_file(
        &input,
        &output,
        &config(&["email", "phone"]),
        &NoProgress,
        &ShutdownHandler::new(),
    )
    .unwrap();

    assert_eq!(report.output, output);
    assert_eq!(report.match_types, vec!["email", "phone"]);
    assert_eq!(report.stats.rows_processed, 4);
    assert_eq!(report.stats.duplicates, 2);
    assert_eq!(report.stats.groups, 2);

    let written = fs::read_to_string(&output).unwrap();
    let expected = "\
UID,Name,Email,Phone
1,Ann,ann@x.com,(555) 123-4567
2,\"Smith, Bob\",bob@x.com,
1,Annie,,+1 555 123 4567
2,Bobby,BOB@X.com,555-999-0000
";
    assert_eq!(written, expected);
}

#[test]
fn test_group_file_semicolon_delimiter() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, "Email;Phone\na@x.com;1\nA@x.com;2\n").unwrap();

    let mut cfg = config(&["email"]);
    cfg.delimiter = ';';
    group_file(&input, &output, &cfg, &NoProgress, &ShutdownHandler::new()).unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "UID;Email;Phone\n1;a@x.com;1\n1;A@x.com;2\n"
    );
}

#[test]
fn test_configuration_error_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("contacts.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, CONTACTS).unwrap();

    let err = group_file(
        &input,
        &output,
        &config(&["ssn"]),
        &NoProgress,
        &ShutdownHandler::new(),
    )
    .unwrap_err();

    assert!(err.downcast_ref::<MatchError>().is_some());
    assert_eq!(ExitCode::for_error(&err), ExitCode::ConfigurationError);
    assert!(!output.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_empty_input_is_missing_header() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    fs::write(&input, "").unwrap();

    let err = group_file(
        &input,
        &dir.path().join("out.csv"),
        &config(&["email"]),
        &NoProgress,
        &ShutdownHandler::new(),
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<MatchError>(),
        Some(MatchError::MissingHeader)
    ));
}

#[test]
fn test_interrupt_discards_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("contacts.csv");
    let output = dir.path().join("out.csv");
    fs::write(&input, CONTACTS).unwrap();
    fs::write(&output, "previous run").unwrap();

    let shutdown = ShutdownHandler::new();
    shutdown.request_shutdown();

    let err = group_file(&input, &output, &config(&["email"]), &NoProgress, &shutdown).unwrap_err();

    assert_eq!(err.downcast_ref::<Interrupted>().map(|i| i.rows), Some(0));
    assert_eq!(ExitCode::for_error(&err), ExitCode::Interrupted);
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous run");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn test_output_same_as_input_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("contacts.csv");
    fs::write(&input, CONTACTS).unwrap();

    let result = group_file(
        &input,
        &input,
        &config(&["email"]),
        &NoProgress,
        &ShutdownHandler::new(),
    );

    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&input).unwrap(), CONTACTS);
}

#[test]
fn test_missing_input_is_general_error() {
    let dir = tempdir().unwrap();
    let err = group_file(
        &dir.path().join("nope.csv"),
        &dir.path().join("out.csv"),
        &config(&["email"]),
        &NoProgress,
        &ShutdownHandler::new(),
    )
    .unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_invalid_delimiter_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("contacts.csv");
    fs::write(&input, CONTACTS).unwrap();

    let mut cfg = config(&["email"]);
    cfg.delimiter = '€';
    let result = group_file(
        &input,
        &dir.path().join("out.csv"),
        &cfg,
        &NoProgress,
        &ShutdownHandler::new(),
    );
    assert!(result.is_err());
}

#[test]
fn test_progress_finished_once_on_success() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("contacts.csv");
    fs::write(&input, CONTACTS).unwrap();
    let progress = RecordingProgress::default();

    group_file(
        &input,
        &dir.path().join("out.csv"),
        &config(&["email"]),
        &progress,
        &ShutdownHandler::new(),
    )
    .unwrap();

    assert_eq!(progress.started.load(Ordering::SeqCst), 1);
    assert_eq!(progress.rows.load(Ordering::SeqCst), 4);
    assert_eq!(progress.finished.load(Ordering::SeqCst), 1);
}

#[test]
fn test_progress_finished_when_a_row_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.csv");
    let output = dir.path().join("out.csv");
    let mut bytes = b"Email\na@x.com\n".to_vec();
    bytes.extend_from_slice(b"\xff\xfe@x.com\n");
    fs::write(&input, bytes).unwrap();
    let progress = RecordingProgress::default();

    let err = group_file(
        &input,
        &output,
        &config(&["email"]),
        &progress,
        &ShutdownHandler::new(),
    )
    .unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert_eq!(progress.finished.load(Ordering::SeqCst), 1);
    assert!(!output.exists());
}

#[test]
fn test_report_json_shape() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("contacts.csv");
    fs::write(&input, CONTACTS).unwrap();

    let report = group_file(
        &input,
        &dir.path().join("out.csv"),
        &config(&["email", "phone"]),
        &NoProgress,
        &ShutdownHandler::new(),
    )
    .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["started_at"].is_string());
    assert!(json["elapsed_secs"].as_f64().unwrap() >= 0.0);
    assert_eq!(json["match_types"], serde_json::json!(["email", "phone"]));
    assert_eq!(json["stats"]["rows_processed"], 4);
    assert_eq!(json["stats"]["duplicates"], 2);
    assert_eq!(json["stats"]["groups"], 2);
    assert_eq!(
        json["stats"]["index_entries"],
        serde_json::json!({ "email": 2, "phone": 2 })
    );

    for format in [SummaryFormat::Text, SummaryFormat::Json, SummaryFormat::None] {
        print_summary(&report, format).unwrap();
    }
}
