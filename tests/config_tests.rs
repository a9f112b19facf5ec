//! Configuration layering: defaults < TOML file < environment < CLI flags.

use clap::Parser;
use rowdupe::cli::Cli;
use rowdupe::config::Config;
use std::fs;
use std::sync::Mutex;
use tempfile::tempdir;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Clear all ROWDUPE_* environment variables to avoid interference.
fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("ROWDUPE_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn test_missing_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    let config = Config::load_from_path(dir.path().join("nonexistent.toml"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_from_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
match_types = ["email", "ssn"]
delimiter = "|"
progress = false
"#,
    )
    .unwrap();

    let config = Config::load(Some(path.as_path()));

    assert_eq!(config.match_types, vec!["email", "ssn"]);
    assert_eq!(config.delimiter, '|');
    assert!(!config.progress);
    assert_eq!(config.output_suffix, "_output");
}

#[test]
fn test_invalid_toml_falls_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "delimiter = \"too long\"").unwrap();

    let config = Config::load_from_path(&path);
    assert_eq!(config, Config::default());
}

#[test]
fn test_hierarchy_file_env_cli() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "output_suffix = \"_file\"\ndelimiter = \";\"\n").unwrap();

    // Environment overrides the file.
    std::env::set_var("ROWDUPE_OUTPUT_SUFFIX", "_env");
    let mut config = Config::load_from_path(&path);
    assert_eq!(config.output_suffix, "_env");
    assert_eq!(config.delimiter, ';');

    // CLI overrides both.
    let cli = Cli::try_parse_from(["rowdupe", "in.csv", "-d", ",", "-m", "phone"]).unwrap();
    config.merge_cli(&cli);
    assert_eq!(config.delimiter, ',');
    assert_eq!(config.match_types, vec!["phone"]);
    assert_eq!(config.output_suffix, "_env");

    std::env::remove_var("ROWDUPE_OUTPUT_SUFFIX");
}

#[test]
fn test_quiet_disables_progress() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let mut config = Config::default();
    let cli = Cli::try_parse_from(["rowdupe", "-q", "in.csv"]).unwrap();
    config.merge_cli(&cli);
    assert!(!config.progress);
}

fn file_with_semicolon(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, "delimiter = \";\"\noutput_suffix = \"_file\"\n").unwrap();
    path
}

#[test]
fn test_env_match_types_single_value() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = file_with_semicolon(dir.path());

    std::env::set_var("ROWDUPE_MATCH_TYPES", "ssn");
    let config = Config::load_from_path(&path);
    std::env::remove_var("ROWDUPE_MATCH_TYPES");

    assert_eq!(config.match_types, vec!["ssn"]);
    assert_eq!(config.delimiter, ';');
    assert_eq!(config.output_suffix, "_file");
}

#[test]
fn test_env_match_types_comma_list() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = file_with_semicolon(dir.path());

    for value in ["email,ssn", " email , ssn ", "[email, ssn]", "[\"email\",\"ssn\"]"] {
        std::env::set_var("ROWDUPE_MATCH_TYPES", value);
        let config = Config::load_from_path(&path);
        assert_eq!(config.match_types, vec!["email", "ssn"], "value {value:?}");
        assert_eq!(config.delimiter, ';');
    }
    std::env::remove_var("ROWDUPE_MATCH_TYPES");
}

#[test]
fn test_blank_env_match_types_is_ignored() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    std::env::set_var("ROWDUPE_MATCH_TYPES", " ");
    let config = Config::load_from_path(dir.path().join("nonexistent.toml"));
    std::env::remove_var("ROWDUPE_MATCH_TYPES");

    assert_eq!(config.match_types, vec!["email", "phone"]);
}

#[test]
fn test_bad_env_value_keeps_file_settings() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = file_with_semicolon(dir.path());

    std::env::set_var("ROWDUPE_DELIMITER", "too long");
    let config = Config::load_from_path(&path);
    std::env::remove_var("ROWDUPE_DELIMITER");

    assert_eq!(config.delimiter, ';');
    assert_eq!(config.output_suffix, "_file");
    assert_eq!(config.match_types, vec!["email", "phone"]);
}
