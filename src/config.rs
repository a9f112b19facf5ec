//! Layered run configuration.
//!
//! Precedence, lowest to highest:
//! defaults < TOML config file < `ROWDUPE_*` environment variables < CLI flags.
//!
//! ```toml
//! # ~/.config/rowdupe/config.toml
//! match_types = ["email", "phone"]
//! delimiter = ";"
//! progress = false
//! output_suffix = "_grouped"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

/// Prefix of environment overrides, e.g. `ROWDUPE_DELIMITER=";"`.
pub const ENV_PREFIX: &str = "ROWDUPE_";

/// Run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Match column types, in priority-free configuration order.
    pub match_types: Vec<String>,
    /// Field delimiter for both input and output.
    pub delimiter: char,
    /// Show a progress spinner while processing.
    pub progress: bool,
    /// Suffix appended to the input file stem to name the output.
    pub output_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            match_types: vec!["email".to_string(), "phone".to_string()],
            delimiter: ',',
            progress: true,
            output_suffix: "_output".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the platform default location.
    ///
    /// A missing or invalid file falls back to defaults. Environment
    /// overrides are applied on top either way.
    #[must_use]
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        Self::layered(path.as_deref())
    }

    /// Load configuration from a specific TOML file plus the environment.
    #[must_use]
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        Self::layered(Some(path.as_ref()))
    }

    /// Apply command-line overrides.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if !cli.match_types.is_empty() {
            self.match_types.clone_from(&cli.match_types);
        }
        if let Some(delimiter) = cli.delimiter {
            self.delimiter = delimiter;
        }
        if cli.no_progress || cli.quiet {
            self.progress = false;
        }
    }

    /// Platform configuration file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "rowdupe", "rowdupe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn layered(path: Option<&Path>) -> Self {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if path.exists() {
                log::debug!("Loading configuration from {}", path.display());
            } else {
                log::debug!("No configuration file at {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        let file_config = match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid configuration file, using defaults: {}", e);
                Self::default()
            }
        };

        // A bad environment value must not discard settings from the file.
        let mut figment = Figment::from(Serialized::defaults(file_config.clone()))
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["match_types"]));
        if let Some(match_types) = env_match_types() {
            figment = figment.merge(Serialized::default("match_types", match_types));
        }

        match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring invalid {}* environment overrides: {}", ENV_PREFIX, e);
                file_config
            }
        }
    }
}

/// `ROWDUPE_MATCH_TYPES` as a list: `ssn`, `email,phone` and `[email, phone]`
/// are all accepted. Unset or blank means no override.
fn env_match_types() -> Option<Vec<String>> {
    let raw = std::env::var(format!("{ENV_PREFIX}MATCH_TYPES")).ok()?;
    let types: Vec<String> = raw
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|t| t.trim().trim_matches(|c: char| c == '"' || c == '\'').trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if types.is_empty() {
        None
    } else {
        Some(types)
    }
}
