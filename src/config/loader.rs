//! Layered settings for the demo: defaults, TOML file, environment, CLI.
//!
//! Everything here stays stringly typed until [`ResolvedConfig::policy`] and
//! [`ResolvedConfig::min_height`] validate it into domain types.

use crate::model::{Length, ObservationPolicy, PolicyError, RootMargin, Thresholds};
use crate::model::{DEFAULT_ROOT_MARGIN, DEFAULT_THRESHOLDS};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SIGHTLINE_CONFIG";
/// Environment variable overriding the root margin.
pub const ROOT_MARGIN_ENV: &str = "SIGHTLINE_ROOT_MARGIN";
/// Environment variable overriding the thresholds (comma separated).
pub const THRESHOLDS_ENV: &str = "SIGHTLINE_THRESHOLDS";

/// Largest number of demo columns.
pub const MAX_COLUMNS: usize = 4;

/// Failure to load the TOML settings file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a file, ...).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// CSS margin shorthand, e.g. `"10px"` or `"10px 0 20% 0"`.
    #[serde(default)]
    pub root_margin: Option<String>,

    /// Visibility ratios that trigger a crossing. A bare number is a
    /// one-element list.
    #[serde(default, deserialize_with = "one_or_many")]
    pub thresholds: Option<Vec<f64>>,

    /// Placeholder floor before a size is known, e.g. `"100px"`.
    #[serde(default)]
    pub min_placeholder_height: Option<String>,

    /// Number of demo cards per column.
    #[serde(default)]
    pub item_count: Option<usize>,

    /// Number of demo columns.
    #[serde(default)]
    pub columns: Option<usize>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(f64),
    Many(Vec<f64>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<f64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => Some(vec![value]),
        OneOrMany::Many(values) => Some(values),
    })
}

/// Settings after every layer has been applied, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Root margin (CSS shorthand).
    pub root_margin: String,
    /// Thresholds.
    pub thresholds: Vec<f64>,
    /// Minimum placeholder height (length string).
    pub min_placeholder_height: String,
    /// Cards per column.
    pub item_count: usize,
    /// Columns, within `1..=MAX_COLUMNS`.
    pub columns: usize,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            root_margin: DEFAULT_ROOT_MARGIN.to_string(),
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            min_placeholder_height: "100px".to_string(),
            item_count: 50,
            columns: 2,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Validate margin and thresholds into an observation policy.
    ///
    /// # Errors
    ///
    /// Returns the first margin or threshold validation error.
    pub fn policy(&self) -> Result<ObservationPolicy, PolicyError> {
        Ok(ObservationPolicy::from_parts(
            RootMargin::parse(&self.root_margin)?,
            Thresholds::new(self.thresholds.iter().copied())?,
        ))
    }

    /// Validate the placeholder floor.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidLength`] for a malformed length.
    pub fn min_height(&self) -> Result<Length, PolicyError> {
        Length::parse(&self.min_placeholder_height)
    }
}

fn clamp_columns(columns: usize) -> usize {
    columns.clamp(1, MAX_COLUMNS)
}

/// `<state_dir>/sightline/sightline.log`, or `./sightline.log` without a state dir.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("sightline").join("sightline.log")
    } else {
        PathBuf::from("sightline.log")
    }
}

/// Read one settings file. A missing file yields `Ok(None)`.
///
/// # Errors
///
/// [`ConfigError`] when the file exists but is unreadable or not valid TOML.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// `<config_dir>/sightline/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sightline").join("config.toml"))
}

/// Find and read the settings file.
///
/// Lookup order:
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `SIGHTLINE_CONFIG` environment variable
/// 3. Default path `~/.config/sightline/config.toml`
///
/// # Errors
///
/// Same as [`load_config_file`] for whichever path was chosen.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Layer the environment over file settings.
///
/// Checks `SIGHTLINE_ROOT_MARGIN` and `SIGHTLINE_THRESHOLDS`.
///
/// # Errors
///
/// Returns [`PolicyError::InvalidThresholdList`] when `SIGHTLINE_THRESHOLDS`
/// is not a comma separated list of numbers in `[0, 1]`.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, PolicyError> {
    if let Ok(margin) = std::env::var(ROOT_MARGIN_ENV) {
        config.root_margin = margin;
    }

    if let Ok(list) = std::env::var(THRESHOLDS_ENV) {
        config.thresholds = Thresholds::parse_list(&list)?.as_slice().to_vec();
    }

    Ok(config)
}

/// Fill every key missing from the file with its default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        root_margin: config.root_margin.unwrap_or(defaults.root_margin),
        thresholds: config.thresholds.unwrap_or(defaults.thresholds),
        min_placeholder_height: config
            .min_placeholder_height
            .unwrap_or(defaults.min_placeholder_height),
        item_count: config.item_count.unwrap_or(defaults.item_count),
        columns: clamp_columns(config.columns.unwrap_or(defaults.columns)),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Command-line overrides, one per flag. `None` means the flag was not given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    /// `--items`
    pub item_count: Option<usize>,
    /// `--columns`
    pub columns: Option<usize>,
    /// `--root-margin`
    pub root_margin: Option<String>,
    /// `--thresholds`, already split
    pub thresholds: Option<Vec<f64>>,
    /// `--min-height`
    pub min_placeholder_height: Option<String>,
}

/// Layer command-line flags over everything else.
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(items) = cli.item_count {
        config.item_count = items;
    }
    if let Some(columns) = cli.columns {
        config.columns = clamp_columns(columns);
    }
    if let Some(margin) = cli.root_margin {
        config.root_margin = margin;
    }
    if let Some(thresholds) = cli.thresholds {
        config.thresholds = thresholds;
    }
    if let Some(min_height) = cli.min_placeholder_height {
        config.min_placeholder_height = min_height;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
