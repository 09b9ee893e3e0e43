//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::grid::{AnimationTimings, GapSpec, GridOptions, JustifyMode, SortSpec};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FLUENT_GRID_CONFIG";

/// Environment variable overriding the horizontal gap (`N`, `Npx` or `justify`).
pub const X_GAP_ENV: &str = "FLUENT_GRID_X_GAP";

/// Environment variable overriding the justify mode.
pub const JUSTIFY_ENV: &str = "FLUENT_GRID_JUSTIFY";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A setting parsed but its value is out of range or unknown.
    #[error("Invalid value for {setting}: {reason}")]
    InvalidValue {
        /// Setting name as written in the file, env var or flag.
        setting: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Horizontal gap as written in TOML: a number or the string `"justify"`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GapSetting {
    /// Gap in pixels.
    Pixels(f64),
    /// A keyword, or a pixel value written as a string.
    Named(String),
}

impl GapSetting {
    fn to_gap_spec(&self) -> Result<GapSpec, ConfigError> {
        match self {
            Self::Pixels(px) => Ok(GapSpec::Fixed(*px)),
            Self::Named(name) => name.parse().map_err(|reason| ConfigError::InvalidValue {
                setting: "x_gap",
                reason,
            }),
        }
    }
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/fluent-grid/config.toml`:
///
/// ```toml
/// item_width = 120
/// item_height = 80
/// x_gap = "justify"
/// justify = "space-between"
/// key_field = "symbol"
///
/// [[sort_fields]]
/// field = "weight"
/// kind = "number"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Item width in pixels.
    #[serde(default)]
    pub item_width: Option<f64>,

    /// Item height in pixels.
    #[serde(default)]
    pub item_height: Option<f64>,

    /// Horizontal gap policy.
    #[serde(default)]
    pub x_gap: Option<GapSetting>,

    /// Vertical gap in pixels.
    #[serde(default)]
    pub y_gap: Option<f64>,

    /// `none`, `space-around` or `space-between`.
    #[serde(default)]
    pub justify: Option<String>,

    /// Field holding each item's identity.
    #[serde(default)]
    pub key_field: Option<String>,

    /// Field shown on each card.
    #[serde(default)]
    pub label_field: Option<String>,

    /// Field whose distinct values the filter key cycles through.
    #[serde(default)]
    pub filter_field: Option<String>,

    /// Sort fields bound to the number keys, in order.
    #[serde(default)]
    pub sort_fields: Option<Vec<SortSpec>>,

    /// Relayout animation length.
    #[serde(default)]
    pub flip_duration_ms: Option<u64>,

    /// Entrance animation length.
    #[serde(default)]
    pub entrance_duration_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Item width in pixels.
    pub item_width: f64,
    /// Item height in pixels.
    pub item_height: f64,
    /// Horizontal gap policy.
    pub x_gap: GapSpec,
    /// Vertical gap in pixels.
    pub y_gap: f64,
    /// Free space distribution.
    pub justify: JustifyMode,
    /// Identity field.
    pub key_field: String,
    /// Card label field.
    pub label_field: String,
    /// Filter cycling field.
    pub filter_field: String,
    /// Sortable fields.
    pub sort_fields: Vec<SortSpec>,
    /// Relayout animation length.
    pub flip_duration: Duration,
    /// Entrance animation length.
    pub entrance_duration: Duration,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let grid = GridOptions::default();
        Self {
            item_width: grid.item_width_px,
            item_height: grid.item_height_px,
            x_gap: grid.x_gap,
            y_gap: grid.y_gap_px,
            justify: grid.justify,
            key_field: "name".to_string(),
            label_field: "name".to_string(),
            filter_field: "type".to_string(),
            sort_fields: Vec::new(),
            flip_duration: grid.timings.flip,
            entrance_duration: grid.timings.entrance,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Options for the reconciliation controller.
    pub fn grid_options(&self) -> GridOptions {
        GridOptions {
            item_width_px: self.item_width,
            item_height_px: self.item_height,
            x_gap: self.x_gap,
            y_gap_px: self.y_gap,
            justify: self.justify,
            timings: AnimationTimings {
                flip: self.flip_duration,
                entrance: self.entrance_duration,
            },
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/fluent-grid/fluent-grid.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("fluent-grid").join("fluent-grid.log")
    } else {
        PathBuf::from("fluent-grid.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
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

    info!(path = %path.display(), "loaded config file");
    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/fluent-grid/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("fluent-grid").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `FLUENT_GRID_CONFIG` environment variable
/// 3. Default path `~/.config/fluent-grid/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
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

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
///
/// # Errors
///
/// [`ConfigError::InvalidValue`] for an unknown gap keyword or justify mode.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    let x_gap = match &config.x_gap {
        Some(setting) => setting.to_gap_spec()?,
        None => defaults.x_gap,
    };
    let justify = match &config.justify {
        Some(mode) => parse_justify("justify", mode)?,
        None => defaults.justify,
    };

    Ok(ResolvedConfig {
        item_width: config.item_width.unwrap_or(defaults.item_width),
        item_height: config.item_height.unwrap_or(defaults.item_height),
        x_gap,
        y_gap: config.y_gap.unwrap_or(defaults.y_gap),
        justify,
        key_field: config.key_field.unwrap_or(defaults.key_field),
        label_field: config.label_field.unwrap_or(defaults.label_field),
        filter_field: config.filter_field.unwrap_or(defaults.filter_field),
        sort_fields: config.sort_fields.unwrap_or(defaults.sort_fields),
        flip_duration: config
            .flip_duration_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.flip_duration),
        entrance_duration: config
            .entrance_duration_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.entrance_duration),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    })
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `FLUENT_GRID_X_GAP`: Override horizontal gap
/// - `FLUENT_GRID_JUSTIFY`: Override justify mode
///
/// # Errors
///
/// [`ConfigError::InvalidValue`] when a variable is set to something unparseable.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(gap) = std::env::var(X_GAP_ENV) {
        config.x_gap = gap.parse().map_err(|reason| ConfigError::InvalidValue {
            setting: X_GAP_ENV,
            reason,
        })?;
    }

    if let Ok(mode) = std::env::var(JUSTIFY_ENV) {
        config.justify = parse_justify(JUSTIFY_ENV, &mode)?;
    }

    Ok(config)
}

/// Layout flags given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    /// `--item-width`
    pub item_width: Option<f64>,
    /// `--item-height`
    pub item_height: Option<f64>,
    /// `--x-gap`
    pub x_gap: Option<GapSpec>,
    /// `--y-gap`
    pub y_gap: Option<f64>,
    /// `--justify`
    pub justify: Option<JustifyMode>,
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(mut config: ResolvedConfig, cli: CliOverrides) -> ResolvedConfig {
    if let Some(width) = cli.item_width {
        config.item_width = width;
    }
    if let Some(height) = cli.item_height {
        config.item_height = height;
    }
    if let Some(gap) = cli.x_gap {
        config.x_gap = gap;
    }
    if let Some(gap) = cli.y_gap {
        config.y_gap = gap;
    }
    if let Some(justify) = cli.justify {
        config.justify = justify;
    }
    config
}

fn parse_justify(setting: &'static str, value: &str) -> Result<JustifyMode, ConfigError> {
    value
        .parse()
        .map_err(|reason| ConfigError::InvalidValue { setting, reason })
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
