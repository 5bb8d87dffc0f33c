//! Shared configuration for the campusnet tools.
//!
//! One TOML file layered over built-in defaults and `CAMPUSNET_*`
//! environment variables. The CLI adds flag-aware wrappers on top.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Where the telemetry snapshot lives. Falls back to the platform
    /// data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub simulator: SimulatorSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// Settings for `campusnet simulate`. The tick constants themselves are
/// fixed and deliberately absent here.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulatorSettings {
    /// Seconds between snapshot writes while simulating. 0 writes only on
    /// shutdown.
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            flush_interval_secs: default_flush_interval(),
        }
    }
}

fn default_flush_interval() -> u64 {
    5
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// "pretty" or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// When set, logs are also written to daily-rotated files here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_dir: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            file_dir: None,
        }
    }
}

fn default_log_format() -> String {
    "pretty".into()
}

impl Config {
    /// Reject values the loaders accept structurally but nothing can use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const OUTPUTS: [&str; 5] = ["table", "json", "json-compact", "yaml", "plain"];
        const COLORS: [&str; 3] = ["auto", "always", "never"];
        const FORMATS: [&str; 2] = ["pretty", "json"];

        let check = |field: &str, value: &str, allowed: &[&str]| {
            if allowed.contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::Validation {
                    field: field.into(),
                    reason: format!("expected one of {}, got '{value}'", allowed.join(", ")),
                })
            }
        };

        check("defaults.output", &self.defaults.output, &OUTPUTS)?;
        check("defaults.color", &self.defaults.color, &COLORS)?;
        check("logging.format", &self.logging.format, &FORMATS)
    }

    /// The configured snapshot path, or the platform default.
    pub fn state_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(default_state_path)
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("edu", "campusnet", "campusnet")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the telemetry snapshot.
pub fn default_state_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("state.json"),
        |dirs| dirs.data_dir().join("state.json"),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("campusnet");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CAMPUSNET_").split("__"))
}

/// Load the full Config from file + environment. `path` overrides the
/// platform location.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    let config: Config = figment(&path).extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, returning a default if it is missing or unreadable.
pub fn load_config_or_default(path: Option<&Path>) -> Config {
    load_config(path).unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path` (or the canonical
/// location).
pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(path)
}
