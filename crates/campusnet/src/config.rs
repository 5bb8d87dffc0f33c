//! CLI configuration: thin wrapper around `campusnet_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--config, --state, --output, --color).

use std::path::PathBuf;

use clap::ValueEnum;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Re-exports from shared crate ────────────────────────────────────

pub use campusnet_config::{Config, LoggingSettings, config_path, load_config, save_config};

// ── Resolved settings ───────────────────────────────────────────────

/// Everything a command handler needs, with flags applied over config.
#[derive(Debug)]
pub struct Settings {
    pub config: Config,
    pub config_path: PathBuf,
    pub state_path: PathBuf,
    pub output: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Settings {
    pub fn resolve(global: &GlobalOpts, config: Config) -> Result<Self, CliError> {
        let output = match global.output {
            Some(format) => format,
            None => parse_value::<OutputFormat>("defaults.output", &config.defaults.output)?,
        };
        let color = match global.color {
            Some(mode) => mode,
            None => parse_value::<ColorMode>("defaults.color", &config.defaults.color)?,
        };
        let state_path = global.state.clone().unwrap_or_else(|| config.state_path());

        Ok(Self {
            config_path: config_file(global),
            state_path,
            output,
            color: output::should_color(color),
            quiet: global.quiet,
            config,
        })
    }
}

/// The config file in effect: `--config` if given, else the platform path.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load config honouring `--config`. Config subcommands pass `strict =
/// false` so a broken file can still be inspected or replaced.
pub fn load(global: &GlobalOpts, strict: bool) -> Result<Config, CliError> {
    let path = config_file(global);
    match load_config(Some(&path)) {
        Ok(cfg) => Ok(cfg),
        Err(e) if !strict => {
            tracing::debug!(error = %e, "config unreadable, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_value<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}
