//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand};
use crate::config::{self, Config, Settings};
use crate::error::CliError;
use crate::output;

fn detail(c: &Config, state_path: &std::path::Path) -> String {
    [
        format!("state_file           = {}", state_path.display()),
        format!("defaults.output      = {}", c.defaults.output),
        format!("defaults.color       = {}", c.defaults.color),
        format!("simulator.flush_interval_secs = {}", c.simulator.flush_interval_secs),
        format!("logging.format       = {}", c.logging.format),
        format!(
            "logging.file_dir     = {}",
            c.logging
                .file_dir
                .as_ref()
                .map_or_else(|| "(stderr only)".into(), |d| d.display().to_string())
        ),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, settings: &Settings) -> Result<(), CliError> {
    match args.command {
        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init { force } => {
            let path = &settings.config_path;
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let cfg = Config {
                state_file: Some(settings.state_path.clone()),
                ..Config::default()
            };
            config::save_config(&cfg, Some(path))?;

            if !settings.quiet {
                eprintln!("✓ Configuration written to {}", path.display());
                eprintln!("  State file: {}", settings.state_path.display());
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let out = output::render_single(
                settings.output,
                &settings.config,
                |c| detail(c, &settings.state_path),
                |_| settings.config_path.display().to_string(),
            )?;
            output::print_output(&out, settings.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&settings.config_path.display().to_string(), settings.quiet);
            Ok(())
        }
    }
}
