//! Command dispatch: bridges CLI args -> store operations -> output formatting.

pub mod alerts;
pub mod config_cmd;
pub mod devices;
pub mod simulate;
pub mod traffic;

use campusnet_core::MemoryStore;

use crate::cli::Command;
use crate::config::Settings;
use crate::error::CliError;

/// Dispatch a state-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, settings: &Settings) -> Result<(), CliError> {
    match cmd {
        Command::Simulate(args) => simulate::handle(args, settings).await,
        Command::Devices(args) => devices::handle(args, settings).await,
        Command::Traffic(args) => traffic::handle(args, settings).await,
        Command::Alerts(args) => alerts::handle(args, settings).await,
        Command::Config(args) => config_cmd::handle(args, settings),
        // Completions are handled before dispatch
        Command::Completions(_) => Ok(()),
    }
}

// ── State helpers ───────────────────────────────────────────────────

/// Load the telemetry store from the resolved state file.
pub(crate) async fn open_store(settings: &Settings) -> Result<MemoryStore, CliError> {
    MemoryStore::load(&settings.state_path)
        .await
        .map_err(|e| CliError::state(&settings.state_path, e))
}

/// Write the store back to the resolved state file.
pub(crate) async fn persist(store: &MemoryStore, settings: &Settings) -> Result<(), CliError> {
    store
        .save(&settings.state_path)
        .await
        .map_err(|e| CliError::state(&settings.state_path, e))
}

/// Timestamp format shared by the table views.
pub(crate) const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
