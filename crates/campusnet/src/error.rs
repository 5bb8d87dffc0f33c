//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use campusnet_config::ConfigError;
use campusnet_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(campusnet::not_found),
        help("Run: campusnet {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(
        code(campusnet::conflict),
        help("Choose a different id, or remove the existing one first.")
    )]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(campusnet::validation))]
    Validation { field: String, reason: String },

    // ── State ────────────────────────────────────────────────────────

    #[error("Telemetry state at {path} could not be read or written")]
    #[diagnostic(
        code(campusnet::state),
        help(
            "Check the file permissions, or point --state at another file.\n\
             A missing file is fine; it is created on first write."
        )
    )]
    State {
        path: String,
        #[source]
        source: CoreError,
    },

    #[error("Storage failure: {0}")]
    #[diagnostic(code(campusnet::store))]
    Store(CoreError),

    // ── Configuration ────────────────────────────────────────────────

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(campusnet::config_exists),
        help("Pass --force to overwrite it, or edit it directly.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(campusnet::config),
        help("Run: campusnet config show to inspect the resolved configuration")
    )]
    Config(#[from] ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(campusnet::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(campusnet::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } | Self::ConfigExists { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::Config(ConfigError::Validation { .. }) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Wrap a snapshot load/save failure with the file it concerns.
    pub fn state(path: &std::path::Path, source: CoreError) -> Self {
        match source {
            CoreError::SnapshotIo { .. } | CoreError::SnapshotFormat { .. } => Self::State {
                path: path.display().to_string(),
                source,
            },
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },

            CoreError::Conflict {
                entity_type,
                identifier,
            } => CliError::Conflict {
                resource_type: entity_type,
                identifier,
            },

            CoreError::InvalidInput { field, reason } => CliError::Validation { field, reason },

            other => CliError::Store(other),
        }
    }
}
