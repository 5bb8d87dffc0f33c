// ── Core error types ──
//
// Storage is the only thing that can fail inside the simulator: every
// variant here describes a store that is unreachable, rejected a
// record, or could not be loaded from / written to disk.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage errors ───────────────────────────────────────────────
    #[error("Telemetry store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    #[error("Store operation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("{entity_type} '{identifier}' already exists")]
    Conflict {
        entity_type: String,
        identifier: String,
    },

    // ── Snapshot persistence ─────────────────────────────────────────
    #[error("Snapshot I/O failed for {path}: {source}")]
    SnapshotIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot at {path} is not valid JSON: {source}")]
    SnapshotFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CoreError {
    pub(crate) fn device_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "device".into(),
            identifier: identifier.into(),
        }
    }

    pub(crate) fn traffic_sample_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "traffic sample".into(),
            identifier: identifier.into(),
        }
    }
}
