// ── Traffic ledger types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// One aggregate bandwidth reading for the whole campus.
///
/// Samples are immutable once written; the ledger only ever appends new
/// samples and prunes the oldest ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSample {
    pub id: EntityId,
    pub timestamp: DateTime<Utc>,
    /// Aggregate bandwidth in Mbps. Never negative.
    pub total_bandwidth: f64,
    pub active_users: u32,
}

impl TrafficSample {
    pub fn new(total_bandwidth: f64, active_users: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: EntityId::new(),
            timestamp,
            total_bandwidth,
            active_users,
        }
    }
}
