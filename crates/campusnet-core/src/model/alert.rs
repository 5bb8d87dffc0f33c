// ── Alert domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::EntityId;

/// Alert severity, lowest to highest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

/// Lifecycle marker on an alert. Alerts are never cleared, so `active`
/// is the only state a stored alert can be in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AlertStatus {
    #[default]
    Active,
}

/// A network anomaly event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: EntityId,
    pub message: String,
    pub severity: AlertSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status: AlertStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn alert_status_defaults_to_active_when_absent() {
        let alert: Alert = serde_json::from_str(
            r#"{"id":"550e8400-e29b-41d4-a716-446655440000","message":"Interference detected in Library",
                "severity":"medium","timestamp":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(alert.status, AlertStatus::Active);
        assert_eq!(alert.zone, None);
    }

    #[test]
    fn alert_status_only_knows_active() {
        assert_eq!("ACTIVE".parse::<AlertStatus>().unwrap(), AlertStatus::Active);
        assert!("resolved".parse::<AlertStatus>().is_err());
        assert!(serde_json::from_str::<AlertStatus>(r#""acknowledged""#).is_err());
    }
}
