// ── Device domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

use super::entity_id::{EntityId, MacAddress};
use crate::error::CoreError;

/// Device operational state.
///
/// Only `Online` devices take part in the traffic simulation; the other
/// states are set by operators and never transitioned by the simulator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceStatus {
    Online,
    #[default]
    Offline,
    Maintenance,
}

impl DeviceStatus {
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// An access point (or other radio) registered on the campus network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: EntityId,
    /// Operator-facing unique identifier, e.g. `AP-LIB-01`.
    pub device_id: String,
    pub name: String,
    /// Free-form grouping label (building, floor, ...).
    pub zone: String,
    pub mac_address: MacAddress,
    #[serde(default)]
    pub status: DeviceStatus,
    /// Associated client count. A missing or null value reads as 0.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub clients: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

/// Administrative request to register a device.
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub device_id: String,
    pub name: String,
    pub zone: String,
    pub mac_address: MacAddress,
    pub status: DeviceStatus,
    pub clients: u32,
}

impl NewDevice {
    /// Reject blank required fields and malformed MAC addresses.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("deviceId", &self.device_id),
            ("name", &self.name),
            ("zone", &self.zone),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidInput {
                    field: field.into(),
                    reason: "must not be empty".into(),
                });
            }
        }
        if !self.mac_address.is_well_formed() {
            return Err(CoreError::InvalidInput {
                field: "macAddress".into(),
                reason: format!("'{}' is not a six-octet MAC address", self.mac_address),
            });
        }
        Ok(())
    }

    pub(crate) fn into_device(self, now: DateTime<Utc>) -> Device {
        Device {
            id: EntityId::new(),
            device_id: self.device_id.trim().to_owned(),
            name: self.name.trim().to_owned(),
            zone: self.zone.trim().to_owned(),
            mac_address: self.mac_address,
            status: self.status,
            clients: self.clients,
            created_at: now,
            updated_at: now,
        }
    }
}
