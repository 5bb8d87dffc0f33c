// ── In-process telemetry store ──
//
// Devices and alerts live in entity collections; the traffic ledger is a
// deque kept in timestamp order so retention is a drain from the front.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::TelemetryStore;
use super::collection::EntityCollection;
use crate::error::CoreError;
use crate::model::{
    Alert, AlertSeverity, AlertStatus, Device, EntityId, NewDevice, TrafficSample,
};

/// Document store held entirely in memory.
///
/// Thread-safe: device and alert reads are served from cached snapshots,
/// writes take per-shard `DashMap` locks, and the traffic ledger sits
/// behind an async `RwLock`. See [`StoreSnapshot`](super::StoreSnapshot)
/// for persisting it between runs.
pub struct MemoryStore {
    pub(super) devices: EntityCollection<Device>,
    pub(super) alerts: EntityCollection<Alert>,
    pub(super) traffic: RwLock<VecDeque<TrafficSample>>,
    traffic_revision: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            devices: EntityCollection::new(),
            alerts: EntityCollection::new(),
            traffic: RwLock::new(VecDeque::new()),
            traffic_revision: AtomicU64::new(0),
        }
    }

    // ── Device administration ────────────────────────────────────────

    /// Register a device. `deviceId` must be unique across the registry.
    pub fn add_device(&self, request: NewDevice) -> Result<Device, CoreError> {
        request.validate()?;
        let device = request.into_device(Utc::now());
        self.devices
            .insert(device.id, Some(device.device_id.clone()), device.clone())
            .map_err(|_| CoreError::Conflict {
                entity_type: "device".into(),
                identifier: device.device_id.clone(),
            })?;
        debug!(
            device_id = %device.device_id,
            id = %device.id,
            registered = self.devices.len(),
            "device registered"
        );
        Ok(device)
    }

    /// Remove a device by record id or `deviceId`.
    pub fn remove_device(&self, identifier: &str) -> Result<Device, CoreError> {
        let id = self
            .resolve_device(identifier)
            .ok_or_else(|| CoreError::device_not_found(identifier))?;
        let removed = self
            .devices
            .remove(&id)
            .ok_or_else(|| CoreError::device_not_found(identifier))?;
        debug!(device_id = %removed.device_id, "device removed");
        Ok((*removed).clone())
    }

    /// Look up a device by record id or `deviceId`.
    pub fn device(&self, identifier: &str) -> Option<Device> {
        let id = self.resolve_device(identifier)?;
        self.devices.get(&id).map(|d| (*d).clone())
    }

    /// All devices ordered by registration time.
    pub fn devices(&self) -> Vec<Device> {
        let mut devices: Vec<Device> = self
            .devices
            .snapshot()
            .iter()
            .map(|d| (**d).clone())
            .collect();
        devices.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.device_id.cmp(&b.device_id))
        });
        devices
    }

    fn resolve_device(&self, identifier: &str) -> Option<EntityId> {
        if let Ok(id) = identifier.parse::<EntityId>() {
            if self.devices.get(&id).is_some() {
                return Some(id);
            }
        }
        self.devices.id_for_key(identifier.trim())
    }

    // ── Read views ───────────────────────────────────────────────────

    /// The newest `limit` samples, returned oldest first (chart order).
    pub async fn recent_traffic(&self, limit: usize) -> Vec<TrafficSample> {
        let ledger = self.traffic.read().await;
        let skip = ledger.len().saturating_sub(limit);
        ledger.iter().skip(skip).cloned().collect()
    }

    /// Alerts sorted newest first, optionally truncated.
    pub fn alerts_newest_first(&self, limit: Option<usize>) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .snapshot()
            .iter()
            .map(|a| (**a).clone())
            .collect();
        alerts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if let Some(limit) = limit {
            alerts.truncate(limit);
        }
        alerts
    }

    /// Monotonic counter that changes whenever any record changes.
    /// Used to skip redundant snapshot writes.
    pub fn revision(&self) -> u64 {
        self.devices.version() + self.alerts.version() + self.traffic_revision.load(Ordering::Relaxed)
    }

    pub(super) fn bump_traffic_revision(&self) {
        self.traffic_revision.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryStore for MemoryStore {
    async fn list_devices(&self) -> Result<Vec<Device>, CoreError> {
        Ok(self.devices())
    }

    async fn update_device_clients(&self, id: EntityId, clients: u32) -> Result<(), CoreError> {
        self.devices
            .update(&id, |device| {
                device.clients = clients;
                device.updated_at = Utc::now();
            })
            .map(|_| ())
            .ok_or_else(|| CoreError::device_not_found(id.to_string()))
    }

    async fn insert_traffic_sample(
        &self,
        total_bandwidth: f64,
        active_users: u32,
    ) -> Result<TrafficSample, CoreError> {
        let mut ledger = self.traffic.write().await;
        // Keep the deque sorted even if the wall clock steps backwards.
        let now = Utc::now();
        let timestamp = ledger.back().map_or(now, |last| last.timestamp.max(now));
        let sample = TrafficSample::new(total_bandwidth, active_users, timestamp);
        ledger.push_back(sample.clone());
        self.bump_traffic_revision();
        Ok(sample)
    }

    async fn count_traffic_samples(&self) -> Result<usize, CoreError> {
        Ok(self.traffic.read().await.len())
    }

    async fn list_oldest_traffic_samples(&self, n: usize) -> Result<Vec<TrafficSample>, CoreError> {
        Ok(self.traffic.read().await.iter().take(n).cloned().collect())
    }

    async fn delete_traffic_sample(&self, id: EntityId) -> Result<(), CoreError> {
        let mut ledger = self.traffic.write().await;
        let position = ledger
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CoreError::traffic_sample_not_found(id.to_string()))?;
        ledger.remove(position);
        self.bump_traffic_revision();
        Ok(())
    }

    async fn insert_alert(
        &self,
        message: String,
        severity: AlertSeverity,
        zone: Option<String>,
        status: AlertStatus,
    ) -> Result<Alert, CoreError> {
        let alert = Alert {
            id: EntityId::new(),
            message,
            severity,
            zone,
            timestamp: Utc::now(),
            status,
        };
        self.alerts
            .insert(alert.id, None, alert.clone())
            .map_err(|existing| CoreError::Conflict {
                entity_type: "alert".into(),
                identifier: existing.to_string(),
            })?;
        Ok(alert)
    }

    async fn prune_traffic_samples(&self, keep: usize) -> Result<usize, CoreError> {
        let mut ledger = self.traffic.write().await;
        let excess = ledger.len().saturating_sub(keep);
        if excess > 0 {
            ledger.drain(..excess);
            self.bump_traffic_revision();
        }
        Ok(excess)
    }
}
