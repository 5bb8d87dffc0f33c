// Test doubles shared by the simulator tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::CoreError;
use crate::model::{
    Alert, AlertSeverity, AlertStatus, Device, DeviceStatus, EntityId, MacAddress, NewDevice,
    TrafficSample,
};
use crate::store::{MemoryStore, TelemetryStore};

/// A store pre-populated with one device per `(status, clients)` pair, in
/// registration order.
#[allow(clippy::unwrap_used)]
pub(crate) fn seeded_store(devices: &[(DeviceStatus, u32)]) -> MemoryStore {
    let store = MemoryStore::new();
    for (i, (status, clients)) in devices.iter().enumerate() {
        store
            .add_device(NewDevice {
                device_id: format!("AP-{i:02}"),
                name: format!("Access point {i}"),
                zone: "Library".into(),
                mac_address: MacAddress::new(format!("02:00:00:00:00:{i:02x}")),
                status: *status,
                clients: *clients,
            })
            .unwrap();
        // Distinct creation times keep registry order stable.
        std::thread::sleep(Duration::from_millis(1));
    }
    store
}

/// Wraps a [`MemoryStore`] and fails or stalls on demand. Pruning is left
/// to the trait's row-by-row default.
pub(crate) struct FlakyStore {
    pub(crate) inner: MemoryStore,
    fail_updates: AtomicBool,
    stall_listing: AtomicBool,
}

impl FlakyStore {
    pub(crate) fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_updates: AtomicBool::new(false),
            stall_listing: AtomicBool::new(false),
        }
    }

    pub(crate) fn fail_updates(&self, on: bool) {
        self.fail_updates.store(on, Ordering::SeqCst);
    }

    pub(crate) fn stall_listing(&self, on: bool) {
        self.stall_listing.store(on, Ordering::SeqCst);
    }
}

impl TelemetryStore for FlakyStore {
    async fn list_devices(&self) -> Result<Vec<Device>, CoreError> {
        if self.stall_listing.load(Ordering::SeqCst) {
            tokio::time::sleep(Duration::from_secs(3_600)).await;
        }
        self.inner.list_devices().await
    }

    async fn update_device_clients(&self, id: EntityId, clients: u32) -> Result<(), CoreError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(CoreError::StoreUnavailable {
                reason: "injected failure".into(),
            });
        }
        self.inner.update_device_clients(id, clients).await
    }

    async fn insert_traffic_sample(
        &self,
        total_bandwidth: f64,
        active_users: u32,
    ) -> Result<TrafficSample, CoreError> {
        self.inner.insert_traffic_sample(total_bandwidth, active_users).await
    }

    async fn count_traffic_samples(&self) -> Result<usize, CoreError> {
        self.inner.count_traffic_samples().await
    }

    async fn list_oldest_traffic_samples(&self, n: usize) -> Result<Vec<TrafficSample>, CoreError> {
        self.inner.list_oldest_traffic_samples(n).await
    }

    async fn delete_traffic_sample(&self, id: EntityId) -> Result<(), CoreError> {
        self.inner.delete_traffic_sample(id).await
    }

    async fn insert_alert(
        &self,
        message: String,
        severity: AlertSeverity,
        zone: Option<String>,
        status: AlertStatus,
    ) -> Result<Alert, CoreError> {
        self.inner.insert_alert(message, severity, zone, status).await
    }
}
