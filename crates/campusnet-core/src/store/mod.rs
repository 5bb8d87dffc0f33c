// ── Telemetry storage ──
//
// The contract the simulator writes through, plus the in-process
// document store that implements it.

mod collection;
mod memory;
mod snapshot;

use std::future::Future;

use crate::error::CoreError;
use crate::model::{Alert, AlertSeverity, AlertStatus, Device, EntityId, TrafficSample};

pub use memory::MemoryStore;
pub use snapshot::{RegistryMerge, StoreSnapshot};

/// Storage operations the telemetry simulator depends on.
///
/// Implementations only need per-record atomicity; nothing here is
/// transactional, and concurrent writers may interleave between calls.
pub trait TelemetryStore: Send + Sync + 'static {
    /// All registered devices, in a stable order.
    fn list_devices(&self) -> impl Future<Output = Result<Vec<Device>, CoreError>> + Send;

    /// Persist a new client count for one device.
    fn update_device_clients(
        &self,
        id: EntityId,
        clients: u32,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Append a sample timestamped at insertion time.
    fn insert_traffic_sample(
        &self,
        total_bandwidth: f64,
        active_users: u32,
    ) -> impl Future<Output = Result<TrafficSample, CoreError>> + Send;

    fn count_traffic_samples(&self) -> impl Future<Output = Result<usize, CoreError>> + Send;

    /// The `n` oldest samples, ascending by timestamp.
    fn list_oldest_traffic_samples(
        &self,
        n: usize,
    ) -> impl Future<Output = Result<Vec<TrafficSample>, CoreError>> + Send;

    fn delete_traffic_sample(&self, id: EntityId) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn insert_alert(
        &self,
        message: String,
        severity: AlertSeverity,
        zone: Option<String>,
        status: AlertStatus,
    ) -> impl Future<Output = Result<Alert, CoreError>> + Send;

    /// Delete every sample older than the `keep` most recent ones and
    /// return how many were removed.
    ///
    /// The default walks the oldest rows and deletes them one at a time;
    /// stores with a native bulk delete should override it.
    fn prune_traffic_samples(&self, keep: usize) -> impl Future<Output = Result<usize, CoreError>> + Send {
        async move {
            let count = self.count_traffic_samples().await?;
            if count <= keep {
                return Ok(0);
            }
            let stale = self.list_oldest_traffic_samples(count - keep).await?;
            for sample in &stale {
                self.delete_traffic_sample(sample.id).await?;
            }
            Ok(stale.len())
        }
    }
}
