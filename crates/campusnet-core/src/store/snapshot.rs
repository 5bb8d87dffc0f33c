// ── Snapshot persistence ──
//
// A MemoryStore round-trips through a single JSON document so the CLI can
// keep state between runs. Writes go to a sibling temp file first and are
// renamed into place, so readers never observe a half-written snapshot.
// A long-running writer can merge registry edits other processes made to
// the same file before it overwrites it.

use std::collections::{HashSet, VecDeque};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::memory::MemoryStore;
use crate::error::CoreError;
use crate::model::{Alert, Device, EntityId, TrafficSample};

/// Serializable image of every record in a [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub traffic: Vec<TrafficSample>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl MemoryStore {
    /// Rebuild a store from a snapshot. Duplicate `deviceId`s are rejected.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, CoreError> {
        let mut store = Self::new();

        for device in snapshot.devices {
            let key = device.device_id.clone();
            store
                .devices
                .insert(device.id, Some(key.clone()), device)
                .map_err(|_| CoreError::Conflict {
                    entity_type: "device".into(),
                    identifier: key,
                })?;
        }

        for alert in snapshot.alerts {
            let id = alert.id;
            store
                .alerts
                .insert(id, None, alert)
                .map_err(|_| CoreError::Conflict {
                    entity_type: "alert".into(),
                    identifier: id.to_string(),
                })?;
        }

        let mut traffic = snapshot.traffic;
        traffic.sort_by_key(|s| s.timestamp);
        store.traffic = tokio::sync::RwLock::new(VecDeque::from(traffic));

        Ok(store)
    }

    /// Capture every record. Devices come out in registration order and
    /// alerts newest first.
    pub async fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            devices: self.devices(),
            traffic: self.traffic.read().await.iter().cloned().collect(),
            alerts: self.alerts_newest_first(None),
        }
    }

    /// Load a store from `path`. A missing file yields an empty store.
    pub async fn load(path: &Path) -> Result<Self, CoreError> {
        Self::from_snapshot(StoreSnapshot::read(path).await?)
    }

    /// Write the current state to `path`, creating parent directories.
    pub async fn save(&self, path: &Path) -> Result<(), CoreError> {
        let snapshot = self.to_snapshot().await;
        let io_err = |source: std::io::Error| CoreError::SnapshotIo {
            path: path.display().to_string(),
            source,
        };

        let body = serde_json::to_string_pretty(&snapshot).map_err(|source| {
            CoreError::SnapshotFormat {
                path: path.display().to_string(),
                source,
            }
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
        debug!(path = %path.display(), "snapshot saved");
        Ok(())
    }

    /// Fold device registrations made by another writer into this store.
    ///
    /// `known` holds the record ids this store last wrote out. A device on
    /// disk that is neither here nor in `known` was added elsewhere and is
    /// adopted; one that is here and in `known` but gone from disk was
    /// removed elsewhere and is dropped. Client counts of devices present
    /// on both sides are left as they are in memory.
    pub fn merge_registry(&self, on_disk: &[Device], known: &HashSet<EntityId>) -> RegistryMerge {
        let mut merge = RegistryMerge::default();
        let disk_ids: HashSet<EntityId> = on_disk.iter().map(|d| d.id).collect();

        for device in on_disk {
            if known.contains(&device.id) || self.devices.get(&device.id).is_some() {
                continue;
            }
            let key = device.device_id.clone();
            match self.devices.insert(device.id, Some(key.clone()), device.clone()) {
                Ok(()) => merge.adopted.push(key),
                Err(_) => warn!(device_id = %key, "external device clashes with a registered deviceId, skipped"),
            }
        }

        for id in known.iter().filter(|id| !disk_ids.contains(*id)) {
            if let Some(removed) = self.devices.remove(id) {
                merge.dropped.push(removed.device_id.clone());
            }
        }

        if !merge.is_empty() {
            debug!(adopted = ?merge.adopted, dropped = ?merge.dropped, "registry merged");
        }
        merge
    }

    /// Record ids of every registered device.
    pub fn device_ids(&self) -> HashSet<EntityId> {
        self.devices.snapshot().iter().map(|d| d.id).collect()
    }
}

/// Outcome of [`MemoryStore::merge_registry`], as `deviceId`s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryMerge {
    pub adopted: Vec<String>,
    pub dropped: Vec<String>,
}

impl RegistryMerge {
    pub fn is_empty(&self) -> bool {
        self.adopted.is_empty() && self.dropped.is_empty()
    }
}

impl StoreSnapshot {
    /// Read the snapshot at `path`. A missing file yields an empty one.
    pub async fn read(path: &Path) -> Result<Self, CoreError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot yet, starting empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(CoreError::SnapshotIo {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let snapshot: Self = serde_json::from_str(&raw).map_err(|source| CoreError::SnapshotFormat {
            path: path.display().to_string(),
            source,
        })?;
        debug!(
            path = %path.display(),
            devices = snapshot.devices.len(),
            traffic = snapshot.traffic.len(),
            alerts = snapshot.alerts.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{AlertSeverity, AlertStatus, DeviceStatus, MacAddress, NewDevice};
    use crate::store::TelemetryStore;
    use pretty_assertions::assert_eq;

    fn seed_device(store: &MemoryStore, device_id: &str) -> Device {
        store
            .add_device(NewDevice {
                device_id: device_id.into(),
                name: "Hostel Block A".into(),
                zone: "Hostel".into(),
                mac_address: MacAddress::new("aa:bb:cc:00:11:22"),
                status: DeviceStatus::Online,
                clients: 12,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn save_then_load_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("campus.json");

        let store = MemoryStore::new();
        let device = seed_device(&store, "AP-HST-01");
        store.insert_traffic_sample(42.5, 12).await.unwrap();
        store
            .insert_alert(
                "Packet Loss detected in Hostel".into(),
                AlertSeverity::High,
                Some("Hostel".into()),
                AlertStatus::Active,
            )
            .await
            .unwrap();
        store.save(&path).await.unwrap();

        let loaded = MemoryStore::load(&path).await.unwrap();
        assert_eq!(loaded.devices(), vec![device]);
        assert_eq!(loaded.count_traffic_samples().await.unwrap(), 1);
        assert_eq!(loaded.alerts_newest_first(None).len(), 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load(&dir.path().join("absent.json")).await.unwrap();
        assert!(store.devices().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            MemoryStore::load(&path).await,
            Err(CoreError::SnapshotFormat { .. })
        ));
    }

    #[tokio::test]
    async fn duplicate_device_ids_in_snapshot_are_rejected() {
        let store = MemoryStore::new();
        let device = seed_device(&store, "AP-HST-01");
        let mut twin = device.clone();
        twin.id = crate::model::EntityId::new();

        let snapshot = StoreSnapshot {
            devices: vec![device, twin],
            ..StoreSnapshot::default()
        };
        assert!(matches!(
            MemoryStore::from_snapshot(snapshot),
            Err(CoreError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn out_of_order_traffic_is_sorted_on_load() {
        let now = chrono::Utc::now();
        let older = TrafficSample::new(1.0, 1, now - chrono::Duration::seconds(10));
        let newer = TrafficSample::new(2.0, 2, now);
        let snapshot = StoreSnapshot {
            traffic: vec![newer.clone(), older.clone()],
            ..StoreSnapshot::default()
        };

        let store = MemoryStore::from_snapshot(snapshot).unwrap();
        assert_eq!(store.list_oldest_traffic_samples(1).await.unwrap(), vec![older]);
    }

    // ── Registry merge ──

    #[tokio::test]
    async fn merge_adopts_devices_added_by_another_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campus.json");

        let running = MemoryStore::new();
        seed_device(&running, "AP-HST-01");
        running.save(&path).await.unwrap();
        let known = running.device_ids();

        // Another process loads the file, registers a device and saves.
        let admin = MemoryStore::load(&path).await.unwrap();
        seed_device(&admin, "AP-LIB-02");
        admin.save(&path).await.unwrap();

        let on_disk = StoreSnapshot::read(&path).await.unwrap();
        let merge = running.merge_registry(&on_disk.devices, &known);
        assert_eq!(merge.adopted, vec!["AP-LIB-02".to_string()]);
        assert!(merge.dropped.is_empty());

        let ids: Vec<String> = running.devices().into_iter().map(|d| d.device_id).collect();
        assert_eq!(ids, vec!["AP-HST-01".to_string(), "AP-LIB-02".to_string()]);
    }

    #[tokio::test]
    async fn merge_drops_devices_removed_by_another_writer() {
        let running = MemoryStore::new();
        let kept = seed_device(&running, "AP-HST-01");
        seed_device(&running, "AP-HST-02");
        let known = running.device_ids();

        let merge = running.merge_registry(&[kept.clone()], &known);
        assert_eq!(merge.dropped, vec!["AP-HST-02".to_string()]);
        assert_eq!(running.devices(), vec![kept]);
    }

    #[tokio::test]
    async fn merge_keeps_unsaved_devices_and_live_client_counts() {
        let running = MemoryStore::new();
        let stale = seed_device(&running, "AP-HST-01");
        let known = running.device_ids();
        running.update_device_clients(stale.id, 40).await.unwrap();
        // Registered after the last save, so absent from disk but kept.
        seed_device(&running, "AP-HST-02");

        let merge = running.merge_registry(&[stale.clone()], &known);
        assert!(merge.is_empty());
        let devices = running.devices();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].clients, 40);
    }

    #[tokio::test]
    async fn merge_skips_clashing_device_id() {
        let running = MemoryStore::new();
        seed_device(&running, "AP-HST-01");
        let known = running.device_ids();

        let mut clash = seed_device(&MemoryStore::new(), "AP-HST-01");
        clash.id = crate::model::EntityId::new();
        let current = running.devices();
        let on_disk = [current[0].clone(), clash];

        let merge = running.merge_registry(&on_disk, &known);
        assert!(merge.is_empty());
        assert_eq!(running.devices().len(), 1);
    }
}
