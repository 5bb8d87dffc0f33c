// ── Traffic tick ──
//
// Random-walks each online device's client count, turns the total into an
// aggregate bandwidth figure, appends one ledger sample, and trims the
// ledger back to the retention window.

use tracing::{debug, trace};

use super::entropy::Entropy;
use crate::error::CoreError;
use crate::model::TrafficSample;
use crate::store::TelemetryStore;

/// Closed range of the per-tick client count change.
pub const CLIENT_DELTA: (i32, i32) = (-2, 3);
/// Upper clamp on a single device's client count.
pub const MAX_CLIENTS: u32 = 150;
/// Bandwidth attributed to each active user, in Mbps.
pub const MBPS_PER_USER: f64 = 3.5;
/// Baseline bandwidth when nobody is connected, in Mbps.
pub const IDLE_BANDWIDTH_MBPS: f64 = 5.0;
/// Closed range of the bandwidth jitter added each tick, in Mbps.
pub const BANDWIDTH_JITTER: (i32, i32) = (-5, 10);
/// Samples kept in the ledger after every tick.
pub const TRAFFIC_RETENTION: usize = 50;

/// What one traffic tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TrafficOutcome {
    /// The registry was empty; nothing was written.
    NoDevices,
    Recorded {
        sample: TrafficSample,
        online_devices: usize,
        pruned: usize,
    },
}

/// Apply `delta` to a client count and clamp into `[0, MAX_CLIENTS]`.
pub fn next_client_count(current: u32, delta: i32) -> u32 {
    let next = (i64::from(current) + i64::from(delta)).clamp(0, i64::from(MAX_CLIENTS));
    u32::try_from(next).unwrap_or(MAX_CLIENTS)
}

/// Aggregate bandwidth for `active_users`, floored at zero. There is no
/// upper bound.
pub fn bandwidth_for(active_users: u32, jitter: i32) -> f64 {
    let base = if active_users > 0 {
        f64::from(active_users) * MBPS_PER_USER
    } else {
        IDLE_BANDWIDTH_MBPS
    };
    (base + f64::from(jitter)).max(0.0)
}

/// Run one traffic tick against `store`.
///
/// Device updates are written one at a time in registry order and all of
/// them land before the sample is inserted. The first storage error aborts
/// the tick; whatever was already written stays written.
pub async fn traffic_tick<S, E>(store: &S, entropy: &mut E) -> Result<TrafficOutcome, CoreError>
where
    S: TelemetryStore,
    E: Entropy,
{
    let devices = store.list_devices().await?;
    if devices.is_empty() {
        trace!("traffic tick: no devices registered");
        return Ok(TrafficOutcome::NoDevices);
    }

    let mut active_users: u32 = 0;
    let mut online_devices = 0;
    for device in devices.iter().filter(|d| d.status.is_online()) {
        let delta = entropy.int_in(CLIENT_DELTA.0, CLIENT_DELTA.1);
        let clients = next_client_count(device.clients, delta);
        store.update_device_clients(device.id, clients).await?;
        trace!(device_id = %device.device_id, from = device.clients, to = clients, "clients walked");
        active_users = active_users.saturating_add(clients);
        online_devices += 1;
    }

    let jitter = entropy.int_in(BANDWIDTH_JITTER.0, BANDWIDTH_JITTER.1);
    let bandwidth = bandwidth_for(active_users, jitter);
    let sample = store.insert_traffic_sample(bandwidth, active_users).await?;
    let pruned = store.prune_traffic_samples(TRAFFIC_RETENTION).await?;

    debug!(
        online_devices,
        active_users,
        bandwidth_mbps = bandwidth,
        pruned,
        "traffic sample recorded"
    );
    Ok(TrafficOutcome::Recorded {
        sample,
        online_devices,
        pruned,
    })
}
