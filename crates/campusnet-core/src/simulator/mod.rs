// ── Telemetry simulator ──
//
// Two independent periodic tasks drive the store: a traffic tick every
// 5 seconds and an alert tick every 60 seconds. Each tick is bounded by a
// timeout, failures are logged and counted, and neither task ever stops
// the other.

mod alert;
mod entropy;
mod traffic;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::model::{Alert, TrafficSample};
use crate::store::TelemetryStore;

pub use alert::{
    ALERT_PHRASES, ALERT_THRESHOLD, ALERT_ZONES, HIGH_SEVERITY_THRESHOLD, alert_tick,
};
pub use entropy::{Entropy, RngEntropy, ScriptedEntropy};
pub use traffic::{
    BANDWIDTH_JITTER, CLIENT_DELTA, IDLE_BANDWIDTH_MBPS, MAX_CLIENTS, MBPS_PER_USER,
    TRAFFIC_RETENTION, TrafficOutcome, bandwidth_for, next_client_count, traffic_tick,
};

pub const TRAFFIC_PERIOD: Duration = Duration::from_secs(5);
pub const ALERT_PERIOD: Duration = Duration::from_secs(60);
/// A traffic tick still running after this is abandoned and counted as a
/// failure, well before the next one is due.
pub const TRAFFIC_TICK_TIMEOUT: Duration = Duration::from_secs(4);
pub const ALERT_TICK_TIMEOUT: Duration = Duration::from_secs(30);

/// Running totals published after every tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulatorStatus {
    pub traffic_ticks: u64,
    pub traffic_failures: u64,
    pub alert_ticks: u64,
    pub alert_failures: u64,
    pub alerts_raised: u64,
    pub last_sample: Option<TrafficSample>,
    pub last_alert: Option<Alert>,
}

/// Handle to the running traffic and alert tasks.
///
/// Dropping the handle cancels both tasks without waiting for them;
/// [`stop`](Self::stop) waits for any in-flight tick to finish.
pub struct Simulator {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
    status: watch::Receiver<SimulatorStatus>,
}

impl Simulator {
    /// Start both tasks with OS-seeded randomness. Must be called inside a
    /// Tokio runtime.
    pub fn start<S: TelemetryStore>(store: Arc<S>) -> Self {
        Self::start_with_entropy(store, RngEntropy::from_os(), RngEntropy::from_os())
    }

    /// Start both tasks with reproducible randomness derived from `seed`.
    pub fn start_seeded<S: TelemetryStore>(store: Arc<S>, seed: u64) -> Self {
        Self::start_with_entropy(
            store,
            RngEntropy::seeded(seed),
            RngEntropy::seeded(seed.wrapping_add(1)),
        )
    }

    pub fn start_with_entropy<S, T, A>(store: Arc<S>, traffic_entropy: T, alert_entropy: A) -> Self
    where
        S: TelemetryStore,
        T: Entropy,
        A: Entropy,
    {
        let cancel = CancellationToken::new();
        let (status_tx, status) = watch::channel(SimulatorStatus::default());
        let status_tx = Arc::new(status_tx);

        let handles = vec![
            tokio::spawn(traffic_task(
                Arc::clone(&store),
                traffic_entropy,
                Arc::clone(&status_tx),
                cancel.clone(),
            )),
            tokio::spawn(alert_task(store, alert_entropy, status_tx, cancel.clone())),
        ];

        info!(
            traffic_period_secs = TRAFFIC_PERIOD.as_secs(),
            alert_period_secs = ALERT_PERIOD.as_secs(),
            "simulator started"
        );
        Self {
            cancel,
            handles,
            status,
        }
    }

    /// Latest published totals.
    pub fn status(&self) -> SimulatorStatus {
        self.status.borrow().clone()
    }

    /// Receiver that wakes after every completed tick.
    pub fn subscribe(&self) -> watch::Receiver<SimulatorStatus> {
        self.status.clone()
    }

    /// Cancel both tasks, wait for them to wind down, and return the final
    /// totals. No tick starts after this returns.
    pub async fn stop(mut self) -> SimulatorStatus {
        self.cancel.cancel();
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "simulator task ended abnormally");
            }
        }
        let status = self.status();
        info!(
            traffic_ticks = status.traffic_ticks,
            alert_ticks = status.alert_ticks,
            alerts_raised = status.alerts_raised,
            "simulator stopped"
        );
        status
    }
}

impl Drop for Simulator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ── Background tasks ─────────────────────────────────────────────

fn periodic(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn bounded<T>(
    limit: Duration,
    tick: impl Future<Output = Result<T, CoreError>>,
) -> Result<T, CoreError> {
    tokio::time::timeout(limit, tick)
        .await
        .unwrap_or(Err(CoreError::Timeout {
            timeout_secs: limit.as_secs(),
        }))
}

async fn traffic_task<S: TelemetryStore, E: Entropy>(
    store: Arc<S>,
    mut entropy: E,
    status: Arc<watch::Sender<SimulatorStatus>>,
    cancel: CancellationToken,
) {
    let mut interval = periodic(TRAFFIC_PERIOD);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let result = bounded(TRAFFIC_TICK_TIMEOUT, traffic_tick(store.as_ref(), &mut entropy)).await;
                status.send_modify(|s| {
                    s.traffic_ticks += 1;
                    match result {
                        Ok(TrafficOutcome::Recorded { sample, .. }) => s.last_sample = Some(sample),
                        Ok(TrafficOutcome::NoDevices) => {}
                        Err(ref e) => {
                            s.traffic_failures += 1;
                            warn!(error = %e, "traffic tick failed");
                        }
                    }
                });
            }
        }
    }
    debug!("traffic task stopped");
}

async fn alert_task<S: TelemetryStore, E: Entropy>(
    store: Arc<S>,
    mut entropy: E,
    status: Arc<watch::Sender<SimulatorStatus>>,
    cancel: CancellationToken,
) {
    let mut interval = periodic(ALERT_PERIOD);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let result = bounded(ALERT_TICK_TIMEOUT, alert_tick(store.as_ref(), &mut entropy)).await;
                status.send_modify(|s| {
                    s.alert_ticks += 1;
                    match result {
                        Ok(Some(alert)) => {
                            s.alerts_raised += 1;
                            s.last_alert = Some(alert);
                        }
                        Ok(None) => {}
                        Err(ref e) => {
                            s.alert_failures += 1;
                            warn!(error = %e, "alert tick failed");
                        }
                    }
                });
            }
        }
    }
    debug!("alert task stopped");
}
