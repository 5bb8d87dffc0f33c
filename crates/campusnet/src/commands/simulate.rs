//! `campusnet simulate`: run the telemetry simulator against the state file.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::time::Interval;
use tracing::{debug, info, warn};

use campusnet_core::{EntityId, MemoryStore, Simulator, SimulatorStatus, StoreSnapshot, TelemetryStore};

use crate::cli::SimulateArgs;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::{TIME_FORMAT, open_store, persist};

/// Totals printed when the run ends.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunSummary {
    elapsed_secs: u64,
    traffic_ticks: u64,
    traffic_failures: u64,
    alert_ticks: u64,
    alert_failures: u64,
    alerts_raised: u64,
    samples_retained: usize,
    state_file: String,
}

fn detail(s: &RunSummary) -> String {
    [
        format!("Ran for:          {}", humantime::format_duration(Duration::from_secs(s.elapsed_secs))),
        format!("Traffic ticks:    {} ({} failed)", s.traffic_ticks, s.traffic_failures),
        format!("Alert ticks:      {} ({} failed)", s.alert_ticks, s.alert_failures),
        format!("Alerts raised:    {}", s.alerts_raised),
        format!("Samples retained: {}", s.samples_retained),
        format!("State file:       {}", s.state_file),
    ]
    .join("\n")
}

/// One progress line per tick that produced something.
fn report_progress(prev: &SimulatorStatus, next: &SimulatorStatus, color: bool) {
    if next.traffic_ticks > prev.traffic_ticks && next.last_sample != prev.last_sample {
        if let Some(sample) = &next.last_sample {
            eprintln!(
                "{}  traffic  {:>8.1} Mbps  {:>4} users",
                sample.timestamp.format(TIME_FORMAT),
                sample.total_bandwidth,
                sample.active_users
            );
        }
    }
    if next.alerts_raised > prev.alerts_raised {
        if let Some(alert) = &next.last_alert {
            eprintln!(
                "{}  alert    {:<6}  {}",
                alert.timestamp.format(TIME_FORMAT),
                output::paint_severity(alert.severity, color),
                alert.message
            );
        }
    }
}

async fn next_flush(flush: &mut Option<Interval>) {
    match flush {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn run_for(duration: Option<Duration>) {
    match duration {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

/// Fold in registry edits other `campusnet` invocations wrote to the
/// state file, then write the store back if anything changed.
async fn sync_state(
    store: &MemoryStore,
    settings: &Settings,
    known: &mut HashSet<EntityId>,
    last_saved: &mut u64,
) -> Result<(), CliError> {
    match StoreSnapshot::read(&settings.state_path).await {
        Ok(on_disk) => {
            let merge = store.merge_registry(&on_disk.devices, known);
            if !merge.is_empty() {
                info!(adopted = ?merge.adopted, dropped = ?merge.dropped, "picked up registry changes");
            }
        }
        // The flush below replaces an unreadable file with a good one.
        Err(e) => warn!(error = %e, "state file unreadable, overwriting"),
    }

    let revision = store.revision();
    if revision != *last_saved {
        persist(store, settings).await?;
        *last_saved = revision;
        debug!(revision, "state flushed");
    }
    *known = store.device_ids();
    Ok(())
}

pub async fn handle(args: SimulateArgs, settings: &Settings) -> Result<(), CliError> {
    let store = Arc::new(open_store(settings).await?);
    let devices = store.devices();
    if devices.is_empty() && !settings.quiet {
        eprintln!(
            "No devices registered; traffic ticks will record nothing.\n\
             Add one with: campusnet devices add --device-id AP-LIB-01 --name 'Library L1' \
             --zone Library --mac 00:1a:2b:3c:4d:5e --status online"
        );
    }
    info!(
        devices = devices.len(),
        online = devices.iter().filter(|d| d.status.is_online()).count(),
        state = %settings.state_path.display(),
        "starting simulation"
    );

    let started = Instant::now();
    let sim = match args.seed {
        Some(seed) => Simulator::start_seeded(Arc::clone(&store), seed),
        None => Simulator::start(Arc::clone(&store)),
    };
    let mut updates = sim.subscribe();
    let mut seen = SimulatorStatus::default();

    let flush_secs = settings.config.simulator.flush_interval_secs;
    let mut flush = (flush_secs > 0).then(|| tokio::time::interval(Duration::from_secs(flush_secs)));
    let mut last_saved = store.revision();
    let mut known = store.device_ids();

    let deadline = run_for(args.duration);
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(deadline, interrupt);

    let outcome = loop {
        tokio::select! {
            signal = &mut interrupt => {
                if let Err(e) = signal {
                    break Err(CliError::Io(e));
                }
                info!("interrupt received, stopping");
                break Ok(());
            }
            () = &mut deadline => {
                info!("run duration reached, stopping");
                break Ok(());
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let next = updates.borrow_and_update().clone();
                if !settings.quiet {
                    report_progress(&seen, &next, settings.color);
                }
                seen = next;
            }
            () = next_flush(&mut flush) => {
                if let Err(e) = sync_state(&store, settings, &mut known, &mut last_saved).await {
                    break Err(e);
                }
            }
        }
    };

    let status = sim.stop().await;
    sync_state(&store, settings, &mut known, &mut last_saved).await?;
    outcome?;

    let summary = RunSummary {
        elapsed_secs: started.elapsed().as_secs(),
        traffic_ticks: status.traffic_ticks,
        traffic_failures: status.traffic_failures,
        alert_ticks: status.alert_ticks,
        alert_failures: status.alert_failures,
        alerts_raised: status.alerts_raised,
        samples_retained: store.count_traffic_samples().await?,
        state_file: settings.state_path.display().to_string(),
    };
    let out = output::render_single(settings.output, &summary, detail, |s| {
        s.traffic_ticks.to_string()
    })?;
    output::print_output(&out, settings.quiet);
    Ok(())
}
