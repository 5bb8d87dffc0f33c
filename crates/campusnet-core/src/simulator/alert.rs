// ── Alert tick ──

use tracing::{debug, info};

use super::entropy::Entropy;
use crate::error::CoreError;
use crate::model::{Alert, AlertSeverity, AlertStatus};
use crate::store::TelemetryStore;

/// Zones an alert can name.
pub const ALERT_ZONES: [&str; 3] = ["Library", "Hostel", "Academic"];
/// Fault descriptions an alert can carry.
pub const ALERT_PHRASES: [&str; 3] = ["High Latency", "Packet Loss", "Interference"];
/// A tick raises an alert only when its first draw exceeds this.
pub const ALERT_THRESHOLD: f64 = 0.7;
/// Severity draws above this are `high`; the rest are `medium`.
pub const HIGH_SEVERITY_THRESHOLD: f64 = 0.8;

/// Run one alert tick against `store`.
///
/// Draws, in order: the gate, the zone, the phrase, the severity. Returns
/// the stored alert, or `None` when the gate stayed shut.
pub async fn alert_tick<S, E>(store: &S, entropy: &mut E) -> Result<Option<Alert>, CoreError>
where
    S: TelemetryStore,
    E: Entropy,
{
    let gate = entropy.unit();
    if gate <= ALERT_THRESHOLD {
        debug!(gate, "alert tick: quiet");
        return Ok(None);
    }

    let zone = pick(&ALERT_ZONES, entropy);
    let phrase = pick(&ALERT_PHRASES, entropy);
    let severity = if entropy.unit() > HIGH_SEVERITY_THRESHOLD {
        AlertSeverity::High
    } else {
        AlertSeverity::Medium
    };

    let alert = store
        .insert_alert(
            format!("{phrase} detected in {zone}"),
            severity,
            Some(zone.to_owned()),
            AlertStatus::Active,
        )
        .await?;
    info!(zone, %severity, message = %alert.message, "alert raised");
    Ok(Some(alert))
}

fn pick<'a, E: Entropy>(options: &[&'a str], entropy: &mut E) -> &'a str {
    let last = i32::try_from(options.len().saturating_sub(1)).unwrap_or(i32::MAX);
    let index = usize::try_from(entropy.int_in(0, last)).unwrap_or(0);
    options
        .get(index)
        .or_else(|| options.first())
        .copied()
        .unwrap_or_default()
}
