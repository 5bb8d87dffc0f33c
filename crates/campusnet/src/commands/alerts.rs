//! Alert command handlers.

use tabled::Tabled;

use campusnet_core::Alert;

use crate::cli::{AlertsArgs, AlertsCommand};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::{TIME_FORMAT, open_store};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl AlertRow {
    fn new(a: &Alert, color: bool) -> Self {
        Self {
            time: a.timestamp.format(TIME_FORMAT).to_string(),
            severity: output::paint_severity(a.severity, color),
            zone: a.zone.clone().unwrap_or_else(|| "-".into()),
            message: a.message.clone(),
            status: a.status.to_string(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: AlertsArgs, settings: &Settings) -> Result<(), CliError> {
    let store = open_store(settings).await?;

    match args.command {
        AlertsCommand::List { limit } => {
            let alerts = store.alerts_newest_first(limit);
            let out = output::render_list(
                settings.output,
                &alerts,
                |a| AlertRow::new(a, settings.color),
                |a| a.id.to_string(),
            )?;
            output::print_output(&out, settings.quiet);
            Ok(())
        }
    }
}
