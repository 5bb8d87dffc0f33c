//! Traffic history command handlers.

use tabled::Tabled;

use campusnet_core::TrafficSample;

use crate::cli::{OutputFormat, TrafficArgs, TrafficCommand};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::{TIME_FORMAT, open_store};

#[derive(Tabled)]
struct TrafficRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Bandwidth (Mbps)")]
    bandwidth: String,
    #[tabled(rename = "Active Users")]
    active_users: u32,
}

impl From<&TrafficSample> for TrafficRow {
    fn from(s: &TrafficSample) -> Self {
        Self {
            time: s.timestamp.format(TIME_FORMAT).to_string(),
            bandwidth: format!("{:.1}", s.total_bandwidth),
            active_users: s.active_users,
        }
    }
}

pub async fn handle(args: TrafficArgs, settings: &Settings) -> Result<(), CliError> {
    let store = open_store(settings).await?;

    match args.command {
        TrafficCommand::History { limit } => {
            let samples = store.recent_traffic(limit).await;
            if samples.is_empty() && settings.output == OutputFormat::Table {
                if !settings.quiet {
                    eprintln!("No traffic recorded yet. Start one with: campusnet simulate");
                }
                return Ok(());
            }
            let out = output::render_list(
                settings.output,
                &samples,
                |s| TrafficRow::from(s),
                |s| {
                    format!(
                        "{}\t{:.1}\t{}",
                        s.timestamp.to_rfc3339(),
                        s.total_bandwidth,
                        s.active_users
                    )
                },
            )?;
            output::print_output(&out, settings.quiet);
            Ok(())
        }
    }
}
