//! Device registry command handlers.

use tabled::Tabled;

use campusnet_core::{Device, DeviceStatus, MacAddress, NewDevice};

use crate::cli::{DeviceAddArgs, DeviceStatusArg, DevicesArgs, DevicesCommand};
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

use super::{TIME_FORMAT, open_store, persist};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device ID")]
    device_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Clients")]
    clients: u32,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl DeviceRow {
    fn new(d: &Device, color: bool) -> Self {
        Self {
            device_id: d.device_id.clone(),
            name: d.name.clone(),
            zone: d.zone.clone(),
            mac: d.mac_address.to_string(),
            status: output::paint_status(d.status, color),
            clients: d.clients,
            updated: d.updated_at.format(TIME_FORMAT).to_string(),
        }
    }
}

fn detail(d: &Device, color: bool) -> String {
    [
        format!("ID:        {}", d.id),
        format!("Device ID: {}", d.device_id),
        format!("Name:      {}", d.name),
        format!("Zone:      {}", d.zone),
        format!("MAC:       {}", d.mac_address),
        format!("Status:    {}", output::paint_status(d.status, color)),
        format!("Clients:   {}", d.clients),
        format!("Created:   {}", d.created_at.format(TIME_FORMAT)),
        format!("Updated:   {}", d.updated_at.format(TIME_FORMAT)),
    ]
    .join("\n")
}

impl From<DeviceStatusArg> for DeviceStatus {
    fn from(arg: DeviceStatusArg) -> Self {
        match arg {
            DeviceStatusArg::Online => Self::Online,
            DeviceStatusArg::Offline => Self::Offline,
            DeviceStatusArg::Maintenance => Self::Maintenance,
        }
    }
}

impl From<DeviceAddArgs> for NewDevice {
    fn from(args: DeviceAddArgs) -> Self {
        Self {
            device_id: args.device_id,
            name: args.name,
            zone: args.zone,
            mac_address: MacAddress::new(args.mac),
            status: args.status.into(),
            clients: args.clients,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DevicesArgs, settings: &Settings) -> Result<(), CliError> {
    let store = open_store(settings).await?;
    let color = settings.color;

    match args.command {
        DevicesCommand::List => {
            let devices = store.devices();
            let out = output::render_list(
                settings.output,
                &devices,
                |d| DeviceRow::new(d, color),
                |d| d.device_id.clone(),
            )?;
            output::print_output(&out, settings.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let found = store.device(&device).ok_or_else(|| CliError::NotFound {
                resource_type: "device".into(),
                identifier: device.clone(),
                list_command: "devices list".into(),
            })?;
            let out = output::render_single(
                settings.output,
                &found,
                |d| detail(d, color),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, settings.quiet);
            Ok(())
        }

        DevicesCommand::Add(add) => {
            let device = store.add_device(add.into())?;
            persist(&store, settings).await?;
            let out = output::render_single(
                settings.output,
                &device,
                |d| detail(d, color),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, settings.quiet);
            Ok(())
        }

        DevicesCommand::Remove { device } => {
            let removed = store.remove_device(&device)?;
            persist(&store, settings).await?;
            if !settings.quiet {
                eprintln!("Device {} removed", removed.device_id);
            }
            Ok(())
        }
    }
}
