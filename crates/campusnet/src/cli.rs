//! Clap derive structures for the `campusnet` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// campusnet -- synthetic Wi-Fi telemetry for a campus network dashboard
#[derive(Debug, Parser)]
#[command(
    name = "campusnet",
    version,
    about = "Simulate and inspect campus Wi-Fi telemetry",
    long_about = "Drives a registry of campus access points with synthetic load.\n\n\
        Every 5 seconds each online device's client count takes a random step\n\
        and an aggregate bandwidth sample is recorded (the newest 50 are kept).\n\
        Every 60 seconds there is a 30% chance of a network alert.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file to use instead of the platform default
    #[arg(long, env = "CAMPUSNET_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Telemetry state file (overrides config)
    #[arg(long, env = "CAMPUSNET_STATE", global = true)]
    pub state: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "CAMPUSNET_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the telemetry simulator until interrupted
    #[command(alias = "sim")]
    Simulate(SimulateArgs),

    /// Manage the access point registry
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// View recorded traffic samples
    Traffic(TrafficArgs),

    /// View raised alerts
    Alerts(AlertsArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Simulate ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Stop after this long (e.g. "90s", "10m"); runs until Ctrl-C otherwise
    #[arg(long, short = 'd', value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Seed the random draws for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List registered devices
    #[command(alias = "ls")]
    List,

    /// Show one device
    Get {
        /// Record id or device id
        device: String,
    },

    /// Register a new device
    Add(DeviceAddArgs),

    /// Remove a device
    #[command(alias = "rm")]
    Remove {
        /// Record id or device id
        device: String,
    },
}

#[derive(Debug, Args)]
pub struct DeviceAddArgs {
    /// Operator-facing identifier, unique across the registry (e.g. AP-LIB-01)
    #[arg(long)]
    pub device_id: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Campus zone the device serves
    #[arg(long)]
    pub zone: String,

    /// Hardware address (aa:bb:cc:dd:ee:ff)
    #[arg(long)]
    pub mac: String,

    /// Initial operational status
    #[arg(long, default_value = "offline")]
    pub status: DeviceStatusArg,

    /// Initial connected client count
    #[arg(long, default_value = "0")]
    pub clients: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceStatusArg {
    Online,
    Offline,
    Maintenance,
}

// ── Traffic ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TrafficArgs {
    #[command(subcommand)]
    pub command: TrafficCommand,
}

#[derive(Debug, Subcommand)]
pub enum TrafficCommand {
    /// Most recent samples, oldest first
    History {
        /// Number of samples to show
        #[arg(long, short = 'l', default_value = "20")]
        limit: usize,
    },
}

// ── Alerts ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// Alerts, newest first
    #[command(alias = "ls")]
    List {
        /// Show at most this many
        #[arg(long, short = 'l')]
        limit: Option<usize>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file populated with defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
