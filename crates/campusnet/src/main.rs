mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::config::{LoggingSettings, Settings};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Config subcommands must work even when the file is broken.
    let lenient = matches!(cli.command, Command::Config(_) | Command::Completions(_));
    let loaded = config::load(&cli.global, !lenient);

    // Setup tracing based on verbosity and the logging section
    let logging = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    let guard = init_tracing(
        cli.global.verbose,
        &logging,
        matches!(cli.command, Command::Simulate(_)),
    );

    // Dispatch and handle errors with proper exit codes
    let result = match loaded {
        Ok(cfg) => run(cli, cfg).await,
        Err(err) => Err(err),
    };
    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        drop(guard);
        std::process::exit(code);
    }
}

/// Stderr logging filtered by `-v` (or `RUST_LOG`), plus an optional
/// daily-rotated JSON file for long simulator runs.
fn init_tracing(verbosity: u8, logging: &LoggingSettings, to_file: bool) -> Option<WorkerGuard> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let stderr_layer = if logging.format == "json" {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let (file_layer, guard) = match logging.file_dir.as_ref().filter(|_| to_file) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "campusnet.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
    guard
}

async fn run(cli: Cli, cfg: config::Config) -> Result<(), CliError> {
    match cli.command {
        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "campusnet", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let settings = Settings::resolve(&cli.global, cfg)?;
            tracing::debug!(command = ?cmd, state = %settings.state_path.display(), "dispatching command");
            commands::dispatch(cmd, &settings).await
        }
    }
}
