//! KrakenDca - Main Entry Point
//!
//! Loads the configuration, runs every configured strategy once and exits.
//! Meant to be triggered by an external scheduler (cron, systemd timer).
//!
//! Exit codes: 0 when no strategy ended `error`/`rejected`, 1 otherwise,
//! 2 when the run could not start.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kraken_dca::config::load_config;
use kraken_dca::notify::format::stats_line;
use kraken_dca::{KrakenRestClient, NotificationDispatcher, RunOrchestrator, RunSummary};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml", env = "KRAKEN_DCA_CONFIG")]
    config: String,

    /// Log level (trace, debug, info, warn, error), overrides logging.level
    #[arg(long)]
    log_level: Option<String>,

    /// Simulate orders even if the configuration says otherwise
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(summary) if summary.has_failures() => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("DCA run could not start: {:#}", e);
            eprintln!("kraken_dca: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> Result<RunSummary> {
    let app_config = load_config(&args.config).context("failed to load configuration")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| app_config.logging.level.clone());
    init_logging(&level, &app_config.logging.file)?;
    info!("Configuration file: {}", args.config);

    let mut run_config = app_config
        .into_run_config()
        .context("invalid configuration")?;
    if args.dry_run {
        run_config.dry_run = true;
    }

    info!("Using Kraken API base URL: {}", run_config.base_url);
    info!(
        "Loaded {} strategies (dry_run={})",
        run_config.strategies.len(),
        run_config.dry_run
    );

    let exchange = KrakenRestClient::from_run_config(&run_config)?;
    let dispatcher = NotificationDispatcher::from_run_config(&run_config)?;
    let mut orchestrator = RunOrchestrator::new(exchange, dispatcher, run_config);

    let summary = orchestrator.run().await;
    info!("{}", stats_line(&summary.stats()));

    Ok(summary)
}

/// Console logging plus an optional append-only log file
fn init_logging(level: &str, file: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.to_lowercase()))
        .with_context(|| format!("invalid log level '{}'", level))?;

    let file_layer = if file.is_empty() {
        None
    } else {
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .with_context(|| format!("cannot open log file '{}'", file))?;
        Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(log_file)),
        )
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()?;

    info!("Logging initialized (level={}, file={})", level, file);
    Ok(())
}
