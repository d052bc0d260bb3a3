//! Dip Alerter - Main Entry Point
//!
//! Watches one asset's price feed and fires a bounded sequence of buy-order
//! notifications on threshold drops, resuming from persisted state across
//! restarts.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dip_alerter::config::load_config;
use dip_alerter::monitor::{CycleOutcome, Monitor, Scheduler};
use dip_alerter::{
    AppConfig, BinanceRestClient, HttpEmailNotifier, JsonStateStore, StateStore, SystemClock,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Override the state file path from the configuration
    #[arg(long)]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the monitoring loop (default)
    Run,
    /// Fire one manual trigger through the normal pipeline and exit
    TriggerNow,
    /// Print the persisted trigger state and exit
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let mut config = load_config(Some(&args.config))?;
    if let Some(state_file) = args.state_file {
        config.settings.state_file = state_file;
    }

    info!("Starting dip-alerter");
    info!("Configuration file: {}", args.config);
    info!("State file: {}", config.settings.state_file.display());

    match args.command.unwrap_or(Command::Run) {
        Command::Status => print_status(&config),
        Command::TriggerNow => {
            let mut monitor = build_monitor(&config)?;
            match monitor.run_manual_trigger().await? {
                CycleOutcome::Fired(record) => {
                    println!(
                        "Trigger #{} fired ({}) at price {}",
                        record.sequence_number, record.classification, record.observed_price
                    );
                }
                CycleOutcome::NoFire(reason) => println!("Not fired: {}", reason),
                CycleOutcome::NotReady => println!("Not fired: no data to evaluate"),
            }
            Ok(())
        }
        Command::Run => {
            let monitor = build_monitor(&config)?;
            if monitor.is_complete() {
                info!("all triggers already completed, nothing to monitor");
                return Ok(());
            }
            let scheduler = Scheduler::new(monitor, &config.settings)?;
            scheduler.run().await?;
            Ok(())
        }
    }
}

fn build_monitor(config: &AppConfig) -> Result<Monitor> {
    let timeout = Duration::from_secs(config.settings.request_timeout_seconds);

    let price_source = Arc::new(BinanceRestClient::with_timeout(
        &config.binance.rest_url,
        &config.binance.symbol,
        timeout,
    )?);
    let notifier = Arc::new(HttpEmailNotifier::with_timeout(
        config.notify.clone(),
        config.allocations.clone(),
        config.strategy.max_triggers,
        timeout,
    )?);
    let clock = Arc::new(SystemClock);

    let monitor = Monitor::with_json_store(price_source, notifier, clock, config)?;
    Ok(monitor)
}

fn print_status(config: &AppConfig) -> Result<()> {
    let store = JsonStateStore::new(config.settings.state_file.clone());
    let state = store.load()?;
    let max = config.strategy.max_triggers;

    println!(
        "Triggers: {} of {} ({} remaining)",
        state.trigger_count,
        max,
        max.saturating_sub(state.trigger_count)
    );
    if let (Some(close), Some(date)) = (state.reference_close, state.reference_close_date) {
        println!("Reference close: {} ({})", close, date);
    }
    if let Some(date) = state.last_trigger_date {
        println!("Last trigger date: {}", date);
    }
    if !state.trigger_history.is_empty() {
        println!("History:");
        for record in &state.trigger_history {
            println!(
                "  #{:<3} {}  price {}  change {:.2}%  ({})",
                record.sequence_number,
                record.fired_date,
                record.observed_price,
                record.drop_percent,
                record.classification
            );
        }
    }
    Ok(())
}
