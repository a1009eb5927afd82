//! Weather orchestrator runner.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI flags ──┐
//!   URA_MODE ───┼──▶ mode resolution ──▶ ┌──────────────────────┐
//!               │                        │     Orchestrator      │
//!   settings ───┴──▶ ConfigStore ───────▶│  mode + backend swap │──▶ WeatherReport
//!     .json             ▲                 └──────────┬───────────┘
//!                       │ reload                     │
//!                  FileWatcher                 demo │ real
//!               (background thread)                 ▼
//!                                       mock JSON file / Open-Meteo
//! ```
//!
//! Fetches the weather once for `--location`, prints it, then keeps running
//! for `--hold-secs` so edits to the config file can be observed in the log.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::util::SubscriberInitExt;

use weather_orchestrator::{LoggingContext, Orchestrator, OrchestratorOptions, WeatherReport};

const DEFAULT_CONFIG_PATH: &str = "config/settings.json";

#[derive(Parser)]
#[command(name = "weather-orchestrator")]
#[command(about = "Fetch weather in demo or real mode with hot-reloaded configuration", long_about = None)]
struct Cli {
    /// Path to the settings file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Override the mode from the environment and the config file.
    #[arg(long, value_parser = ["demo", "real"])]
    mode: Option<String>,

    /// Location to query.
    #[arg(long, default_value = "Rajkot")]
    location: String,

    /// Seconds to keep running after the fetch so config edits can be observed.
    #[arg(long, default_value_t = 5)]
    hold_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (logging, subscriber) = LoggingContext::new();
    subscriber.init();

    tracing::info!("weather-orchestrator v{} starting", env!("CARGO_PKG_VERSION"));

    let options = OrchestratorOptions::new(&cli.config).with_cli_mode(cli.mode.clone());
    let orchestrator = match Orchestrator::start(options, Arc::new(logging)) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error during startup");
            return ExitCode::from(2);
        }
    };

    let code = run(&orchestrator, &cli).await;
    orchestrator.stop();
    tracing::info!("Shutdown complete");
    code
}

async fn run(orchestrator: &Orchestrator, cli: &Cli) -> ExitCode {
    tracing::info!(mode = %orchestrator.mode(), "Starting main loop");

    let report = match orchestrator.fetch_weather(&cli.location).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Fatal error fetching weather");
            return ExitCode::from(2);
        }
    };
    tracing::info!(?report, "Fetched weather");
    print_report(&report);

    tracing::info!(
        hold_secs = cli.hold_secs,
        "Keeping process alive to allow config hot-reload"
    );
    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(cli.hold_secs)) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    ExitCode::SUCCESS
}

fn print_report(report: &WeatherReport) {
    fn show<T: std::fmt::Display>(value: &Option<T>) -> String {
        value
            .as_ref()
            .map_or_else(|| "n/a".to_string(), ToString::to_string)
    }

    let rule = "-".repeat(41);
    let source = report.source.to_uppercase();

    println!("\n{rule}");
    println!("           WEATHER REPORT ({source} MODE)");
    println!("{rule}");
    println!("Location     : {}", report.location);
    println!("Timestamp    : {}\n", show(&report.timestamp));
    println!("Temperature  : {} °C", show(&report.temperature_c));
    println!("Humidity     : {} %", show(&report.humidity));
    println!("Wind Speed   : {} km/h", show(&report.wind_kmph));
    println!("Summary      : {}\n", show(&report.summary));
    println!("{rule}");
    println!("Source       : {source}");
    println!("{rule}\n");
}
