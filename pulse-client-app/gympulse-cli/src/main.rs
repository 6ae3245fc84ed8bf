//! `gympulse`: command-line client for the GymPulse session and
//! entitlement services.

mod commands;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use commands::Command;
use pulse_core::PulseContext;
use pulse_infrastructure::{
    build_client, FileSessionStore, HttpAuthBackend, HttpSubscriptionBackend, OfflineBackend,
};
use pulse_shared::config::AppConfig;
use pulse_shared::telemetry;

#[derive(Parser, Debug)]
#[command(name = "gympulse", version, about = "GymPulse session and plan entitlement client")]
struct Cli {
    /// Use built-in fixture accounts instead of the API
    #[arg(long, global = true)]
    mock: bool,

    /// Override the API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if cli.mock {
        config.api.mock = true;
    }
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if cli.verbose {
        config.telemetry.level = "debug".to_string();
    }

    let _log_guard = telemetry::init_telemetry(&config.telemetry)?;

    let context = build_context(&config)?;
    commands::run(&context, cli.command).await
}

fn build_context(config: &AppConfig) -> anyhow::Result<PulseContext> {
    let store = Arc::new(FileSessionStore::new(config.session.storage_path()));
    let freshness = config.subscription.freshness_window();

    if config.api.mock {
        info!("Using offline backend");
        let backend = Arc::new(OfflineBackend::demo());
        return Ok(PulseContext::new(backend.clone(), backend, store, freshness));
    }

    info!("Using API at {}", config.api.base_url);
    let client = build_client(config.api.timeout()).context("Failed to build HTTP client")?;
    Ok(PulseContext::new(
        Arc::new(HttpAuthBackend::new(client.clone(), &config.api.base_url)),
        Arc::new(HttpSubscriptionBackend::new(client, &config.api.base_url)),
        store,
        freshness,
    ))
}
