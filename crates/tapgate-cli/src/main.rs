//! Tapgate host emulator
//!
//! Runs the full endpoint control loop on a workstation: the decision
//! service is reached over real HTTP, while the two tag readers and the
//! output lines are emulated. Tags and link changes are entered on stdin.

mod config;
mod console;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tapgate_endpoint::{FeedbackController, MainLoop};
use tapgate_hardware::mock::MockTagSensor;
use tapgate_network::{AlarmStatePoller, AuthorizationClient, HttpTransport, LinkStatus};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::console::{Console, ConsoleSignals};

/// Dual-reader tap endpoint emulator
#[derive(Parser, Debug)]
#[command(name = "tapgate", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/endpoint.toml")]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    // RUST_LOG takes precedence over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        version = tapgate_core::VERSION,
        config_file = %args.config.display(),
        config_found = args.config.exists(),
        base_url = %config.server.base_url,
        timeout_ms = config.server.timeout_ms,
        poll_interval_ms = config.alarm.poll_interval_ms,
        "config_loaded"
    );

    let link = LinkStatus::new(config.link.start_connected);
    let transport = HttpTransport::new(config.http_transport_config(), link.clone())
        .context("Failed to build HTTP client")?;

    let (entry_sensor, entry) = MockTagSensor::with_name("entry".to_string());
    let (exit_sensor, exit) = MockTagSensor::with_name("exit".to_string());

    let mut endpoint = MainLoop::new(
        AuthorizationClient::new(transport.clone()),
        AlarmStatePoller::new(transport, config.alarm_poller_config()?),
        FeedbackController::new(ConsoleSignals::new()),
        entry_sensor,
        exit_sensor,
        config.scheduler_config(),
    );

    tokio::spawn(Console::new(entry, exit, link).run());

    let session = async {
        if let Err(e) = endpoint.boot().await {
            warn!(error = %e, "Boot indication incomplete");
        }
        endpoint.run().await;
    };

    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = session => {}
        _ = interrupted => info!("Shutdown requested"),
    }

    endpoint
        .shutdown()
        .await
        .context("Failed to switch outputs off")?;
    Ok(())
}
