//! Capybara content API.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────────┐
//!   Client Request    │  resolve client → catch panics → access log → cors       │
//!  ──────────────────▶│      → rate limit → count visit → routing → content      │
//!                     │                                        │                 │
//!   Client Response   │                                        ▼                 │
//!  ◀──────────────────│                                  JSON / image bytes      │
//!                     │                                                          │
//!                     │  ┌────────────────┐   PING every 10s   ┌─────────────┐   │
//!                     │  │ liveness       │ ──────────────────▶│   redis     │   │
//!                     │  │ monitor        │◀──── INCR visits ──│  (visits)   │   │
//!                     │  └────────────────┘                    └─────────────┘   │
//!                     └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Losing the store is fatal: the server drains for a bounded time and the
//! process exits non-zero so its supervisor restarts it.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use capybara_api::config::load_config;
use capybara_api::content::CapyLibrary;
use capybara_api::health::LivenessMonitor;
use capybara_api::http::HttpServer;
use capybara_api::lifecycle::{signals, startup, supervisor, Shutdown};
use capybara_api::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "capybara-api")]
#[command(about = "Capybara images and facts over HTTP")]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long, env = "CAPY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init(&config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "capybara-api starting");
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        trusted_ranges = ?config.proxy.trusted_ranges,
        probe_interval_secs = config.liveness.interval_secs,
        failure_threshold = config.liveness.failure_threshold,
        "Configuration loaded"
    );

    let store = startup::connect_store(&config.store).await?;
    let library = Arc::new(CapyLibrary::load(&config.content));
    let shutdown = Shutdown::new();

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(&config, store.clone(), library);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let monitor = LivenessMonitor::from_config(store, &config.liveness);
    let monitor_task = tokio::spawn(monitor.run(shutdown.subscribe()));

    let drain = Duration::from_secs(config.liveness.drain_timeout_secs);
    let outcome = supervisor::supervise(
        server_task,
        monitor_task,
        &shutdown,
        drain,
        signals::wait_for_signal(),
    )
    .await?;

    tracing::info!(reason = ?outcome.reason, drained = outcome.drained, "Shutdown complete");
    Ok(ExitCode::from(outcome.exit_code()))
}
