//! Function host with key-based authorization.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!   ──────────────▶ request id ─▶ trace ─▶ route match
//!                                             │
//!                                             ▼
//!                                   authorization layer
//!                         (route's RouteRequirement, fixed at startup)
//!                                             │
//!                  bypass / anonymous ◀───────┤
//!                          │                  ▼
//!                          │     key extractor (header, then ?code=)
//!                          │                  │
//!                          │                  ▼
//!                          │     level resolver ──▶ SecretStore
//!                          │       master → system → host fn → function
//!                          │                  │
//!                          ▼                  ▼
//!                       handler ◀── allow │ deny ──▶ 401
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use function_keyauth::config::{load_config, HostConfig};
use function_keyauth::lifecycle::{signals, startup, Shutdown};
use function_keyauth::observability::{logging, metrics};
use function_keyauth::HttpServer;

#[derive(Parser)]
#[command(name = "function-keyauth")]
#[command(about = "Function host with tiered key authorization", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => HostConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);
    tracing::info!("function-keyauth v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        provider = ?config.secrets.provider,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = startup::build_secret_store(&config.secrets);
    let shutdown = Shutdown::new();
    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, store, shutdown.subscribe())?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
