//! Flight API Server
//!
//! Drone-flight takeoff locations for a public-safety map.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use flight_api::app;
use flight_api::config::{credential_from_env, ServiceConfig};
use flight_api::state::AppState;

/// Flight API Server
#[derive(Parser, Debug)]
#[command(name = "flight-api")]
#[command(about = "Drone flight takeoff query and clustering server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "FLIGHT_API_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Path to the YAML config file
    #[arg(short, long, default_value = "config/flight-api.yaml", env = "FLIGHT_API_CONFIG")]
    config: PathBuf,

    /// Number of worker threads
    #[arg(long, env = "FLIGHT_API_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting flight API server");

    let credential = match credential_from_env() {
        Ok(credential) => credential,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let mut config = ServiceConfig::load(&args.config)?;
    config.apply_env_overrides()?;
    info!(
        base_url = %config.upstream.base_url,
        query_timeout_secs = config.upstream.query_timeout_secs,
        radius_px = config.clustering.radius_px,
        "Service configuration"
    );

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let state = Arc::new(AppState::from_config(config, credential)?.with_prometheus(prometheus));

    let app = app::router(state);

    // Parse listen address
    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("Flight API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
