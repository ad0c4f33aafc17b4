//! DFOS monitoring dashboard server.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dashboard::{app, AppState, DashboardConfig};

#[derive(Parser, Debug)]
#[command(name = "dfos-dashboard")]
#[command(about = "DFOS tunnel monitoring dashboard")]
struct Args {
    /// Listen address
    #[arg(short, long, env = "DFOS_LISTEN", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Log level
    #[arg(long, env = "DFOS_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;
    info!("Prometheus metrics exporter initialized");

    bts_parser::silence_hdf5_errors();

    let config = DashboardConfig::from_env()?;
    info!(
        max_upload_bytes = config.max_upload_bytes,
        history_limit = config.history_limit,
        temp_dir = ?config.temp_dir,
        "Starting DFOS dashboard"
    );

    let state = Arc::new(AppState::new(config));
    let router = app(state, Some(prometheus_handle));

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
