//! sig-map - public village map viewer
//!
//! Serves the map page, the filtered location API and citizen report
//! submission. Shares `sig.db` with the admin console.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use sig_common::config::{database_path, maptiler_api_key, resolve_root_folder, ROOT_FOLDER_ENV};
use sig_map::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for sig-map
#[derive(Parser, Debug)]
#[command(name = "sig-map")]
#[command(about = "Public map viewer for SIG Ngabul")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5780", env = "SIG_MAP_PORT")]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: std::net::IpAddr,

    /// Root folder holding sig.db
    #[arg(short, long)]
    root_folder: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sig_map=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting SIG map viewer v{}", env!("CARGO_PKG_VERSION"));

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV);
    let db_path = database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let pool = sig_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let maptiler_key = maptiler_api_key();
    if sig_common::geo::usable_api_key(maptiler_key.as_deref()).is_none() {
        info!("No MapTiler key configured, viewer falls back to OpenStreetMap tiles");
    }

    let state = AppState::new(pool, maptiler_key.as_deref());
    let app = build_router(state);

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
