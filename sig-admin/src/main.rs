//! sig-admin - village data admin console
//!
//! Cookie-protected CRUD over `sig.db`, report review, bulk import and
//! coordinate sync. Runs next to the public viewer on its own port.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use sig_admin::services::{NominatimClient, OverpassClient, NOMINATIM_BASE_URL, OVERPASS_URL};
use sig_admin::{build_router, AppState};
use sig_common::auth::AdminCredentials;
use sig_common::config::{database_path, resolve_root_folder, ROOT_FOLDER_ENV};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for sig-admin
#[derive(Parser, Debug)]
#[command(name = "sig-admin")]
#[command(about = "Admin console for SIG Ngabul")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5781", env = "SIG_ADMIN_PORT")]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: std::net::IpAddr,

    /// Root folder holding sig.db
    #[arg(short, long)]
    root_folder: Option<String>,

    /// Nominatim instance used for coordinate sync
    #[arg(long, default_value = NOMINATIM_BASE_URL, env = "SIG_NOMINATIM_URL")]
    nominatim_url: String,

    /// Overpass interpreter endpoint used for place import
    #[arg(long, default_value = OVERPASS_URL, env = "SIG_OVERPASS_URL")]
    overpass_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sig_admin=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting SIG admin console v{}", env!("CARGO_PKG_VERSION"));

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV);
    let db_path = database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let pool = sig_common::db::init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let credentials = AdminCredentials::from_env();
    info!("Admin user: {}", credentials.username);

    let nominatim =
        NominatimClient::new(args.nominatim_url).context("Failed to build Nominatim client")?;
    let overpass =
        OverpassClient::new(args.overpass_url).context("Failed to build Overpass client")?;

    let state = AppState::new(pool, credentials, nominatim, overpass);
    let app = build_router(state);

    let addr = SocketAddr::new(args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Console: http://{}/admin", addr);

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
