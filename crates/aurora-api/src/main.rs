//! Aurora start page server
//!
//! Loads the dashboard from the local store, starts the background cloud
//! sync and serves the JSON API used by the start page and its admin panel.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use aurora_common::{AppConfig, MAX_LOG_ENTRIES};
use aurora_core::{
    ActivityLog, AdminGate, AiService, CloudBackend, CloudSync, Dashboard, FileStore,
    HttpFaviconProbe, LocalStore, MemoryStore,
};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod api;

/// Command-line arguments for the Aurora server
#[derive(Parser, Debug)]
#[clap(name = "aurora-api", about = "Self-hosted start page backend")]
struct Args {
    /// Host to bind to
    #[clap(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[clap(short, long, default_value = "3000")]
    port: u16,

    /// Path to the data directory
    #[clap(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Keep everything in memory; nothing is written to disk
    #[clap(long)]
    ephemeral: bool,

    /// Log filter used when RUST_LOG is not set
    #[clap(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Aurora server...");
    let config = AppConfig::from_env(&args.data_dir);

    let store: Arc<dyn LocalStore> = if args.ephemeral {
        info!("Using in-memory storage");
        Arc::new(MemoryStore::new())
    } else {
        info!("Data directory: {:?}", config.data_dir);
        Arc::new(FileStore::new(&config.data_dir)?)
    };

    let log = ActivityLog::init(MAX_LOG_ENTRIES);
    let backend = CloudBackend::from_credentials(&config.kv);
    info!("Cloud backend: {}", backend.name());
    let cloud = CloudSync::from_backend(&backend, log.clone())?;
    let ai = AiService::new(config.secrets.clone(), log.clone())?;
    let favicon = HttpFaviconProbe::new()?;

    let dashboard = Arc::new(Dashboard::new(
        store,
        cloud,
        Arc::new(ai),
        Arc::new(favicon),
        log.clone(),
    ));
    dashboard.load_local().await;
    dashboard.spawn_cloud_sync();

    let gate = AdminGate::from_secrets(&config.secrets);
    if !gate.is_protected() {
        info!("ADMIN_PASSWORD not set; admin routes are open");
    }

    let state = api::AppState {
        dashboard,
        gate,
        log,
    };
    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", args.host, args.port);
    info!("Binding to address: {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
