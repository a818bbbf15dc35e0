//! listing-sync - Property Record Synchronization Engine
//!
//! Back-office service behind the multi-step listing editor: canonical
//! normalization of persisted records, field-level differential autosave,
//! dual-store asset consistency, and step navigation gating.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use listing_core::db::init_database;
use listing_sync::blob::FsBlobStorage;
use listing_sync::config::Config;
use listing_sync::store::{SqliteAssetTable, SqliteRecordStore};
use listing_sync::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "listing-sync", version, about = "Listing editor synchronization service")]
struct Args {
    /// Folder holding the database and uploaded assets
    #[arg(long)]
    root_folder: Option<String>,

    /// HTTP port to listen on
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting listing-sync v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = Config::resolve(args.root_folder.as_deref(), args.port)
        .context("Failed to resolve configuration")?;
    config
        .ensure_directories()
        .context("Failed to create root folder")?;

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let state = AppState::new(
        Arc::new(SqliteRecordStore::new(pool.clone())),
        Arc::new(SqliteAssetTable::new(pool)),
        Arc::new(FsBlobStorage::new(
            config.blob_root(),
            config.public_asset_base.clone(),
        )),
    );

    let app = build_router(state);
    let addr = format!("0.0.0.0:{}", config.port);
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
