//! Database initialization
//!
//! Creates the listing schema on first run and is safe to call on every
//! startup (CREATE TABLE IF NOT EXISTS throughout). Collection columns of
//! the properties table hold JSON-encoded text; `updated_at` is maintained
//! by the store itself so "last saved" always reflects a real remote write.

use crate::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows the editor UI to read while an autosave writes
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create the listing schema (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_properties_table(pool).await?;
    create_property_assets_table(pool).await?;
    Ok(())
}

async fn create_properties_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS properties (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            address TEXT NOT NULL DEFAULT '',
            price REAL,
            bedrooms INTEGER,
            bathrooms INTEGER,
            features TEXT,
            areas TEXT,
            floorplans TEXT,
            technical_items TEXT,
            nearby_places TEXT,
            nearby_cities TEXT,
            images TEXT,
            featured_image TEXT,
            featured_images TEXT,
            grid_images TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_property_assets_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS property_assets (
            id TEXT PRIMARY KEY,
            property_id TEXT NOT NULL,
            url TEXT NOT NULL,
            file_path TEXT,
            kind TEXT NOT NULL CHECK (kind IN ('image', 'floorplan')),
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            FOREIGN KEY (property_id) REFERENCES properties(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_property_assets_parent
         ON property_assets(property_id, kind)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
