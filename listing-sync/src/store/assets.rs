//! SQLite implementation of the side asset table

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use listing_core::db::{AssetKind, AssetRow};
use listing_core::{Error, Result};

use super::AssetTable;

pub struct SqliteAssetTable {
    pool: SqlitePool,
}

impl SqliteAssetTable {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetTable for SqliteAssetTable {
    async fn insert(&self, row: &AssetRow) -> Result<AssetRow> {
        sqlx::query(
            "INSERT INTO property_assets (id, property_id, url, file_path, kind)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&row.id)
        .bind(&row.property_id)
        .bind(&row.url)
        .bind(&row.file_path)
        .bind(row.kind.as_str())
        .execute(&self.pool)
        .await?;

        let stored = sqlx::query(
            "SELECT id, property_id, url, file_path, kind, created_at
             FROM property_assets WHERE id = ?",
        )
        .bind(&row.id)
        .fetch_one(&self.pool)
        .await?;

        debug!(asset_id = %row.id, property_id = %row.property_id, kind = row.kind.as_str(), "Inserted asset row");
        row_from(&stored)
    }

    async fn delete(&self, asset_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM property_assets WHERE id = ?")
            .bind(asset_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, property_id: &str, kind: AssetKind) -> Result<Vec<AssetRow>> {
        let rows = sqlx::query(
            "SELECT id, property_id, url, file_path, kind, created_at
             FROM property_assets
             WHERE property_id = ? AND kind = ?
             ORDER BY created_at DESC",
        )
        .bind(property_id)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_from).collect()
    }

    async fn delete_for_property(&self, property_id: &str) -> Result<Vec<AssetRow>> {
        let rows = sqlx::query(
            "SELECT id, property_id, url, file_path, kind, created_at
             FROM property_assets WHERE property_id = ?",
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await?;

        sqlx::query("DELETE FROM property_assets WHERE property_id = ?")
            .bind(property_id)
            .execute(&self.pool)
            .await?;

        rows.iter().map(row_from).collect()
    }
}

fn row_from(row: &SqliteRow) -> Result<AssetRow> {
    let kind: String = row.try_get("kind")?;
    Ok(AssetRow {
        id: row.try_get("id")?,
        property_id: row.try_get("property_id")?,
        url: row.try_get("url")?,
        file_path: row.try_get("file_path")?,
        kind: AssetKind::from_str(&kind)
            .ok_or_else(|| Error::Internal(format!("unknown asset kind: {kind}")))?,
        created_at: row.try_get("created_at")?,
    })
}
