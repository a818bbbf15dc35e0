//! Storage boundary of the synchronization engine
//!
//! The relational store and the side asset table are consumed through
//! traits so the scheduler and asset manager receive explicitly injected
//! collaborators instead of an ambient client handle; tests substitute
//! counting or failing fakes behind the same seam.

use async_trait::async_trait;

use listing_core::db::{AssetKind, AssetRow, PropertyRow};
use listing_core::model::ColumnValue;
use listing_core::{Property, PropertyField, Result};

mod assets;
mod records;

pub use assets::SqliteAssetTable;
pub use records::SqliteRecordStore;

/// The properties table: select/insert/update/delete, with update
/// restricted to an explicit set of columns and returning the stored row
/// (including the store-assigned `updated_at`).
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(&self, id: &str) -> Result<Option<PropertyRow>>;

    /// Insert a full record; returns the stored row
    async fn insert(&self, property: &Property) -> Result<PropertyRow>;

    /// Update only the given columns; returns the stored row
    async fn update(
        &self,
        id: &str,
        patch: &[(PropertyField, ColumnValue)],
    ) -> Result<PropertyRow>;

    async fn delete(&self, id: &str) -> Result<()>;
}

/// The side asset table: one row per uploaded blob, keyed by
/// `(property_id, kind)`, listed newest-first.
#[async_trait]
pub trait AssetTable: Send + Sync {
    /// Insert a row; returns the stored row with its `created_at`
    async fn insert(&self, row: &AssetRow) -> Result<AssetRow>;

    async fn delete(&self, asset_id: &str) -> Result<()>;

    async fn list(&self, property_id: &str, kind: AssetKind) -> Result<Vec<AssetRow>>;

    /// Delete every row belonging to a property; returns the removed rows
    /// so callers can clean up the backing blobs.
    async fn delete_for_property(&self, property_id: &str) -> Result<Vec<AssetRow>>;
}
