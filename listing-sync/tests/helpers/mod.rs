//! Shared test fixtures: in-memory database, counting and failing store
//! fakes, and a blob store that tracks upload/remove counts.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;

use listing_core::db::{create_schema, AssetKind, AssetRow, PropertyRow};
use listing_core::model::ColumnValue;
use listing_core::{Error, Property, PropertyField, Result};
use listing_sync::blob::{BlobStorage, FsBlobStorage};
use listing_sync::session::EditorSession;
use listing_sync::store::{AssetTable, RecordStore, SqliteAssetTable, SqliteRecordStore};

/// One connection only: every connection to `sqlite::memory:` is a
/// separate database, so the pool must never open a second one.
pub async fn mem_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");
    create_schema(&pool).await.expect("Should create schema");
    pool
}

/// Record store that counts remote calls, for write-avoidance assertions
pub struct CountingStore {
    inner: SqliteRecordStore,
    pub selects: AtomicUsize,
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
}

impl CountingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            inner: SqliteRecordStore::new(pool),
            selects: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn select(&self, id: &str) -> Result<Option<PropertyRow>> {
        self.selects.fetch_add(1, Ordering::SeqCst);
        self.inner.select(id).await
    }

    async fn insert(&self, property: &Property) -> Result<PropertyRow> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(property).await
    }

    async fn update(
        &self,
        id: &str,
        patch: &[(PropertyField, ColumnValue)],
    ) -> Result<PropertyRow> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await
    }
}

/// Record store whose updates always fail, for failure-path assertions
pub struct FailingStore {
    inner: SqliteRecordStore,
}

impl FailingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            inner: SqliteRecordStore::new(pool),
        }
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn select(&self, id: &str) -> Result<Option<PropertyRow>> {
        self.inner.select(id).await
    }

    async fn insert(&self, property: &Property) -> Result<PropertyRow> {
        self.inner.insert(property).await
    }

    async fn update(
        &self,
        _id: &str,
        _patch: &[(PropertyField, ColumnValue)],
    ) -> Result<PropertyRow> {
        Err(Error::Internal("injected update failure".to_string()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await
    }
}

/// Asset table whose inserts always fail (orphaned-blob path)
pub struct FailingAssetTable {
    inner: SqliteAssetTable,
}

impl FailingAssetTable {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            inner: SqliteAssetTable::new(pool),
        }
    }
}

#[async_trait]
impl AssetTable for FailingAssetTable {
    async fn insert(&self, _row: &AssetRow) -> Result<AssetRow> {
        Err(Error::Internal("injected asset insert failure".to_string()))
    }

    async fn delete(&self, asset_id: &str) -> Result<()> {
        self.inner.delete(asset_id).await
    }

    async fn list(&self, property_id: &str, kind: AssetKind) -> Result<Vec<AssetRow>> {
        self.inner.list(property_id, kind).await
    }

    async fn delete_for_property(&self, property_id: &str) -> Result<Vec<AssetRow>> {
        self.inner.delete_for_property(property_id).await
    }
}

/// Blob store that counts uploads and removals
pub struct CountingBlobs {
    inner: FsBlobStorage,
    pub uploads: AtomicUsize,
    pub removes: AtomicUsize,
}

impl CountingBlobs {
    pub fn new(root: std::path::PathBuf) -> Self {
        Self {
            inner: FsBlobStorage::new(root, "https://cdn.test/assets"),
            uploads: AtomicUsize::new(0),
            removes: AtomicUsize::new(0),
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn remove_count(&self) -> usize {
        self.removes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStorage for CountingBlobs {
    async fn upload(&self, path: &str, bytes: &[u8]) -> Result<String> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        self.inner.upload(path, bytes).await
    }

    fn public_url(&self, path: &str) -> String {
        self.inner.public_url(path)
    }

    async fn remove(&self, paths: &[String]) -> Result<()> {
        self.removes.fetch_add(paths.len(), Ordering::SeqCst);
        self.inner.remove(paths).await
    }
}

/// Everything a session test needs, with counters exposed
pub struct TestEnv {
    pub pool: SqlitePool,
    pub records: Arc<CountingStore>,
    pub assets: Arc<SqliteAssetTable>,
    pub blobs: Arc<CountingBlobs>,
    blob_dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> TestEnv {
        let pool = mem_pool().await;
        let blob_dir = TempDir::new().expect("Should create temp blob dir");
        TestEnv {
            records: Arc::new(CountingStore::new(pool.clone())),
            assets: Arc::new(SqliteAssetTable::new(pool.clone())),
            blobs: Arc::new(CountingBlobs::new(blob_dir.path().to_path_buf())),
            pool,
            blob_dir,
        }
    }

    /// Insert a row directly, without touching the counting store
    pub async fn seed(&self, property: &Property) -> PropertyRow {
        SqliteRecordStore::new(self.pool.clone())
            .insert(property)
            .await
            .expect("Should seed property")
    }

    pub async fn open(&self, property_id: &str) -> EditorSession {
        EditorSession::open(
            self.records.clone(),
            self.assets.clone(),
            self.blobs.clone(),
            property_id,
            0,
        )
        .await
        .expect("Should open session")
    }

    pub fn new_unsaved(&self) -> EditorSession {
        EditorSession::new_unsaved(
            self.records.clone(),
            self.assets.clone(),
            self.blobs.clone(),
        )
    }

    /// Fetch the stored row for direct column assertions
    pub async fn row(&self, property_id: &str) -> PropertyRow {
        self.records
            .select(property_id)
            .await
            .expect("Should select row")
            .expect("Row should exist")
    }
}

pub fn sample_property(id: &str, title: &str) -> Property {
    Property {
        id: id.to_string(),
        title: title.to_string(),
        address: "1 Harbour View".to_string(),
        price: Some(425_000.0),
        bedrooms: Some(3),
        bathrooms: Some(2),
        ..Default::default()
    }
}
