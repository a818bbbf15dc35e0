//! listing-sync library - Property Record Synchronization Engine
//!
//! Normalizes heterogeneously-shaped persisted listings into canonical
//! entities, tracks unsaved changes per field, performs differential
//! field-level autosave against the relational store, keeps the inline
//! gallery/floorplan columns consistent with the side asset table, and
//! gates multi-step navigation on save completion.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::blob::BlobStorage;
use crate::session::EditorSession;
use crate::store::{AssetTable, RecordStore};

pub mod api;
pub mod blob;
pub mod config;
pub mod session;
pub mod store;
pub mod sync;
pub mod wizard;

/// Application state shared across HTTP handlers
///
/// One editor session per open record; the map-level mutex serializes
/// operations, which is the single-editor-at-a-time assumption this
/// engine is built on.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub assets: Arc<dyn AssetTable>,
    pub blobs: Arc<dyn BlobStorage>,
    pub sessions: Arc<Mutex<HashMap<String, EditorSession>>>,
}

impl AppState {
    pub fn new(
        records: Arc<dyn RecordStore>,
        assets: Arc<dyn AssetTable>,
        blobs: Arc<dyn BlobStorage>,
    ) -> Self {
        Self {
            records,
            assets,
            blobs,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post, put};

    Router::new()
        .route("/api/properties", post(api::create_property))
        .route(
            "/api/properties/:id",
            get(api::open_property).delete(api::delete_property),
        )
        .route("/api/properties/:id/fields/:field", put(api::save_field))
        .route("/api/properties/:id/save", post(api::save_property))
        .route("/api/properties/:id/assets", post(api::upload_asset))
        .route(
            "/api/properties/:id/assets/:asset_id",
            delete(api::remove_asset),
        )
        .route("/api/properties/:id/steps/:action", post(api::navigate))
        .route("/api/properties/:id/status", get(api::property_status))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
