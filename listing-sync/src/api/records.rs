//! Property editor API
//!
//! Thin HTTP wrapper over [`EditorSession`]: the UI reads the current
//! record, dirty state, step index and last-saved marker, and calls
//! field-save, asset and navigation operations. Errors surface as status
//! codes with a message, never as panics; a failed save leaves the
//! session editable and its ledger intact.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use listing_core::{Error, Property, PropertyField};

use crate::session::EditorSession;
use crate::AppState;

/// Error payload for all editor endpoints
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Record plus the editor state the UI renders alongside it
#[derive(Debug, Serialize)]
pub struct PropertyResponse {
    pub property: Property,
    pub step: usize,
    pub dirty: bool,
    pub last_saved: Option<String>,
}

impl PropertyResponse {
    fn from_session(session: &EditorSession) -> Self {
        Self {
            property: session.current().clone(),
            step: session.step(),
            dirty: session.is_dirty(None),
            last_saved: session.last_saved().map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub saved: bool,
    pub dirty: bool,
    pub last_saved: Option<String>,
}

impl SaveResponse {
    fn from_session(saved: bool, session: &EditorSession) -> Self {
        Self {
            saved,
            dirty: session.is_dirty(None),
            last_saved: session.last_saved().map(str::to_string),
        }
    }
}

async fn get_or_open<'a>(
    state: &AppState,
    sessions: &'a mut HashMap<String, EditorSession>,
    property_id: &str,
    seed_step: usize,
) -> Result<&'a mut EditorSession, ApiError> {
    match sessions.entry(property_id.to_string()) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(entry) => {
            let session = EditorSession::open(
                state.records.clone(),
                state.assets.clone(),
                state.blobs.clone(),
                property_id,
                seed_step,
            )
            .await?;
            Ok(entry.insert(session))
        }
    }
}

/// POST /api/properties
pub async fn create_property(
    State(state): State<AppState>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let mut session = EditorSession::new_unsaved(
        state.records.clone(),
        state.assets.clone(),
        state.blobs.clone(),
    );
    session.persist().await?;

    let response = PropertyResponse::from_session(&session);
    let id = session.current().id.clone();
    state.sessions.lock().await.insert(id, session);
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct OpenQuery {
    /// Initial wizard step, e.g. derived from the URL slug
    #[serde(default)]
    pub step: usize,
}

/// GET /api/properties/:id
pub async fn open_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<OpenQuery>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let session = get_or_open(&state, &mut sessions, &id, query.step).await?;
    Ok(Json(PropertyResponse::from_session(session)))
}

/// PUT /api/properties/:id/fields/:field
///
/// Applies the value to the in-memory record and autosaves that field.
pub async fn save_field(
    State(state): State<AppState>,
    Path((id, field_name)): Path<(String, String)>,
    Json(value): Json<Value>,
) -> Result<Json<SaveResponse>, ApiError> {
    let field = PropertyField::from_name(&field_name)
        .ok_or_else(|| Error::InvalidInput(format!("unknown field: {field_name}")))?;

    let mut sessions = state.sessions.lock().await;
    let session = get_or_open(&state, &mut sessions, &id, 0).await?;
    session.apply_field(field, &value);
    let saved = session.save_field(field).await?;
    Ok(Json(SaveResponse::from_session(saved, session)))
}

/// POST /api/properties/:id/save
pub async fn save_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SaveResponse>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let session = get_or_open(&state, &mut sessions, &id, 0).await?;
    let saved = session.save().await?;
    Ok(Json(SaveResponse::from_session(saved, session)))
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub kind: String,
    pub file_name: String,
    /// Present when uploading into an Area's own image pool
    pub area_id: Option<String>,
}

/// POST /api/properties/:id/assets (raw bytes body)
pub async fn upload_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<PropertyResponse>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let session = get_or_open(&state, &mut sessions, &id, 0).await?;

    match (&query.area_id, query.kind.as_str()) {
        (Some(area_id), "image") => {
            session
                .upload_area_image(area_id, &query.file_name, &body)
                .await?;
        }
        (None, "image") => {
            session.upload_image(&query.file_name, &body).await?;
        }
        (None, "floorplan") => {
            session.upload_floorplan(&query.file_name, &body).await?;
        }
        _ => {
            return Err(Error::InvalidInput(format!("unknown asset kind: {}", query.kind)).into())
        }
    }
    Ok(Json(PropertyResponse::from_session(session)))
}

#[derive(Debug, Deserialize)]
pub struct RemoveQuery {
    pub kind: String,
    pub area_id: Option<String>,
}

/// DELETE /api/properties/:id/assets/:asset_id
pub async fn remove_asset(
    State(state): State<AppState>,
    Path((id, asset_id)): Path<(String, String)>,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let session = get_or_open(&state, &mut sessions, &id, 0).await?;

    match (&query.area_id, query.kind.as_str()) {
        (Some(area_id), "image") => session.remove_area_image(area_id, &asset_id).await?,
        (None, "image") => session.remove_image(&asset_id).await?,
        (None, "floorplan") => session.remove_floorplan(&asset_id).await?,
        _ => {
            return Err(Error::InvalidInput(format!("unknown asset kind: {}", query.kind)).into())
        }
    }
    Ok(Json(PropertyResponse::from_session(session)))
}

/// POST /api/properties/:id/steps/:action
///
/// `action` is `next`, `previous`, or a step index. Navigation saves the
/// current step's dirty fields first and stays put when that save fails.
pub async fn navigate(
    State(state): State<AppState>,
    Path((id, action)): Path<(String, String)>,
) -> Result<Json<PropertyResponse>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let session = get_or_open(&state, &mut sessions, &id, 0).await?;

    match action.as_str() {
        "next" => session.handle_next().await?,
        "previous" => session.handle_previous().await?,
        step => {
            let step: usize = step
                .parse()
                .map_err(|_| Error::InvalidInput(format!("unknown step action: {step}")))?;
            session.handle_step_click(step).await?
        }
    };
    Ok(Json(PropertyResponse::from_session(session)))
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub step: usize,
    pub dirty: bool,
    pub saving: bool,
    pub last_saved: Option<String>,
}

/// GET /api/properties/:id/status
pub async fn property_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let session = get_or_open(&state, &mut sessions, &id, 0).await?;
    Ok(Json(StatusResponse {
        step: session.step(),
        dirty: session.is_dirty(None),
        saving: session.is_saving(),
        last_saved: session.last_saved().map(str::to_string),
    }))
}

/// DELETE /api/properties/:id
pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut sessions = state.sessions.lock().await;
    let session = match sessions.remove(&id) {
        Some(session) => session,
        None => {
            EditorSession::open(
                state.records.clone(),
                state.assets.clone(),
                state.blobs.clone(),
                &id,
                0,
            )
            .await?
        }
    };
    session.delete().await?;
    Ok(StatusCode::NO_CONTENT)
}
