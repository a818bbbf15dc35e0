//! Router-level tests for the editor API.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

use helpers::{sample_property, TestEnv};
use listing_sync::{build_router, AppState};

async fn setup() -> (axum::Router, TestEnv) {
    let env = TestEnv::new().await;
    let state = AppState::new(env.records.clone(), env.assets.clone(), env.blobs.clone());
    (build_router(state), env)
}

async fn json_body(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn request(method: &str, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_module() {
    let (app, _env) = setup().await;

    let response = app
        .oneshot(request("GET", "/health", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "listing-sync");
}

#[tokio::test]
async fn create_then_save_field_round_trip() {
    let (app, env) = setup().await;

    let response = app
        .clone()
        .oneshot(request("POST", "/api/properties", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    let id = body["property"]["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(body["dirty"], false);

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/properties/{id}/fields/title"),
            Body::from(r#""Harbour House""#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["saved"], true);
    assert_eq!(body["dirty"], false);
    assert!(body["last_saved"].is_string());

    assert_eq!(env.row(&id).await.title, "Harbour House");

    let response = app
        .oneshot(request(
            "GET",
            &format!("/api/properties/{id}/status"),
            Body::empty(),
        ))
        .await
        .unwrap();
    let body = json_body(response.into_body()).await;
    assert_eq!(body["dirty"], false);
    assert_eq!(body["step"], 0);
}

#[tokio::test]
async fn unknown_field_is_rejected() {
    let (app, env) = setup().await;
    env.seed(&sample_property("p1", "Villa")).await;

    let response = app
        .oneshot(request(
            "PUT",
            "/api/properties/p1/fields/owner_ssn",
            Body::from(r#""x""#),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_property_is_not_found() {
    let (app, _env) = setup().await;

    let response = app
        .oneshot(request("GET", "/api/properties/nope", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn navigation_endpoint_advances_and_clamps() {
    let (app, env) = setup().await;
    env.seed(&sample_property("p1", "Villa")).await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/properties/p1/steps/next",
            Body::empty(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["step"], 1);

    let response = app
        .oneshot(request(
            "POST",
            "/api/properties/p1/steps/99",
            Body::empty(),
        ))
        .await
        .unwrap();
    let body = json_body(response.into_body()).await;
    assert_eq!(body["step"], 5);
}

#[tokio::test]
async fn asset_upload_appends_to_the_gallery() {
    let (app, env) = setup().await;
    env.seed(&sample_property("p1", "Villa")).await;

    let response = app
        .oneshot(request(
            "POST",
            "/api/properties/p1/assets?kind=image&file_name=photo.jpg",
            Body::from("jpeg bytes".as_bytes().to_vec()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response.into_body()).await;
    assert_eq!(body["property"]["images"].as_array().unwrap().len(), 1);
    assert_eq!(body["dirty"], true);
    assert_eq!(env.blobs.upload_count(), 1);
}
