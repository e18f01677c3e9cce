//! HTTP surface tests driven through the router with `tower::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use backend_lib::config::Settings;
use backend_lib::inventory::FlatFileInventory;
use backend_lib::router::create_router;
use backend_lib::storage::MemoryCredentialStore;
use backend_lib::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn test_app(dir: &TempDir) -> Router {
    let mut settings = Settings::default();
    settings.data_dir = dir.path().to_path_buf();

    let credentials = Arc::new(MemoryCredentialStore::new());
    let gateway = Arc::new(FlatFileInventory::new(dir.path()).unwrap());
    let state = Arc::new(AppState::new(credentials, gateway, settings));
    create_router(state)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_sign_up_logs_the_account_in() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = post(
        &app,
        "/account/sign_up",
        json!({"username": "alice", "password": "Secr3t!"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let session_id = body["data"]["session_id"].as_str().unwrap().to_string();
    assert!(!session_id.is_empty());
    assert_eq!(body["data"]["assets"], json!([]));

    let (status, body) = post(
        &app,
        "/account/logged_in",
        json!({"session_id": session_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(true));
}

#[tokio::test]
async fn test_malformed_sign_up_is_a_client_error() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = post(
        &app,
        "/account/sign_up",
        json!({"username": "bob", "password": "ab"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["err"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn test_duplicate_sign_up_conflicts() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let body = json!({"username": "alice", "password": "Secr3t!"});
    let (status, _) = post(&app, "/account/sign_up", body.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, reply) = post(&app, "/account/sign_up", body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(reply["success"], json!(false));
}

#[tokio::test]
async fn test_login_failures_are_uniform_across_causes() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    post(
        &app,
        "/account/sign_up",
        json!({"username": "alice", "password": "Secr3t!"}),
    )
    .await;

    let (ghost_status, ghost_body) = post(
        &app,
        "/account/log_in",
        json!({"username": "ghost", "password": "whatever!"}),
    )
    .await;
    let (wrong_status, wrong_body) = post(
        &app,
        "/account/log_in",
        json!({"username": "alice", "password": "not_it!"}),
    )
    .await;

    assert_eq!(ghost_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(ghost_body["err"], wrong_body["err"]);
    assert_eq!(ghost_body["code"], wrong_body["code"]);
}

#[tokio::test]
async fn test_log_out_is_idempotent_over_http() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (_, body) = post(
        &app,
        "/account/sign_up",
        json!({"username": "alice", "password": "Secr3t!"}),
    )
    .await;
    let session_id = body["data"]["session_id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let (status, reply) = post(
            &app,
            "/account/log_out",
            json!({"session_id": session_id}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["success"], json!(true));
    }

    let (_, reply) = post(
        &app,
        "/account/logged_in",
        json!({"session_id": session_id}),
    )
    .await;
    assert_eq!(reply["data"], json!(false));
}

#[tokio::test]
async fn test_inventory_requires_a_live_session() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (status, body) = post(
        &app,
        "/assets/add",
        json!({"session_id": "never-issued", "asset_name": "projector"}),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_asset_round_trip_through_the_api() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (_, body) = post(
        &app,
        "/account/sign_up",
        json!({"username": "alice", "password": "Secr3t!"}),
    )
    .await;
    let session_id = body["data"]["session_id"].as_str().unwrap().to_string();

    let (status, body) = post(
        &app,
        "/assets/add",
        json!({
            "session_id": session_id,
            "asset_name": "projector",
            "purchase_price": 499.0,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let asset_id = body["data"]["asset_id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["username"], json!("alice"));

    let (status, body) = post(
        &app,
        "/assets/get",
        json!({"session_id": session_id, "id": asset_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["asset_name"], json!("projector"));

    // The user's next login snapshot includes the asset
    let (_, body) = post(
        &app,
        "/account/log_in",
        json!({"username": "alice", "password": "Secr3t!"}),
    )
    .await;
    assert_eq!(body["data"]["assets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sites_and_locations_through_the_api() {
    let dir = TempDir::new().unwrap();
    let app = test_app(&dir);

    let (_, body) = post(
        &app,
        "/account/sign_up",
        json!({"username": "alice", "password": "Secr3t!"}),
    )
    .await;
    let session_id = body["data"]["session_id"].as_str().unwrap().to_string();

    let (status, body) = post(
        &app,
        "/sites/add",
        json!({
            "session_id": session_id,
            "site_name": "HQ",
            "location_name": "Floor 1",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let site_id = body["data"]["site_id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["locations"], json!(["Floor 1"]));

    let (status, body) = post(
        &app,
        "/locations/add",
        json!({
            "session_id": session_id,
            "site_id": site_id,
            "location_name": "Floor 2",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["locations"], json!(["Floor 1", "Floor 2"]));

    let (status, body) = post(
        &app,
        "/categories/add",
        json!({"session_id": session_id, "category_name": "AV gear"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category_name"], json!("AV gear"));
}
