// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router and JSON handlers.
//!
//! Every inventory handler resolves the username from the request's
//! session id before anything else; a client-supplied username field is
//! never accepted for scoping.
use crate::error::AppError;
use crate::inventory::AssetKey;
use crate::AppState;
use axum::{
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use stocktake_common::{
    AddAssetRequest, AddCategoryRequest, AddLocationRequest, AddSiteRequest, ApiResponse,
    AssetQueryRequest, AssetRecord, CategoryRecord, CredentialsRequest, LoginData,
    SessionRequest, SiteRecord,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/account/sign_up", post(sign_up))
        .route("/account/log_in", post(log_in))
        .route("/account/logged_in", post(logged_in))
        .route("/account/log_out", post(log_out))
        .route("/assets/get", post(get_asset))
        .route("/assets/add", post(add_asset))
        .route("/categories/add", post(add_category))
        .route("/sites/add", post(add_site))
        .route("/locations/add", post(add_location))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Client address for rate limiting, taken from the reverse proxy header
fn client_ip(headers: &HeaderMap) -> IpAddr {
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Sign up a new account and log it straight in, like the account page does
async fn sign_up(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<LoginData>>, AppError> {
    state.accounts.sign_up(&req.username, &req.password).await?;
    let data = log_in_with_snapshot(&state, client_ip(&headers), &req).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// Log in and return the session id plus the account's dashboard data
async fn log_in(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<LoginData>>, AppError> {
    let data = log_in_with_snapshot(&state, client_ip(&headers), &req).await?;
    Ok(Json(ApiResponse::ok(data)))
}

async fn log_in_with_snapshot(
    state: &AppState,
    ip: IpAddr,
    req: &CredentialsRequest,
) -> Result<LoginData, AppError> {
    if !state.auth_limiter.check_rate_limit(ip) {
        return Err(AppError::AuthRateLimited);
    }

    let session_id = match state.accounts.log_in(&req.username, &req.password).await {
        Ok(session_id) => {
            state.auth_limiter.record_success(ip);
            session_id
        },
        Err(err) => {
            if matches!(err, AppError::LoginFailed) {
                state.auth_limiter.record_failed_attempt(ip);
            }
            return Err(err);
        },
    };

    Ok(LoginData {
        assets: state.inventory.full_assets(&req.username).await?,
        categories: state.inventory.all_categories(&req.username).await?,
        sites: state.inventory.all_sites(&req.username).await?,
        session_id,
    })
}

/// Session liveness check. Keyed by session id rather than username, so
/// the endpoint cannot be used to probe who is logged in.
async fn logged_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Json<ApiResponse<bool>> {
    let active = state.accounts.is_session_active(&req.session_id).await;
    Json(ApiResponse::ok(active))
}

/// Log out. Always succeeds; an unknown session id is a no-op.
async fn log_out(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Json<ApiResponse<()>> {
    state.accounts.log_out(&req.session_id).await;
    Json(ApiResponse::ok_empty())
}

/// Resolve the username a request acts for, from its session id only
async fn resolve_username(state: &AppState, session_id: &str) -> Result<String, AppError> {
    state
        .accounts
        .session_username(session_id)
        .await
        .ok_or(AppError::UnknownSession)
}

async fn get_asset(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssetQueryRequest>,
) -> Result<Json<ApiResponse<AssetRecord>>, AppError> {
    let username = resolve_username(&state, &req.session_id).await?;
    let key = AssetKey::from_parts(req.id, req.name)?;
    let record = state.inventory.get_asset(&username, key).await?;
    Ok(Json(ApiResponse::ok(record)))
}

async fn add_asset(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddAssetRequest>,
) -> Result<Json<ApiResponse<AssetRecord>>, AppError> {
    let username = resolve_username(&state, &req.session_id).await?;
    let record = state.inventory.add_asset(&username, req.asset).await?;
    Ok(Json(ApiResponse::ok(record)))
}

async fn add_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddCategoryRequest>,
) -> Result<Json<ApiResponse<CategoryRecord>>, AppError> {
    let username = resolve_username(&state, &req.session_id).await?;
    let record = state
        .inventory
        .add_category(&username, &req.category_name)
        .await?;
    Ok(Json(ApiResponse::ok(record)))
}

async fn add_site(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddSiteRequest>,
) -> Result<Json<ApiResponse<SiteRecord>>, AppError> {
    let username = resolve_username(&state, &req.session_id).await?;
    let locations = req.location_name.into_iter().collect();
    let record = state
        .inventory
        .add_site(&username, &req.site_name, locations)
        .await?;
    Ok(Json(ApiResponse::ok(record)))
}

async fn add_location(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddLocationRequest>,
) -> Result<Json<ApiResponse<SiteRecord>>, AppError> {
    let username = resolve_username(&state, &req.session_id).await?;
    let record = state
        .inventory
        .add_location(&username, &req.site_id, &req.location_name)
        .await?;
    Ok(Json(ApiResponse::ok(record)))
}
