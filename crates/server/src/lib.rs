//! Agora admin gateway. A small JSON API for triggering and inspecting
//! identity sync runs, guarded by bearer tokens and per-origin rate limits.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use agora_core::db::repository::{ProfileRepository, SyncLogRepository};
use agora_core::db::sqlite::SqliteStore;
use agora_core::error::{AgoraError, Result};
use agora_core::http::extract_client_ip;
use agora_core::idp::IdentityProvider;
use agora_core::models::sync::SyncOverview;
use agora_sync::SyncEngine;

use crate::rate_limit::FixedWindowLimiter;

pub mod auth;
pub mod rate_limit;

const RECENT_LOG_LIMIT: i64 = 10;

/// Shared application state for all gateway routes.
pub struct AppState {
    pub repo: SqliteStore,
    pub provider: Arc<dyn IdentityProvider>,
    pub sync_limiter: FixedWindowLimiter,
    pub status_limiter: FixedWindowLimiter,
}

/// Build the gateway router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/admin/sync", post(trigger_sync).get(sync_status))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Origin key for rate limiting: first X-Forwarded-For hop, else "local".
fn client_origin(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());
    extract_client_ip(forwarded).unwrap_or_else(|| "local".to_string())
}

/// Map a domain error onto the wire. Rate limiting carries a Retry-After
/// header; everything unexpected collapses to 500.
fn error_response(err: &AgoraError) -> Response {
    let status = match err {
        AgoraError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        AgoraError::Forbidden(_) => StatusCode::FORBIDDEN,
        AgoraError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "Admin request failed");
    }

    let body = Json(json!({ "success": false, "error": err.to_string() }));
    match err {
        AgoraError::RateLimited { retry_after_secs } => (
            status,
            [(header::RETRY_AFTER, retry_after_secs.to_string())],
            body,
        )
            .into_response(),
        _ => (status, body).into_response(),
    }
}

/// POST /admin/sync
async fn trigger_sync(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(e) = auth::require_admin(&state.repo, &headers).await {
        return error_response(&e);
    }
    if let Err(retry_after_secs) = state.sync_limiter.check(&client_origin(&headers)) {
        return error_response(&AgoraError::RateLimited { retry_after_secs });
    }

    let started = Instant::now();
    let engine = SyncEngine::new(state.repo.clone());
    match engine.sync_all(state.provider.as_ref()).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "stats": report,
                "durationMs": started.elapsed().as_millis() as u64,
            })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /admin/sync
async fn sync_status(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Err(e) = auth::require_admin(&state.repo, &headers).await {
        return error_response(&e);
    }
    if let Err(retry_after_secs) = state.status_limiter.check(&client_origin(&headers)) {
        return error_response(&AgoraError::RateLimited { retry_after_secs });
    }

    match build_overview(&state.repo).await {
        Ok(overview) => (StatusCode::OK, Json(json!({ "stats": overview }))).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn build_overview(repo: &SqliteStore) -> Result<SyncOverview> {
    let counts = repo.profile_sync_counts().await?;
    let last_sync = repo.latest_sync_at().await?;
    let recent_logs = repo.list_recent_sync_logs(RECENT_LOG_LIMIT).await?;
    Ok(SyncOverview {
        total_synced_users: counts.total,
        successful_syncs: counts.successful,
        failed_syncs: counts.failed,
        last_sync,
        recent_logs,
    })
}
