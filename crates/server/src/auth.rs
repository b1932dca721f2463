//! Bearer-token authentication for the admin endpoints.

use axum::http::{header, HeaderMap};
use chrono::Utc;
use tracing::warn;

use agora_core::db::repository::{ApiTokenRepository, ProfileRepository, ProfileStore};
use agora_core::error::{AgoraError, Result};
use agora_core::models::profile::{Profile, Role};

/// Pull the bearer token out of the Authorization header.
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AgoraError::Unauthenticated("missing Authorization header".to_string())
        })?;

    header
        .strip_prefix("Bearer ")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AgoraError::Unauthenticated("malformed Authorization header".to_string())
        })
}

/// Resolve the calling admin or fail with the first applicable error.
///
/// Credential problems (missing, malformed, unknown, expired) are
/// `Unauthenticated`; a recognized caller without admin standing is
/// `Forbidden`.
pub async fn require_admin<R: ProfileStore>(store: &R, headers: &HeaderMap) -> Result<Profile> {
    let token = extract_bearer_token(headers)?;

    let api_token = store
        .get_api_token(token)
        .await?
        .ok_or_else(|| AgoraError::Unauthenticated("unknown API token".to_string()))?;

    if api_token.is_expired(Utc::now()) {
        warn!(external_id = %api_token.external_id, "Rejected expired API token");
        return Err(AgoraError::Unauthenticated("expired API token".to_string()));
    }

    let profile = store
        .find_profile_by_external_id(&api_token.external_id)
        .await?
        .ok_or_else(|| {
            AgoraError::Forbidden(format!(
                "no profile for token subject {}",
                api_token.external_id
            ))
        })?;

    if profile.role != Role::Admin {
        return Err(AgoraError::Forbidden("admin role required".to_string()));
    }

    Ok(profile)
}
