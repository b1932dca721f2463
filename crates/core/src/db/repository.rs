use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    mapping::IdentityMapping,
    profile::{Profile, ProfileSyncStatus, ProfileUpsert, Role},
    sync::{NewSyncLogEntry, SyncLogEntry},
    token::ApiToken,
};

use chrono::{DateTime, Utc};

/// Aggregate counts over profiles, grouped by last recorded sync status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileSyncCounts {
    pub total: i64,
    pub successful: i64,
    pub failed: i64,
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_profile_by_external_id(&self, external_id: &str) -> Result<Option<Profile>>;
    /// Insert or update by `external_id`. The update path never touches
    /// `role` or `created_at`. Returns the profile as stored.
    async fn upsert_profile(&self, upsert: &ProfileUpsert) -> Result<Profile>;
    async fn set_profile_role(&self, external_id: &str, role: Role) -> Result<bool>;
    async fn mark_profile_sync_status(
        &self,
        external_id: &str,
        status: ProfileSyncStatus,
    ) -> Result<bool>;
    async fn profile_sync_counts(&self) -> Result<ProfileSyncCounts>;
    async fn latest_sync_at(&self) -> Result<Option<DateTime<Utc>>>;
}

#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Record the external_id -> profile_id link. Inserting an existing
    /// mapping again is a no-op; the first profile_id wins.
    async fn upsert_mapping(&self, external_id: &str, profile_id: i64) -> Result<()>;
    async fn get_mapping(&self, external_id: &str) -> Result<Option<IdentityMapping>>;
}

#[async_trait]
pub trait SyncLogRepository: Send + Sync {
    async fn append_sync_log(&self, entry: &NewSyncLogEntry) -> Result<i64>;
    async fn list_recent_sync_logs(&self, limit: i64) -> Result<Vec<SyncLogEntry>>;
}

#[async_trait]
pub trait ApiTokenRepository: Send + Sync {
    async fn create_api_token(&self, token: &ApiToken) -> Result<()>;
    async fn get_api_token(&self, token: &str) -> Result<Option<ApiToken>>;
    async fn revoke_api_token(&self, token: &str) -> Result<bool>;
    async fn delete_expired_api_tokens(&self) -> Result<u64>;
}

/// Combined repository trait for the full profile store surface.
pub trait ProfileStore:
    ProfileRepository + MappingRepository + SyncLogRepository + ApiTokenRepository
{
}
