//! Shared fixtures for the sync test modules.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use agora_core::db::repository::{
    ApiTokenRepository, MappingRepository, ProfileRepository, ProfileStore, ProfileSyncCounts,
    SyncLogRepository,
};
use agora_core::db::sqlite::SqliteStore;
use agora_core::db::DatabasePool;
use agora_core::error::{AgoraError, Result};
use agora_core::models::account::IdpAccount;
use agora_core::models::mapping::IdentityMapping;
use agora_core::models::profile::{Profile, ProfileSyncStatus, ProfileUpsert, Role};
use agora_core::models::sync::{NewSyncLogEntry, SyncLogEntry};
use agora_core::models::token::ApiToken;

pub async fn setup_store() -> SqliteStore {
    let pool = DatabasePool::new_sqlite_memory().await.unwrap();
    match pool {
        DatabasePool::Sqlite(p) => SqliteStore::new(p),
    }
}

pub fn sample_account(id: &str) -> IdpAccount {
    IdpAccount {
        id: id.to_string(),
        email: format!("{id}@example.org"),
        display_name: format!("User {id}"),
        avatar_url: None,
        phone: None,
        email_verified: true,
        created_at: Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap(),
        last_sign_in_at: None,
    }
}

/// Store wrapper that fails selected operations, for exercising error paths
/// without a broken database.
pub struct FlakyStore {
    pub inner: SqliteStore,
    pub fail_lookup: bool,
    pub fail_log: bool,
    pub fail_upsert: bool,
    /// Fail upserts only for this external id.
    pub fail_upsert_for: Option<String>,
}

impl FlakyStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            fail_lookup: false,
            fail_log: false,
            fail_upsert: false,
            fail_upsert_for: None,
        }
    }

    fn injected() -> AgoraError {
        AgoraError::Database(sqlx::Error::PoolTimedOut)
    }

    fn upsert_should_fail(&self, external_id: &str) -> bool {
        self.fail_upsert || self.fail_upsert_for.as_deref() == Some(external_id)
    }
}

#[async_trait]
impl ProfileRepository for FlakyStore {
    async fn find_profile_by_external_id(&self, external_id: &str) -> Result<Option<Profile>> {
        if self.fail_lookup {
            return Err(Self::injected());
        }
        self.inner.find_profile_by_external_id(external_id).await
    }

    async fn upsert_profile(&self, upsert: &ProfileUpsert) -> Result<Profile> {
        if self.upsert_should_fail(&upsert.external_id) {
            return Err(Self::injected());
        }
        self.inner.upsert_profile(upsert).await
    }

    async fn set_profile_role(&self, external_id: &str, role: Role) -> Result<bool> {
        self.inner.set_profile_role(external_id, role).await
    }

    async fn mark_profile_sync_status(
        &self,
        external_id: &str,
        status: ProfileSyncStatus,
    ) -> Result<bool> {
        self.inner.mark_profile_sync_status(external_id, status).await
    }

    async fn profile_sync_counts(&self) -> Result<ProfileSyncCounts> {
        self.inner.profile_sync_counts().await
    }

    async fn latest_sync_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.inner.latest_sync_at().await
    }
}

#[async_trait]
impl MappingRepository for FlakyStore {
    async fn upsert_mapping(&self, external_id: &str, profile_id: i64) -> Result<()> {
        self.inner.upsert_mapping(external_id, profile_id).await
    }

    async fn get_mapping(&self, external_id: &str) -> Result<Option<IdentityMapping>> {
        self.inner.get_mapping(external_id).await
    }
}

#[async_trait]
impl SyncLogRepository for FlakyStore {
    async fn append_sync_log(&self, entry: &NewSyncLogEntry) -> Result<i64> {
        if self.fail_log {
            return Err(Self::injected());
        }
        self.inner.append_sync_log(entry).await
    }

    async fn list_recent_sync_logs(&self, limit: i64) -> Result<Vec<SyncLogEntry>> {
        self.inner.list_recent_sync_logs(limit).await
    }
}

#[async_trait]
impl ApiTokenRepository for FlakyStore {
    async fn create_api_token(&self, token: &ApiToken) -> Result<()> {
        self.inner.create_api_token(token).await
    }

    async fn get_api_token(&self, token: &str) -> Result<Option<ApiToken>> {
        self.inner.get_api_token(token).await
    }

    async fn revoke_api_token(&self, token: &str) -> Result<bool> {
        self.inner.revoke_api_token(token).await
    }

    async fn delete_expired_api_tokens(&self) -> Result<u64> {
        self.inner.delete_expired_api_tokens().await
    }
}

impl ProfileStore for FlakyStore {}
