use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::error::{AgoraError, Result};
use crate::models::{
    mapping::IdentityMapping,
    profile::{Profile, ProfileSyncStatus, ProfileUpsert, Role},
    sync::{NewSyncLogEntry, SyncLogEntry, SyncType},
    token::ApiToken,
};

use super::repository::{
    ApiTokenRepository, MappingRepository, ProfileRepository, ProfileStore, ProfileSyncCounts,
    SyncLogRepository,
};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ProfileStore for SqliteStore {}

// -- Helper functions for parsing enums from DB strings --

fn parse_role(s: &str) -> Role {
    Role::parse(s).unwrap_or(Role::User)
}

fn parse_profile_sync_status(s: &str) -> ProfileSyncStatus {
    match s {
        "error" => ProfileSyncStatus::Error,
        _ => ProfileSyncStatus::Success,
    }
}

fn profile_sync_status_to_str(s: &ProfileSyncStatus) -> &'static str {
    match s {
        ProfileSyncStatus::Success => "success",
        ProfileSyncStatus::Error => "error",
    }
}

fn parse_sync_type(s: &str) -> SyncType {
    match s {
        "create" => SyncType::Create,
        _ => SyncType::Update,
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn datetime_to_str(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_optional_datetime(s: Option<String>) -> Option<DateTime<Utc>> {
    s.map(|v| parse_datetime(&v))
}

const PROFILE_COLUMNS: &str = "id, external_id, email, full_name, avatar_url, phone, is_verified, \
     role, is_active, last_sync_at, sync_status, idp_created_at, idp_last_sign_in_at, \
     created_at, updated_at";

fn profile_from_row(r: &sqlx::sqlite::SqliteRow) -> Profile {
    Profile {
        id: r.get("id"),
        external_id: r.get("external_id"),
        email: r.get("email"),
        full_name: r.get("full_name"),
        avatar_url: r.get("avatar_url"),
        phone: r.get("phone"),
        is_verified: r.get("is_verified"),
        role: parse_role(r.get("role")),
        is_active: r.get("is_active"),
        last_sync_at: parse_datetime(r.get("last_sync_at")),
        sync_status: parse_profile_sync_status(r.get("sync_status")),
        idp_created_at: parse_datetime(r.get("idp_created_at")),
        idp_last_sign_in_at: parse_optional_datetime(r.get("idp_last_sign_in_at")),
        created_at: parse_datetime(r.get("created_at")),
        updated_at: parse_datetime(r.get("updated_at")),
    }
}

#[async_trait]
impl ProfileRepository for SqliteStore {
    async fn find_profile_by_external_id(&self, external_id: &str) -> Result<Option<Profile>> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE external_id = ?1"
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(profile_from_row))
    }

    async fn upsert_profile(&self, upsert: &ProfileUpsert) -> Result<Profile> {
        let now = datetime_to_str(&Utc::now());

        // The conflict branch deliberately leaves role and created_at alone.
        sqlx::query(
            "INSERT INTO profiles (external_id, email, full_name, avatar_url, phone, is_verified, role, is_active, last_sync_at, sync_status, idp_created_at, idp_last_sign_in_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
             ON CONFLICT(external_id) DO UPDATE SET
                email = excluded.email,
                full_name = excluded.full_name,
                avatar_url = excluded.avatar_url,
                phone = excluded.phone,
                is_verified = excluded.is_verified,
                is_active = excluded.is_active,
                last_sync_at = excluded.last_sync_at,
                sync_status = excluded.sync_status,
                idp_created_at = excluded.idp_created_at,
                idp_last_sign_in_at = excluded.idp_last_sign_in_at,
                updated_at = excluded.updated_at",
        )
        .bind(&upsert.external_id)
        .bind(&upsert.email)
        .bind(&upsert.full_name)
        .bind(&upsert.avatar_url)
        .bind(&upsert.phone)
        .bind(upsert.is_verified)
        .bind(upsert.role.as_str())
        .bind(upsert.is_active)
        .bind(&now)
        .bind(profile_sync_status_to_str(&upsert.sync_status))
        .bind(datetime_to_str(&upsert.idp_created_at))
        .bind(upsert.idp_last_sign_in_at.as_ref().map(datetime_to_str))
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE external_id = ?1"
        ))
        .bind(&upsert.external_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(profile_from_row(r)),
            None => Err(AgoraError::Database(sqlx::Error::RowNotFound)),
        }
    }

    async fn set_profile_role(&self, external_id: &str, role: Role) -> Result<bool> {
        let result =
            sqlx::query("UPDATE profiles SET role = ?1, updated_at = ?2 WHERE external_id = ?3")
                .bind(role.as_str())
                .bind(datetime_to_str(&Utc::now()))
                .bind(external_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_profile_sync_status(
        &self,
        external_id: &str,
        status: ProfileSyncStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE profiles SET sync_status = ?1, updated_at = ?2 WHERE external_id = ?3",
        )
        .bind(profile_sync_status_to_str(&status))
        .bind(datetime_to_str(&Utc::now()))
        .bind(external_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn profile_sync_counts(&self) -> Result<ProfileSyncCounts> {
        let row = sqlx::query(
            "SELECT
                COUNT(*) as total,
                COALESCE(SUM(CASE WHEN sync_status = 'success' THEN 1 ELSE 0 END), 0) as successful,
                COALESCE(SUM(CASE WHEN sync_status = 'error' THEN 1 ELSE 0 END), 0) as failed
             FROM profiles",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(ProfileSyncCounts {
            total: row.get::<i64, _>("total"),
            successful: row.get::<i64, _>("successful"),
            failed: row.get::<i64, _>("failed"),
        })
    }

    async fn latest_sync_at(&self) -> Result<Option<DateTime<Utc>>> {
        let row = sqlx::query("SELECT MAX(last_sync_at) as last_sync FROM profiles")
            .fetch_one(&self.pool)
            .await?;
        let last_sync: Option<String> = row.get("last_sync");
        Ok(parse_optional_datetime(last_sync))
    }
}

#[async_trait]
impl MappingRepository for SqliteStore {
    async fn upsert_mapping(&self, external_id: &str, profile_id: i64) -> Result<()> {
        // First write wins; re-syncs hit the conflict branch and change nothing.
        sqlx::query(
            "INSERT INTO identity_mappings (external_id, profile_id, created_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(external_id) DO NOTHING",
        )
        .bind(external_id)
        .bind(profile_id)
        .bind(datetime_to_str(&Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_mapping(&self, external_id: &str) -> Result<Option<IdentityMapping>> {
        let row = sqlx::query(
            "SELECT external_id, profile_id, created_at FROM identity_mappings WHERE external_id = ?1",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| IdentityMapping {
            external_id: r.get("external_id"),
            profile_id: r.get("profile_id"),
            created_at: parse_datetime(r.get("created_at")),
        }))
    }
}

#[async_trait]
impl SyncLogRepository for SqliteStore {
    async fn append_sync_log(&self, entry: &NewSyncLogEntry) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO sync_logs (external_id, profile_id, sync_type, sync_status, error_message, duration_ms, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&entry.external_id)
        .bind(entry.profile_id)
        .bind(entry.sync_type.as_str())
        .bind(profile_sync_status_to_str(&entry.sync_status))
        .bind(&entry.error_message)
        .bind(entry.duration_ms)
        .bind(datetime_to_str(&Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn list_recent_sync_logs(&self, limit: i64) -> Result<Vec<SyncLogEntry>> {
        let rows = sqlx::query(
            "SELECT id, external_id, profile_id, sync_type, sync_status, error_message, duration_ms, created_at
             FROM sync_logs
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| SyncLogEntry {
                id: r.get("id"),
                external_id: r.get("external_id"),
                profile_id: r.get("profile_id"),
                sync_type: parse_sync_type(r.get("sync_type")),
                sync_status: parse_profile_sync_status(r.get("sync_status")),
                error_message: r.get("error_message"),
                duration_ms: r.get("duration_ms"),
                created_at: parse_datetime(r.get("created_at")),
            })
            .collect())
    }
}

#[async_trait]
impl ApiTokenRepository for SqliteStore {
    async fn create_api_token(&self, token: &ApiToken) -> Result<()> {
        sqlx::query(
            "INSERT INTO api_tokens (token, external_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&token.token)
        .bind(&token.external_id)
        .bind(datetime_to_str(&token.created_at))
        .bind(token.expires_at.as_ref().map(datetime_to_str))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_api_token(&self, token: &str) -> Result<Option<ApiToken>> {
        let row = sqlx::query(
            "SELECT token, external_id, created_at, expires_at FROM api_tokens WHERE token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ApiToken {
            token: r.get("token"),
            external_id: r.get("external_id"),
            created_at: parse_datetime(r.get("created_at")),
            expires_at: parse_optional_datetime(r.get("expires_at")),
        }))
    }

    async fn revoke_api_token(&self, token: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE token = ?1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_api_tokens(&self) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM api_tokens WHERE expires_at IS NOT NULL AND expires_at <= ?1",
        )
        .bind(datetime_to_str(&Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
