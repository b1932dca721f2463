use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::IdpAccount;

/// Authorization role of a profile. Assigned `User` at first creation and
/// only ever changed out-of-band (never by a sync).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "moderator" => Some(Role::Moderator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

/// Outcome status recorded on a profile by its most recent reconciliation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSyncStatus {
    Success,
    Error,
}

/// An application-level user profile owned by the Profile Store.
///
/// `id` is the store-generated primary key; `external_id` correlates the row
/// with its IdP account. Exactly one profile exists per `external_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: i64,
    pub external_id: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub is_verified: bool,
    pub role: Role,
    pub is_active: bool,
    pub last_sync_at: DateTime<Utc>,
    pub sync_status: ProfileSyncStatus,
    pub idp_created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idp_last_sign_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write model for the upsert-by-`external_id` operation.
///
/// Carries every IdP-sourced field plus the `role` the row should hold if it
/// is being created. On the conflict (update) path the store ignores `role`,
/// so a sync can never clobber an out-of-band promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpsert {
    pub external_id: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub is_verified: bool,
    pub role: Role,
    pub is_active: bool,
    pub sync_status: ProfileSyncStatus,
    pub idp_created_at: DateTime<Utc>,
    pub idp_last_sign_in_at: Option<DateTime<Utc>>,
}

impl ProfileUpsert {
    /// Build the write model for a fresh IdP account with no existing profile.
    pub fn for_new_account(account: &IdpAccount) -> Self {
        Self::from_account(account, Role::User)
    }

    /// Build the write model for re-syncing an account onto an existing
    /// profile, carrying the existing row's role forward unchanged.
    pub fn for_existing_profile(account: &IdpAccount, existing: &Profile) -> Self {
        Self::from_account(account, existing.role)
    }

    fn from_account(account: &IdpAccount, role: Role) -> Self {
        Self {
            external_id: account.id.clone(),
            email: account.email.clone(),
            full_name: account.display_name.clone(),
            avatar_url: account.avatar_url.clone(),
            phone: account.phone.clone(),
            is_verified: account.email_verified,
            role,
            is_active: true,
            sync_status: ProfileSyncStatus::Success,
            idp_created_at: account.created_at,
            idp_last_sign_in_at: account.last_sign_in_at,
        }
    }
}
