use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable correlation between an IdP account and its internal profile key.
///
/// Created once at first successful profile creation, never updated. Any
/// consumer can resolve `external_id -> profile_id` without re-deriving it,
/// and the insert-if-absent semantics guard against duplicate profile
/// creation across re-runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityMapping {
    pub external_id: String,
    pub profile_id: i64,
    pub created_at: DateTime<Utc>,
}
