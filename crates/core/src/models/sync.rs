use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile::ProfileSyncStatus;

/// Whether a reconciliation created a fresh profile or refreshed an existing one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    Create,
    Update,
}

impl SyncType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncType::Create => "create",
            SyncType::Update => "update",
        }
    }
}

/// One row of the append-only reconciliation audit log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncLogEntry {
    pub id: i64,
    pub external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<i64>,
    pub sync_type: SyncType,
    pub sync_status: ProfileSyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

/// Write model for appending a sync log row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSyncLogEntry {
    pub external_id: String,
    pub profile_id: Option<i64>,
    pub sync_type: SyncType,
    pub sync_status: ProfileSyncStatus,
    pub error_message: Option<String>,
    pub duration_ms: i64,
}

/// Result of reconciling a single IdP account.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub external_id: String,
    pub email: String,
    pub profile_id: Option<i64>,
    pub sync_type: SyncType,
    pub sync_status: ProfileSyncStatus,
    pub error: Option<String>,
    pub duration_ms: i64,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        self.sync_status == ProfileSyncStatus::Success
    }
}

/// A failed account within a batch, with enough identity for manual remediation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub error: String,
}

/// Aggregate statistics for one full sync run, folded over per-account outcomes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub total: i64,
    pub successful: i64,
    pub failed: i64,
    pub created: i64,
    pub updated: i64,
    pub errors: Vec<SyncFailure>,
}

impl SyncReport {
    /// Fold one account's outcome into the run statistics.
    pub fn record(&mut self, outcome: &SyncOutcome) {
        self.total += 1;
        if outcome.is_success() {
            self.successful += 1;
            match outcome.sync_type {
                SyncType::Create => self.created += 1,
                SyncType::Update => self.updated += 1,
            }
        } else {
            self.failed += 1;
            self.errors.push(SyncFailure {
                external_id: outcome.external_id.clone(),
                email: Some(outcome.email.clone()).filter(|e| !e.is_empty()),
                error: outcome.error.clone().unwrap_or_default(),
            });
        }
    }
}

/// Aggregate sync state read directly from the Profile Store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncOverview {
    pub total_synced_users: i64,
    pub successful_syncs: i64,
    pub failed_syncs: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    pub recent_logs: Vec<SyncLogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn success_outcome(id: &str, sync_type: SyncType) -> SyncOutcome {
        SyncOutcome {
            external_id: id.to_string(),
            email: format!("{id}@example.org"),
            profile_id: Some(1),
            sync_type,
            sync_status: ProfileSyncStatus::Success,
            error: None,
            duration_ms: 12,
        }
    }

    fn error_outcome(id: &str) -> SyncOutcome {
        SyncOutcome {
            external_id: id.to_string(),
            email: format!("{id}@example.org"),
            profile_id: None,
            sync_type: SyncType::Create,
            sync_status: ProfileSyncStatus::Error,
            error: Some("database error: locked".to_string()),
            duration_ms: 3,
        }
    }

    #[test]
    fn sync_type_serialization() {
        assert_eq!(
            serde_json::to_string(&SyncType::Create).unwrap(),
            "\"create\""
        );
        assert_eq!(
            serde_json::to_string(&SyncType::Update).unwrap(),
            "\"update\""
        );
    }

    #[test]
    fn report_folds_outcomes() {
        let mut report = SyncReport::default();
        report.record(&success_outcome("u1", SyncType::Create));
        report.record(&success_outcome("u2", SyncType::Update));
        report.record(&error_outcome("u3"));

        assert_eq!(report.total, 3);
        assert_eq!(report.successful, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].external_id, "u3");
        assert_eq!(report.errors[0].email.as_deref(), Some("u3@example.org"));
        assert!(report.errors[0].error.contains("locked"));
    }

    #[test]
    fn report_omits_empty_email_in_failures() {
        let mut outcome = error_outcome("u9");
        outcome.email = String::new();
        let mut report = SyncReport::default();
        report.record(&outcome);
        assert_eq!(report.errors[0].email, None);
    }

    #[test]
    fn report_camel_case_fields() {
        let mut report = SyncReport::default();
        report.record(&error_outcome("u1"));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"successful\""));
        assert!(json.contains("\"externalId\""));
    }

    #[test]
    fn log_entry_round_trip() {
        let entry = SyncLogEntry {
            id: 5,
            external_id: "ext-001".to_string(),
            profile_id: Some(42),
            sync_type: SyncType::Update,
            sync_status: ProfileSyncStatus::Success,
            error_message: None,
            duration_ms: 87,
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: SyncLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn overview_serializes_expected_keys() {
        let overview = SyncOverview {
            total_synced_users: 10,
            successful_syncs: 9,
            failed_syncs: 1,
            last_sync: Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()),
            recent_logs: vec![],
        };
        let json = serde_json::to_string(&overview).unwrap();
        assert!(json.contains("\"totalSyncedUsers\""));
        assert!(json.contains("\"successfulSyncs\""));
        assert!(json.contains("\"failedSyncs\""));
        assert!(json.contains("\"lastSync\""));
        assert!(json.contains("\"recentLogs\""));
    }
}
