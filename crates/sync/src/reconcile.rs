use std::time::Instant;

use tracing::{debug, warn};

use agora_core::db::repository::ProfileStore;
use agora_core::error::Result;
use agora_core::models::account::IdpAccount;
use agora_core::models::profile::{Profile, ProfileSyncStatus, ProfileUpsert};
use agora_core::models::sync::{NewSyncLogEntry, SyncOutcome, SyncType};

/// Reconciles a single IdP account against the profile store.
///
/// `reconcile` never returns an error; every failure mode is folded into the
/// returned `SyncOutcome` so a batch run can keep going.
pub struct Reconciler<R: ProfileStore> {
    store: R,
}

impl<R: ProfileStore> Reconciler<R> {
    pub fn new(store: R) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    pub async fn reconcile(&self, account: &IdpAccount) -> SyncOutcome {
        let started = Instant::now();
        let (sync_type, known_profile_id, result) = self.apply(account).await;

        let (profile_id, error) = match &result {
            Ok(profile) => (Some(profile.id), None),
            // A failed update still belongs to the row we looked up.
            Err(e) => (known_profile_id, Some(e.to_string())),
        };
        let sync_status = if error.is_none() {
            ProfileSyncStatus::Success
        } else {
            ProfileSyncStatus::Error
        };

        if let Some(ref message) = error {
            warn!(external_id = %account.id, error = %message, "Reconcile failed");
            // Best effort; the row may not exist yet.
            if let Err(e) = self
                .store
                .mark_profile_sync_status(&account.id, ProfileSyncStatus::Error)
                .await
            {
                warn!(external_id = %account.id, error = %e, "Could not mark profile sync status");
            }
        }

        // Elapsed time covers everything up to the log append itself.
        let duration_ms = started.elapsed().as_millis() as i64;
        if error.is_none() {
            debug!(external_id = %account.id, sync_type = sync_type.as_str(), duration_ms, "Reconciled account");
        }

        // Exactly one log row per reconcile. A failed write must not change
        // the outcome we already computed.
        let entry = NewSyncLogEntry {
            external_id: account.id.clone(),
            profile_id,
            sync_type,
            sync_status,
            error_message: error.clone(),
            duration_ms,
        };
        if let Err(e) = self.store.append_sync_log(&entry).await {
            warn!(external_id = %account.id, error = %e, "Failed to append sync log entry");
        }

        SyncOutcome {
            external_id: account.id.clone(),
            email: account.email.clone(),
            profile_id,
            sync_type,
            sync_status,
            error,
            duration_ms,
        }
    }

    /// Look up, then create or refresh. A lookup error short-circuits; it is
    /// never treated as "not found". The middle element is the profile id
    /// known before the write, so error outcomes stay correlated to their row.
    async fn apply(&self, account: &IdpAccount) -> (SyncType, Option<i64>, Result<Profile>) {
        match self.store.find_profile_by_external_id(&account.id).await {
            Err(e) => (SyncType::Create, None, Err(e)),
            Ok(None) => {
                let upsert = ProfileUpsert::for_new_account(account);
                let result = async {
                    let profile = self.store.upsert_profile(&upsert).await?;
                    self.store.upsert_mapping(&account.id, profile.id).await?;
                    Ok(profile)
                }
                .await;
                (SyncType::Create, None, result)
            }
            Ok(Some(existing)) => {
                let upsert = ProfileUpsert::for_existing_profile(account, &existing);
                (
                    SyncType::Update,
                    Some(existing.id),
                    self.store.upsert_profile(&upsert).await,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_support::{sample_account, setup_store, FlakyStore};
    use agora_core::db::repository::{MappingRepository, ProfileRepository, SyncLogRepository};
    use agora_core::models::profile::Role;

    #[tokio::test]
    async fn first_sight_creates_profile_and_mapping() {
        let store = setup_store().await;
        let reconciler = Reconciler::new(store.clone());

        let outcome = reconciler.reconcile(&sample_account("ext-001")).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.sync_type, SyncType::Create);
        let profile_id = outcome.profile_id.unwrap();

        let profile = store
            .find_profile_by_external_id("ext-001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.id, profile_id);
        assert_eq!(profile.role, Role::User);

        let mapping = store.get_mapping("ext-001").await.unwrap().unwrap();
        assert_eq!(mapping.profile_id, profile_id);
    }

    #[tokio::test]
    async fn resync_updates_in_place() {
        let store = setup_store().await;
        let reconciler = Reconciler::new(store.clone());

        let first = reconciler.reconcile(&sample_account("ext-001")).await;
        let mut changed = sample_account("ext-001");
        changed.display_name = "Renamed User".to_string();
        let second = reconciler.reconcile(&changed).await;

        assert!(second.is_success());
        assert_eq!(second.sync_type, SyncType::Update);
        assert_eq!(second.profile_id, first.profile_id);

        let profile = store
            .find_profile_by_external_id("ext-001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.full_name, "Renamed User");
    }

    #[tokio::test]
    async fn resync_preserves_promoted_role() {
        let store = setup_store().await;
        let reconciler = Reconciler::new(store.clone());

        reconciler.reconcile(&sample_account("ext-001")).await;
        store.set_profile_role("ext-001", Role::Admin).await.unwrap();

        reconciler.reconcile(&sample_account("ext-001")).await;

        let profile = store
            .find_profile_by_external_id("ext-001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.role, Role::Admin);
    }

    #[tokio::test]
    async fn every_reconcile_appends_exactly_one_log_entry() {
        let store = setup_store().await;
        let reconciler = Reconciler::new(store.clone());

        reconciler.reconcile(&sample_account("ext-001")).await;
        reconciler.reconcile(&sample_account("ext-001")).await;

        let logs = store.list_recent_sync_logs(10).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].sync_type, SyncType::Update);
        assert_eq!(logs[1].sync_type, SyncType::Create);
        assert!(logs.iter().all(|l| l.duration_ms >= 0));
    }

    #[tokio::test]
    async fn lookup_failure_never_creates_a_profile() {
        let store = setup_store().await;
        let mut flaky = FlakyStore::new(store.clone());
        flaky.fail_lookup = true;
        let reconciler = Reconciler::new(flaky);

        let outcome = reconciler.reconcile(&sample_account("ext-001")).await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.profile_id, None);
        assert!(store
            .find_profile_by_external_id("ext-001")
            .await
            .unwrap()
            .is_none());
        assert!(store.get_mapping("ext-001").await.unwrap().is_none());

        // The failure is still on the record.
        let logs = store.list_recent_sync_logs(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].sync_status, ProfileSyncStatus::Error);
    }

    #[tokio::test]
    async fn upsert_failure_yields_error_outcome_and_log() {
        let store = setup_store().await;
        let mut flaky = FlakyStore::new(store.clone());
        flaky.fail_upsert = true;
        let reconciler = Reconciler::new(flaky);

        let outcome = reconciler.reconcile(&sample_account("ext-001")).await;

        assert!(!outcome.is_success());
        assert!(outcome.error.is_some());
        assert_eq!(outcome.sync_type, SyncType::Create);

        let logs = store.list_recent_sync_logs(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].sync_status, ProfileSyncStatus::Error);
        assert!(logs[0].error_message.is_some());
    }

    #[tokio::test]
    async fn failed_log_write_does_not_change_outcome() {
        let store = setup_store().await;
        let mut flaky = FlakyStore::new(store.clone());
        flaky.fail_log = true;
        let reconciler = Reconciler::new(flaky);

        let outcome = reconciler.reconcile(&sample_account("ext-001")).await;

        assert!(outcome.is_success());
        assert!(outcome.profile_id.is_some());
        assert!(store.list_recent_sync_logs(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_update_keeps_profile_id_on_outcome_and_log() {
        let store = setup_store().await;
        let first = Reconciler::new(store.clone())
            .reconcile(&sample_account("ext-001"))
            .await;
        assert!(first.is_success());

        let mut flaky = FlakyStore::new(store.clone());
        flaky.fail_upsert = true;
        let outcome = Reconciler::new(flaky)
            .reconcile(&sample_account("ext-001"))
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.sync_type, SyncType::Update);
        assert_eq!(outcome.profile_id, first.profile_id);

        let logs = store.list_recent_sync_logs(10).await.unwrap();
        assert_eq!(logs[0].sync_status, ProfileSyncStatus::Error);
        assert_eq!(logs[0].profile_id, first.profile_id);
    }

    #[tokio::test]
    async fn failed_update_marks_profile_status() {
        let store = setup_store().await;
        let reconciler = Reconciler::new(store.clone());
        reconciler.reconcile(&sample_account("ext-001")).await;

        let mut flaky = FlakyStore::new(store.clone());
        flaky.fail_upsert = true;
        let flaky_reconciler = Reconciler::new(flaky);
        flaky_reconciler.reconcile(&sample_account("ext-001")).await;

        let profile = store
            .find_profile_by_external_id("ext-001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.sync_status, ProfileSyncStatus::Error);
    }
}
