use tracing::{info, warn};

use agora_core::db::repository::ProfileStore;
use agora_core::error::Result;
use agora_core::idp::IdentityProvider;
use agora_core::models::sync::SyncReport;

use crate::reconcile::Reconciler;

/// Engine that orchestrates a full reconciliation run from an identity
/// provider into the profile store.
pub struct SyncEngine<R: ProfileStore> {
    reconciler: Reconciler<R>,
}

impl<R: ProfileStore> SyncEngine<R> {
    pub fn new(store: R) -> Self {
        Self {
            reconciler: Reconciler::new(store),
        }
    }

    pub fn store(&self) -> &R {
        self.reconciler.store()
    }

    /// Run a full sync: list every account and reconcile each in turn.
    ///
    /// A listing failure aborts the run before any account is touched.
    /// Per-account failures are recorded in the report and never stop the
    /// batch.
    pub async fn sync_all(&self, provider: &dyn IdentityProvider) -> Result<SyncReport> {
        let provider_name = provider.provider_name().to_string();
        info!(provider = %provider_name, "Starting sync run");

        let accounts = provider.list_accounts().await?;
        info!(provider = %provider_name, count = accounts.len(), "Fetched account listing");

        let mut report = SyncReport::default();
        for account in &accounts {
            let outcome = self.reconciler.reconcile(account).await;
            report.record(&outcome);
        }

        if report.failed > 0 {
            warn!(
                provider = %provider_name,
                total = report.total,
                successful = report.successful,
                failed = report.failed,
                "Sync run completed with failures"
            );
        } else {
            info!(
                provider = %provider_name,
                total = report.total,
                created = report.created,
                updated = report.updated,
                "Sync run completed"
            );
        }

        Ok(report)
    }
}
