pub mod client;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::account::IdpAccount;

/// Trait for identity provider implementations.
///
/// `list_accounts` returns the full account population in one call; batch
/// orchestration treats its failure as fatal for the run.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn list_accounts(&self) -> Result<Vec<IdpAccount>>;
    fn provider_name(&self) -> &str;
}
