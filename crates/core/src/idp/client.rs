use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AgoraError, Result};
use crate::models::account::IdpAccount;

use super::IdentityProvider;

/// One page of the IdP admin accounts listing.
#[derive(Debug, Deserialize)]
struct AccountsPage {
    accounts: Vec<IdpAccount>,
}

/// HTTP client for the IdP admin API, authenticated with a service key.
pub struct HttpIdpClient {
    base_url: String,
    service_key: String,
    page_size: u64,
    http: Client,
}

impl HttpIdpClient {
    pub fn new(base_url: &str, service_key: &str, page_size: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            page_size,
            http: Client::new(),
        }
    }

    /// Point the client at a different base URL (useful for testing).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn fetch_page(&self, page: u64) -> Result<Vec<IdpAccount>> {
        let url = format!(
            "{}/admin/v1/accounts?page={page}&per_page={}",
            self.base_url, self.page_size
        );
        debug!(url = %url, "Fetching IdP account page");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(|e| AgoraError::UpstreamUnavailable(format!("IdP request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = %status, "IdP rejected service key");
            return Err(AgoraError::UpstreamAuthFailure(format!(
                "IdP rejected service credentials with status {status}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "IdP account listing failed");
            return Err(AgoraError::UpstreamUnavailable(format!(
                "IdP account listing failed with status {status}: {body}"
            )));
        }

        let page: AccountsPage = response.json().await.map_err(|e| {
            AgoraError::Serialization(format!("Failed to parse IdP account page: {e}"))
        })?;
        Ok(page.accounts)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdpClient {
    /// Walk the paginated listing until a short page ends it.
    async fn list_accounts(&self) -> Result<Vec<IdpAccount>> {
        let mut accounts = Vec::new();
        let mut page = 1u64;

        loop {
            let batch = self.fetch_page(page).await?;
            let batch_len = batch.len() as u64;
            accounts.extend(batch);

            if batch_len < self.page_size {
                debug!(page, total = accounts.len(), "IdP pagination complete");
                break;
            }
            page += 1;
        }

        Ok(accounts)
    }

    fn provider_name(&self) -> &str {
        "idp"
    }
}
