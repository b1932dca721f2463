use std::time::Instant;

use agora_core::idp::client::HttpIdpClient;
use agora_sync::SyncEngine;
use tracing::{error, info};

use super::{load_config, open_store};

/// Run the `sync` command: reconcile every IdP account into the profile
/// store and print the report.
pub async fn run(config_path: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    info!("Loaded configuration from {}", config_path);

    let store = open_store(&config).await?;
    let provider = HttpIdpClient::new(
        &config.idp.base_url,
        &config.idp.service_key,
        config.idp.page_size,
    );

    println!("Starting sync from {}...", config.idp.base_url);
    let start = Instant::now();

    let engine = SyncEngine::new(store);
    match engine.sync_all(&provider).await {
        Ok(report) => {
            let duration = start.elapsed();
            println!(
                "Sync completed in {:.1}s",
                duration.as_secs_f64()
            );
            println!("  Accounts:   {}", report.total);
            println!("  Created:    {}", report.created);
            println!("  Updated:    {}", report.updated);
            println!("  Failed:     {}", report.failed);
            if !report.errors.is_empty() {
                println!();
                println!("Failures:");
                for failure in &report.errors {
                    let email = failure.email.as_deref().unwrap_or("-");
                    println!("  {} ({}): {}", failure.external_id, email, failure.error);
                }
            }
        }
        Err(e) => {
            error!("Sync failed: {e}");
            println!("Sync failed: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}
