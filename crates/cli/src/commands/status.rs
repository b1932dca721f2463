use agora_core::db::repository::{ProfileRepository, SyncLogRepository};
use agora_core::models::profile::ProfileSyncStatus;
use tracing::info;

use super::{load_config, open_store};

/// Run the `status` command: show sync statistics and recent log entries.
pub async fn run(config_path: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    info!("Loaded configuration from {}", config_path);

    let store = open_store(&config).await?;

    println!("Agora Status");
    println!("============");
    println!("Instance: {}", config.agora.instance_name);
    println!("Database: {}", config.agora.database.path);
    println!();

    let counts = store.profile_sync_counts().await?;
    println!("Profiles");
    println!("--------");
    println!("Total:      {}", counts.total);
    println!("Successful: {}", counts.successful);
    println!("Failed:     {}", counts.failed);
    println!();

    match store.latest_sync_at().await? {
        Some(at) => println!("Last sync: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Last sync: never"),
    }
    println!();

    let logs = store.list_recent_sync_logs(10).await?;
    if logs.is_empty() {
        println!("No sync log entries recorded.");
    } else {
        println!("Recent sync log");
        println!("---------------");
        for entry in &logs {
            let status = match entry.sync_status {
                ProfileSyncStatus::Success => "ok",
                ProfileSyncStatus::Error => "ERR",
            };
            let detail = entry.error_message.as_deref().unwrap_or("");
            println!(
                "{} {:>4} {:<7} {} {}",
                entry.created_at.format("%Y-%m-%d %H:%M:%S"),
                status,
                entry.sync_type.as_str(),
                entry.external_id,
                detail
            );
        }
    }

    Ok(())
}
