use std::path::Path;

use agora_core::config::AgoraConfig;
use agora_core::db::DatabasePool;
use tracing::info;

/// Run the `init` command: create the data directory, write a default
/// config, and set up the database.
pub async fn run(data_dir: &str) -> anyhow::Result<()> {
    let data_path = Path::new(data_dir);

    if !data_path.exists() {
        std::fs::create_dir_all(data_path)?;
        info!("Created data directory: {}", data_dir);
    }

    let db_path = data_path.join("agora.db");
    let db_path_str = db_path.to_string_lossy().to_string();

    let mut config = AgoraConfig::generate_default();
    config.agora.data_dir = data_dir.to_string();
    config.agora.database.path = db_path_str.clone();

    let config_path = data_path.join("agora.toml");
    let toml_str = toml::to_string_pretty(&config)?;
    std::fs::write(&config_path, &toml_str)?;
    info!("Wrote configuration to {}", config_path.display());

    let connect_str = format!("sqlite:{}?mode=rwc", db_path_str);
    DatabasePool::new_sqlite(&connect_str).await?;
    info!("Database initialized at {}", db_path_str);

    println!("Agora initialized successfully!");
    println!("  Data directory: {}", data_dir);
    println!("  Configuration: {}", config_path.display());
    println!("  Database:      {}", db_path_str);
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit {} with your IdP base URL and service key",
        config_path.display()
    );
    println!("  2. Run `agora sync` to perform the first sync");
    println!("  3. Run `agora token --external-id <id>` to mint an admin API token");

    Ok(())
}
