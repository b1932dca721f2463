pub mod init;
pub mod promote;
pub mod serve;
pub mod status;
pub mod sync;
pub mod token;

use std::path::Path;

use agora_core::config::AgoraConfig;
use agora_core::db::sqlite::SqliteStore;
use agora_core::db::DatabasePool;

/// Load and validate the configuration file.
pub(crate) fn load_config(config_path: &str) -> anyhow::Result<AgoraConfig> {
    let config = AgoraConfig::load(Path::new(config_path))?;
    config.validate()?;
    Ok(config)
}

/// Open the configured SQLite store, creating the file if needed.
pub(crate) async fn open_store(config: &AgoraConfig) -> anyhow::Result<SqliteStore> {
    let connect_str = format!("sqlite:{}?mode=rwc", config.agora.database.path);
    let pool = DatabasePool::new_sqlite(&connect_str).await?;
    let DatabasePool::Sqlite(sqlite_pool) = pool;
    Ok(SqliteStore::new(sqlite_pool))
}
