use chrono::{Duration, Utc};
use rand::Rng;
use tracing::info;

use agora_core::db::repository::ApiTokenRepository;
use agora_core::models::token::ApiToken;

use super::{load_config, open_store};

/// Generate a random API token (64 hex characters).
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    (0..32)
        .map(|_| format!("{:02x}", rng.gen::<u8>()))
        .collect()
}

/// Run the `token` command: mint an admin API token for the given profile.
pub async fn run(
    config_path: &str,
    external_id: &str,
    expires_days: Option<i64>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(&config).await?;

    let token = ApiToken {
        token: generate_token(),
        external_id: external_id.to_string(),
        created_at: Utc::now(),
        expires_at: expires_days.map(|days| Utc::now() + Duration::days(days)),
    };
    store.create_api_token(&token).await?;
    info!(external_id, "Minted API token");

    println!("API token for {}:", external_id);
    println!();
    println!("  {}", token.token);
    println!();
    match token.expires_at {
        Some(at) => println!("Expires: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Expires: never"),
    }
    println!("Store it now; it will not be shown again.");

    Ok(())
}
