use anyhow::bail;
use tracing::info;

use agora_core::db::repository::ProfileRepository;
use agora_core::models::profile::Role;

use super::{load_config, open_store};

/// Run the `promote` command: change a profile's role out of band.
///
/// Role changes made here survive subsequent syncs; the sync path never
/// writes the role column for existing profiles.
pub async fn run(config_path: &str, external_id: &str, role: &str) -> anyhow::Result<()> {
    let Some(role) = Role::parse(role) else {
        bail!("unknown role '{}' (expected user, moderator, or admin)", role);
    };

    let config = load_config(config_path)?;
    let store = open_store(&config).await?;

    if !store.set_profile_role(external_id, role).await? {
        bail!("no profile found for external id '{}'", external_id);
    }

    info!(external_id, role = role.as_str(), "Updated profile role");
    println!("{} is now {}", external_id, role.as_str());
    Ok(())
}
