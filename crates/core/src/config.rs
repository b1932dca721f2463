//! TOML-based configuration system for Agora.

use crate::error::{AgoraError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level Agora configuration, deserialized from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgoraConfig {
    pub agora: AgoraSection,
    #[serde(default)]
    pub idp: IdpConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Core instance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgoraSection {
    pub instance_name: String,
    pub data_dir: String,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path.
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "/var/lib/agora/agora.db".into()
}

/// Identity provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdpConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub service_key: String,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for IdpConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            service_key: String::new(),
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u64 {
    200
}

/// Admin gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

/// Fixed-window rate limit settings for the admin endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Per-window allowance for sync triggers.
    #[serde(default = "default_sync_limit")]
    pub sync_limit: u32,
    /// Per-window allowance for status reads.
    #[serde(default = "default_status_limit")]
    pub status_limit: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            sync_limit: default_sync_limit(),
            status_limit: default_status_limit(),
        }
    }
}

fn default_window_secs() -> u64 {
    60
}

fn default_sync_limit() -> u32 {
    5
}

fn default_status_limit() -> u32 {
    60
}

impl AgoraConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| AgoraError::Config(format!("failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Validate the configuration, returning an error for invalid combinations.
    pub fn validate(&self) -> Result<()> {
        if self.agora.instance_name.is_empty() {
            return Err(AgoraError::Config("agora.instance_name must not be empty".into()));
        }
        if self.agora.data_dir.is_empty() {
            return Err(AgoraError::Config("agora.data_dir must not be empty".into()));
        }
        if self.agora.database.path.is_empty() {
            return Err(AgoraError::Config("agora.database.path must not be empty".into()));
        }
        if self.idp.base_url.is_empty() {
            return Err(AgoraError::Config("idp.base_url is required".into()));
        }
        if self.idp.service_key.is_empty() {
            return Err(AgoraError::Config("idp.service_key is required".into()));
        }
        if self.idp.page_size == 0 {
            return Err(AgoraError::Config("idp.page_size must be positive".into()));
        }
        if self.server.rate_limit.window_secs == 0 {
            return Err(AgoraError::Config(
                "server.rate_limit.window_secs must be positive".into(),
            ));
        }
        if self.server.rate_limit.sync_limit == 0 || self.server.rate_limit.status_limit == 0 {
            return Err(AgoraError::Config("rate limit allowances must be positive".into()));
        }
        Ok(())
    }

    /// Generate a sensible default configuration.
    pub fn generate_default() -> Self {
        Self {
            agora: AgoraSection {
                instance_name: "Agora Community".into(),
                data_dir: "/var/lib/agora".into(),
                database: DatabaseConfig::default(),
            },
            idp: IdpConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TOML: &str = r#"
[agora]
instance_name = "Riverside Commons"
data_dir = "/var/lib/agora"

[agora.database]
path = "/var/lib/agora/agora.db"

[idp]
base_url = "https://idp.riverside.example.org"
service_key = "svc-key-123"
page_size = 100

[server]
port = 9090

[server.rate_limit]
window_secs = 30
sync_limit = 2
status_limit = 20
"#;

    fn parse_sample() -> AgoraConfig {
        toml::from_str(SAMPLE_TOML).expect("sample TOML should parse")
    }

    #[test]
    fn parse_full_config() {
        let cfg = parse_sample();
        assert_eq!(cfg.agora.instance_name, "Riverside Commons");
        assert_eq!(cfg.agora.database.path, "/var/lib/agora/agora.db");
        assert_eq!(cfg.idp.page_size, 100);
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.rate_limit.window_secs, 30);
        assert_eq!(cfg.server.rate_limit.sync_limit, 2);
        assert_eq!(cfg.server.rate_limit.status_limit, 20);
        cfg.validate().unwrap();
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg: AgoraConfig = toml::from_str(
            r#"
[agora]
instance_name = "Agora"
data_dir = "/tmp/agora"

[idp]
base_url = "https://idp.example.org"
service_key = "k"
"#,
        )
        .unwrap();

        assert_eq!(cfg.idp.page_size, 200);
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.rate_limit.window_secs, 60);
        assert_eq!(cfg.server.rate_limit.sync_limit, 5);
        assert_eq!(cfg.server.rate_limit.status_limit, 60);
        cfg.validate().unwrap();
    }

    #[test]
    fn validate_rejects_missing_idp() {
        let cfg: AgoraConfig = toml::from_str(
            r#"
[agora]
instance_name = "Agora"
data_dir = "/tmp/agora"
"#,
        )
        .unwrap();

        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("idp.base_url"));
    }

    #[test]
    fn validate_rejects_zero_window() {
        let mut cfg = parse_sample();
        cfg.server.rate_limit.window_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn generated_default_round_trips() {
        let cfg = AgoraConfig::generate_default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let back: AgoraConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.agora.instance_name, cfg.agora.instance_name);
        assert_eq!(back.server.rate_limit.sync_limit, 5);
    }
}
