//! Configuration module for the API gateway

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Main application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Database configuration for the PostgreSQL key store
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Empty means the in-memory key store is used (development only)
    pub url: String,
    pub max_connections: Option<u32>,
    /// Hosted Postgres providers reject plaintext connections
    pub require_tls: bool,
}

/// API key issuance and admission settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Literal prefix that makes issued keys recognizable in logs
    pub key_prefix: String,
    /// Requests per trailing hour granted to newly issued keys
    pub default_rate_limit: i32,
    /// How often idle rate windows are evicted
    pub sweep_interval_secs: u64,
    /// Token required by the key management endpoints; unset disables them
    pub admin_token: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            url: String::new(),
            max_connections: Some(10),
            require_tls: false,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            key_prefix: "viq_".to_string(),
            default_rate_limit: 1000,
            sweep_interval_secs: 300,
            admin_token: None,
        }
    }
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with VOYAGRIQ_)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        Self::load_from(config_dir)
    }

    pub fn load_from(config_dir: PathBuf) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // VOYAGRIQ_DATABASE__URL, VOYAGRIQ_AUTH__ADMIN_TOKEN, etc.
            .add_source(
                Environment::with_prefix("VOYAGRIQ")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
            );

        builder.build()?.try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server: ServerSettings::default(),
            database: DatabaseSettings::default(),
            auth: AuthSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080");
        assert!(settings.database.url.is_empty());
        assert_eq!(settings.auth.key_prefix, "viq_");
        assert_eq!(settings.auth.default_rate_limit, 1000);
        assert!(settings.auth.admin_token.is_none());
    }

    #[test]
    fn test_missing_config_dir_falls_back_to_defaults() {
        let settings = Settings::load_from(PathBuf::from("/nonexistent/voyagriq-config"))
            .expect("defaults should deserialize");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.auth.sweep_interval_secs, 300);
    }

    #[test]
    fn test_env_overrides_default_toml() {
        let config_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config");

        std::env::set_var("VOYAGRIQ_AUTH__DEFAULT_RATE_LIMIT", "25");
        std::env::set_var("VOYAGRIQ_AUTH__ADMIN_TOKEN", "from-env");
        let loaded = Settings::load_from(config_dir);
        std::env::remove_var("VOYAGRIQ_AUTH__DEFAULT_RATE_LIMIT");
        std::env::remove_var("VOYAGRIQ_AUTH__ADMIN_TOKEN");

        let settings = loaded.expect("config should load");
        assert_eq!(settings.auth.default_rate_limit, 25);
        assert_eq!(settings.auth.admin_token.as_deref(), Some("from-env"));
        // Untouched keys still come from default.toml
        assert_eq!(settings.auth.key_prefix, "viq_");
        assert_eq!(settings.auth.sweep_interval_secs, 300);
    }
}
