use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

/// Bounds applied to posted blog records.
///
/// The 3..=5 title range mirrors the legacy service; it looks like a
/// placeholder value, so it is kept configurable rather than hardcoded.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_title_min")]
    pub title_min: usize,
    #[serde(default = "default_title_max")]
    pub title_max: usize,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_max_upload_bytes() -> u64 {
    1024 * 1024 // 1MB
}

fn default_title_min() -> usize {
    3
}

fn default_title_max() -> usize {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            title_min: default_title_min(),
            title_max: default_title_max(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;
        Ok(config)
    }

    /// Load configuration from config.toml if present
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["config.toml", "data/config.toml"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: QP_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(val) = env::var("QP_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("QP_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }

        // Storage overrides
        if let Ok(val) = env::var("QP_CONF_STORAGE_UPLOAD_DIR") {
            self.storage.upload_dir = val;
        }
        if let Ok(val) = env::var("QP_CONF_STORAGE_MAX_UPLOAD_BYTES") {
            if let Ok(bytes) = val.parse() {
                self.storage.max_upload_bytes = bytes;
            }
        }

        // Validation overrides
        if let Ok(val) = env::var("QP_CONF_VALIDATION_TITLE_MIN") {
            if let Ok(min) = val.parse() {
                self.validation.title_min = min;
            }
        }
        if let Ok(val) = env::var("QP_CONF_VALIDATION_TITLE_MAX") {
            if let Ok(max) = val.parse() {
                self.validation.title_max = max;
            }
        }
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.storage.upload_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_legacy_service() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.storage.max_upload_bytes, 1024 * 1024);
        assert_eq!(config.validation.title_min, 3);
        assert_eq!(config.validation.title_max, 5);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            upload_dir = "incoming"

            [validation]
            title_max = 80
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.upload_dir, "incoming");
        assert_eq!(config.validation.title_max, 80);
        // Unspecified keys keep their defaults
        assert_eq!(config.validation.title_min, 3);
        assert_eq!(config.server.port, 8000);
    }
}
