//! Configuration for the registry binary
//!
//! Sources, later ones overriding earlier ones:
//! - built-in defaults
//! - `sports-registry.toml` in the working directory (optional)
//! - an explicit `--config` file (required when given)
//! - environment variables prefixed `SPORTS_REGISTRY__`, e.g.
//!   `SPORTS_REGISTRY__DATA_DIR=/srv/registry`
//!
//! ## Example config file
//! ```toml
//! data_dir = "archivos"
//! log_level = "debug"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "sports-registry";
const ENV_PREFIX: &str = "SPORTS_REGISTRY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Directory holding one CSV store per entity kind
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Fallback log filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("archivos")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl RegistryConfig {
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder =
            Config::builder().add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("archivos"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "data_dir = \"/srv/registry\"\n").unwrap();

        let config = RegistryConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/registry"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(RegistryConfig::load_from(Some(&path)).is_err());
    }
}
