//! CLI configuration management.
//!
//! Settings live in `~/.stakeleaf/config.toml`; a missing file is written
//! out with defaults on first load.

use serde::{Deserialize, Serialize};
use stakeleaf_crypto::KdfParams;
use stakeleaf_types::NetworkId;
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = ".stakeleaf";
const CONFIG_FILE: &str = "config.toml";

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Default network id (0 testnet, 1 mainnet)
    pub network: NetworkId,
    /// Default account index
    pub account: u32,
    /// Addresses listed per chain
    pub address_count: u32,
    /// Keystore directory
    pub keystore_dir: PathBuf,
    /// Log filter used when RUST_LOG is unset
    pub log_level: String,
    /// Argon2 cost for new keystore files
    pub kdf: KdfParams,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            network: NetworkId::MAINNET,
            account: 0,
            address_count: 5,
            keystore_dir: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(CONFIG_DIR)
                .join("keystore"),
            log_level: "warn".to_string(),
            kdf: KdfParams::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from the default location.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, creating it with defaults if missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: CliConfig = toml::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get configuration file path.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Get keystore directory.
    pub fn keystore_path(&self) -> &Path {
        &self.keystore_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.network, NetworkId::MAINNET);
        assert_eq!(config.account, 0);
        assert_eq!(config.address_count, 5);
        assert_eq!(config.kdf, KdfParams::default());
        assert!(config.keystore_dir.ends_with(".stakeleaf/keystore"));
    }

    #[test]
    fn test_missing_file_is_created() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = CliConfig::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = CliConfig {
            network: NetworkId::TESTNET,
            account: 3,
            address_count: 12,
            keystore_dir: dir.path().join("keys"),
            log_level: "debug".to_string(),
            kdf: KdfParams::insecure_fast(),
        };
        config.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("address_count = 12"));

        assert_eq!(CliConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "network = 0\naccount = 2\n").unwrap();

        let config = CliConfig::load_from(&path).unwrap();
        assert_eq!(config.network, NetworkId::TESTNET);
        assert_eq!(config.account, 2);
        assert_eq!(config.address_count, 5);
    }

    #[test]
    fn test_invalid_network_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "network = 99\n").unwrap();

        assert!(CliConfig::load_from(&path).is_err());
    }
}
