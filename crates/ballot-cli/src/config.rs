//! CLI configuration management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Default RPC endpoint
    pub rpc_url: String,
    /// Voter id used as the caller when `--from` is omitted
    pub default_voter: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            default_voter: None,
        }
    }
}

impl CliConfig {
    /// Load configuration from `~/.ballot/config.toml`, writing defaults on first use.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: CliConfig = toml::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("Failed to parse '{}': {}", path.display(), e))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

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
        Ok(home.join(".ballot").join("config.toml"))
    }

    /// Set a key by name.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "rpc_url" => self.rpc_url = value.to_string(),
            "default_voter" => {
                self.default_voter = if value.is_empty() { None } else { Some(value.to_string()) }
            }
            other => anyhow::bail!("Unknown config key '{}'", other),
        }
        Ok(())
    }

    /// Read a key by name.
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "rpc_url" => Ok(self.rpc_url.clone()),
            "default_voter" => Ok(self.default_voter.clone().unwrap_or_default()),
            other => anyhow::bail!("Unknown config key '{}'", other),
        }
    }
}
