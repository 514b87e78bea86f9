//! Node configuration.
//!
//! Handles loading and validation of node configuration from
//! config files and command-line arguments.

use ballot_ledger::{LateDelegation, LedgerConfig};
use ballot_types::VoterId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Node name
    pub name: String,
    /// Ledger configuration
    pub ledger: LedgerSection,
    /// RPC configuration
    pub rpc: RpcConfig,
    /// Storage configuration
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "ballot-node".to_string(),
            ledger: LedgerSection::default(),
            rpc: RpcConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn reject_traversal(path: &Path) -> anyhow::Result<()> {
    if path.to_string_lossy().contains("..") {
        anyhow::bail!("Invalid path: directory traversal detected");
    }
    Ok(())
}

impl NodeConfig {
    /// Load configuration from file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        reject_traversal(path)?;

        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: NodeConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn to_file(&self, path: &Path) -> anyhow::Result<()> {
        reject_traversal(path)?;

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write config file '{}': {}", path.display(), e))?;
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ledger.proposals.is_empty() {
            anyhow::bail!("At least one proposal must be configured");
        }
        if self.ledger.proposals.iter().any(|p| p.trim().is_empty()) {
            anyhow::bail!("Proposal names cannot be empty");
        }

        let mut seen = HashSet::new();
        for voter in &self.ledger.voters {
            if !seen.insert(voter.id) {
                anyhow::bail!("Duplicate seed voter {}", voter.id);
            }
        }

        if self.rpc.enabled && self.rpc.http_addr.port() == 0 {
            anyhow::bail!("RPC HTTP port cannot be 0");
        }
        if self.rpc.max_body_size == 0 {
            anyhow::bail!("RPC max body size cannot be 0");
        }

        if self.storage.enabled {
            reject_traversal(&self.storage.data_dir)?;
        }
        if let Some(log_file) = &self.logging.log_file {
            reject_traversal(log_file)?;
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => anyhow::bail!("Unknown log format '{}' (expected pretty or json)", other),
        }
    }
}

/// Ledger configuration: the fixed proposal list, policy and seed voters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    /// Proposal names, in index order
    pub proposals: Vec<String>,
    /// What happens when a voter delegates to someone who already voted
    #[serde(default)]
    pub late_delegation: LateDelegation,
    /// Voters registered on a fresh command log
    #[serde(default)]
    pub voters: Vec<SeedVoter>,
}

impl LedgerSection {
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig { late_delegation: self.late_delegation }
    }
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            proposals: vec!["Yes".to_string(), "No".to_string()],
            late_delegation: LateDelegation::default(),
            voters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedVoter {
    pub id: VoterId,
    #[serde(default)]
    pub name: String,
}

/// RPC configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Enable HTTP RPC
    pub enabled: bool,
    /// HTTP RPC address
    pub http_addr: SocketAddr,
    /// Enable CORS
    pub cors: bool,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            http_addr: SocketAddr::from(([127, 0, 0, 1], 8545)),
            cors: true,
            max_body_size: 1024 * 1024,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Journal commands to disk
    pub enabled: bool,
    /// Directory holding the command log
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log to file
    pub log_file: Option<PathBuf>,
    /// Log format (json|pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_file: None,
            format: "pretty".to_string(),
        }
    }
}
