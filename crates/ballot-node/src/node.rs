//! Node wiring: storage, ledger service and RPC server.

use std::net::SocketAddr;
use std::sync::Arc;

use ballot_ledger::{LedgerError, LedgerService, ServiceError};
use ballot_rpc::{RpcServer, RpcServerConfig};
use ballot_storage::{CommandLog, FileStore};
use tracing::{info, warn};

use crate::config::NodeConfig;

/// Node state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Initializing,
    Running,
    ShuttingDown,
    Stopped,
}

/// A ballot node.
pub struct BallotNode {
    pub config: NodeConfig,
    pub state: NodeState,
    service: Arc<LedgerService>,
    rpc_server: Option<RpcServer>,
}

impl BallotNode {
    /// Open the ledger (replaying the command log when storage is enabled)
    /// and register the configured seed voters that are not yet known.
    pub fn new(config: NodeConfig) -> anyhow::Result<Self> {
        info!("Initializing ballot node: {}", config.name);
        let ledger_config = config.ledger.ledger_config();
        let proposals = config.ledger.proposals.clone();

        let service = if config.storage.enabled {
            std::fs::create_dir_all(&config.storage.data_dir).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create data dir '{}': {}",
                    config.storage.data_dir.display(),
                    e
                )
            })?;
            let store = Arc::new(FileStore::open(&config.storage.data_dir)?);
            let log = CommandLog::open(store)?;
            LedgerService::open(log, proposals, ledger_config)?
        } else {
            warn!("Storage disabled; ledger state is lost on shutdown");
            LedgerService::in_memory(proposals, ledger_config)?
        };

        let mut seeded = 0;
        for voter in &config.ledger.voters {
            match service.register(voter.id, voter.name.clone()) {
                Ok(()) => seeded += 1,
                Err(ServiceError::Ledger(LedgerError::AlreadyRegistered(_))) => {}
                Err(e) => return Err(e.into()),
            }
        }
        if seeded > 0 {
            info!("Registered {} seed voters", seeded);
        }

        info!(
            "Ledger ready: {} voters, {} proposals",
            service.voter_count(),
            service.proposals().len()
        );

        Ok(Self {
            config,
            state: NodeState::Initializing,
            service: Arc::new(service),
            rpc_server: None,
        })
    }

    pub fn service(&self) -> Arc<LedgerService> {
        self.service.clone()
    }

    /// Start the RPC server if enabled.
    pub async fn start(&mut self) -> anyhow::Result<Option<SocketAddr>> {
        let mut bound = None;
        if self.config.rpc.enabled {
            let rpc_config = RpcServerConfig {
                http_addr: self.config.rpc.http_addr,
                cors: self.config.rpc.cors,
                max_body_size: self.config.rpc.max_body_size,
            };
            let mut server = RpcServer::new(rpc_config, self.service.clone());
            bound = Some(server.start().await?);
            self.rpc_server = Some(server);
        } else {
            info!("RPC disabled");
        }

        self.state = NodeState::Running;
        Ok(bound)
    }

    /// Block until ctrl-c, then shut down.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to listen for shutdown signal: {}", e))?;
        info!("Shutdown signal received");
        self.stop();
        Ok(())
    }

    pub fn stop(&mut self) {
        self.state = NodeState::ShuttingDown;
        if let Some(mut server) = self.rpc_server.take() {
            server.stop();
        }
        self.state = NodeState::Stopped;
        info!(
            "Node stopped: {} voters, winner {:?}",
            self.service.voter_count(),
            self.service.winner_name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedVoter;
    use ballot_types::VoterId;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> NodeConfig {
        let mut config = NodeConfig::default();
        config.storage.data_dir = dir.path().join("data");
        config.rpc.enabled = false;
        config.ledger.voters = vec![
            SeedVoter { id: VoterId::from_index(1), name: "alice".to_string() },
            SeedVoter { id: VoterId::from_index(2), name: "bob".to_string() },
        ];
        config
    }

    #[test]
    fn test_seed_voters_registered_once() {
        let dir = TempDir::new().unwrap();

        {
            let node = BallotNode::new(config(&dir)).unwrap();
            assert_eq!(node.service().voter_count(), 2);
            assert_eq!(node.service().journal_len(), Some(3));
        }

        // Reopening replays the log; seeds are already known
        let node = BallotNode::new(config(&dir)).unwrap();
        assert_eq!(node.service().voter_count(), 2);
        assert_eq!(node.service().journal_len(), Some(3));
    }

    #[test]
    fn test_in_memory_node() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.storage.enabled = false;

        let node = BallotNode::new(config).unwrap();
        assert_eq!(node.service().journal_len(), None);
        assert!(!dir.path().join("data").exists());
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.rpc.enabled = true;
        config.rpc.http_addr = SocketAddr::from(([127, 0, 0, 1], 0));

        let mut node = BallotNode::new(config).unwrap();
        let addr = node.start().await.unwrap();
        assert!(addr.is_some_and(|a| a.port() != 0));
        assert_eq!(node.state, NodeState::Running);

        node.stop();
        assert_eq!(node.state, NodeState::Stopped);
    }
}
