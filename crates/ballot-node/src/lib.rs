//! Ballot Node - runs the voting ledger behind a JSON-RPC endpoint.
//!
//! Ties together the command log, the ledger service and the RPC server.

pub mod config;
pub mod node;
pub mod telemetry;

pub use config::NodeConfig;
pub use node::{BallotNode, NodeState};
