//! Ballot Ledger - Delegated voting state machine.
//!
//! This crate provides:
//! - Voter registration in insertion order
//! - Bounded resolution of delegation chains with cycle rejection
//! - Weighted tallying with a lowest-index tie-break
//! - A single-writer service that journals commands and replays them

pub mod error;
pub mod registry;
pub mod resolver;
pub mod ballot;
pub mod ledger;
pub mod command;
pub mod service;

pub use error::{LedgerError, ServiceError};
pub use registry::VoterRegistry;
pub use resolver::{DelegationResolver, EffectiveVoter, ResolveError};
pub use ballot::Ballot;
pub use ledger::{LateDelegation, LedgerConfig, VotingLedger};
pub use command::Command;
pub use service::LedgerService;
