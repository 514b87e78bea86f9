//! Ballot Types - Core type definitions for the Ballot voting ledger.
//!
//! This crate provides the plain data shared by the ledger, the RPC layer
//! and the CLI client:
//! - Voter identities (20-byte, hex or Bech32m encoded)
//! - Voter and proposal snapshots handed out to callers

pub mod voter_id;
pub mod voter;
pub mod proposal;
pub mod error;

#[cfg(feature = "serde")]
mod serialization;

pub use voter_id::VoterId;
pub use voter::VoterView;
pub use proposal::{ProposalIndex, ProposalView};
pub use error::TypesError;
