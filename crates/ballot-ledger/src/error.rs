use ballot_storage::StorageError;
use ballot_types::{ProposalIndex, VoterId};
use thiserror::Error;

/// Errors returned by ledger commands. None of them leave partial state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Voter already registered: {0}")]
    AlreadyRegistered(VoterId),

    #[error("Unknown voter: {0}")]
    UnknownVoter(VoterId),

    #[error("Voter already voted: {0}")]
    AlreadyVoted(VoterId),

    #[error("Voter already delegated: {0}")]
    AlreadyDelegated(VoterId),

    #[error("Self-delegation not allowed")]
    SelfDelegation,

    #[error("Delegation cycle detected")]
    Cycle,

    #[error("Delegate {0} has already voted")]
    DelegateAlreadyVoted(VoterId),

    #[error("Invalid proposal: {index} (ledger has {count} proposals)")]
    InvalidProposal { index: ProposalIndex, count: usize },

    #[error("No voting power: {0}")]
    NoVotingPower(VoterId),

    #[error("Proposals already initialized")]
    ProposalsAlreadyInitialized,

    #[error("At least one proposal is required")]
    NoProposals,
}

impl LedgerError {
    /// Stable machine-readable kind, used by the RPC layer.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::AlreadyRegistered(_) => "AlreadyRegistered",
            LedgerError::UnknownVoter(_) => "UnknownVoter",
            LedgerError::AlreadyVoted(_) => "AlreadyVoted",
            LedgerError::AlreadyDelegated(_) => "AlreadyDelegated",
            LedgerError::SelfDelegation => "SelfDelegation",
            LedgerError::Cycle => "Cycle",
            LedgerError::DelegateAlreadyVoted(_) => "DelegateAlreadyVoted",
            LedgerError::InvalidProposal { .. } => "InvalidProposal",
            LedgerError::NoVotingPower(_) => "NoVotingPower",
            LedgerError::ProposalsAlreadyInitialized => "ProposalsAlreadyInitialized",
            LedgerError::NoProposals => "NoProposals",
        }
    }
}

/// Errors from the journaled service wrapping the ledger.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Command log does not start with an initialize record")]
    MissingInitialize,

    #[error("Replay failed at record {seq}: {source}")]
    Replay { seq: u64, source: LedgerError },
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Codec(e.to_string())
    }
}
