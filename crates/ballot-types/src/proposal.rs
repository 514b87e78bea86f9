//! Proposal snapshot.

/// Position of a proposal in the ledger's fixed sequence.
pub type ProposalIndex = usize;

/// Snapshot of a proposal and its tally.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProposalView {
    pub index: ProposalIndex,
    pub name: String,
    /// Accumulated weight
    pub vote_count: u64,
}
