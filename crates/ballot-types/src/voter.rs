//! Read-only voter snapshot.

use crate::proposal::ProposalIndex;
use crate::voter_id::VoterId;

/// Snapshot of a registered voter, as exposed to queries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct VoterView {
    /// Voter identity
    pub id: VoterId,
    /// Display name (may be empty)
    pub name: String,
    /// Current weight; 0 once merged into a delegate
    pub weight: u64,
    /// Whether this voter cast a ballot
    pub voted: bool,
    /// Proposal voted for, if any
    pub voted_proposal: Option<ProposalIndex>,
    /// Voter this one delegated to, if any
    pub delegate: Option<VoterId>,
}
