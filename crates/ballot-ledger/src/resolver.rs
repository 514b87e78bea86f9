//! Delegation chain resolution.
//!
//! Follows `delegate` links from a starting voter to the voter that
//! delegated to nobody. The walk is iterative and never takes more hops than
//! there are registered voters; a chain that is still going after that many
//! hops revisits a voter, which is a cycle.

use ballot_types::{ProposalIndex, VoterId};
use thiserror::Error;
use crate::error::LedgerError;
use crate::registry::VoterRegistry;

/// Terminal voter of a delegation chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveVoter {
    pub id: VoterId,
    /// Set when the effective voter already cast a ballot
    pub voted_proposal: Option<ProposalIndex>,
    /// Weight currently held by the effective voter
    pub weight: u64,
    /// Links followed from the starting voter
    pub hops: usize,
}

impl EffectiveVoter {
    pub fn has_voted(&self) -> bool {
        self.voted_proposal.is_some()
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Delegation cycle detected starting at {0}")]
    CycleDetected(VoterId),

    #[error("Unknown voter in delegation chain: {0}")]
    UnknownVoter(VoterId),
}

impl From<ResolveError> for LedgerError {
    fn from(e: ResolveError) -> Self {
        match e {
            ResolveError::CycleDetected(_) => LedgerError::Cycle,
            ResolveError::UnknownVoter(id) => LedgerError::UnknownVoter(id),
        }
    }
}

/// Stateless resolver over a registry snapshot.
pub struct DelegationResolver;

impl DelegationResolver {
    pub fn resolve(start: VoterId, registry: &VoterRegistry) -> Result<EffectiveVoter, ResolveError> {
        let mut current = start;

        for hops in 0..registry.len() {
            let voter = registry
                .voter(&current)
                .ok_or(ResolveError::UnknownVoter(current))?;

            match voter.delegate {
                None => {
                    tracing::debug!(start = %start, effective = %current, hops, "Resolved delegation chain");
                    return Ok(EffectiveVoter {
                        id: current,
                        voted_proposal: voter.voted_proposal,
                        weight: voter.weight,
                        hops,
                    });
                }
                Some(next) => current = next,
            }
        }

        if registry.is_empty() {
            return Err(ResolveError::UnknownVoter(start));
        }
        Err(ResolveError::CycleDetected(start))
    }
}
