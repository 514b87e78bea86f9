//! Proposals and their tallies.

use ballot_types::{ProposalIndex, ProposalView, VoterId};
use crate::error::LedgerError;
use crate::registry::VoterRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub name: String,
    pub vote_count: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Ballot {
    proposals: Vec<Proposal>,
    initialized: bool,
}

impl Ballot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fixed proposal sequence. Only the first call succeeds.
    pub fn add_proposals<I, S>(&mut self, names: I) -> Result<(), LedgerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.initialized {
            return Err(LedgerError::ProposalsAlreadyInitialized);
        }

        let proposals: Vec<Proposal> = names
            .into_iter()
            .map(|name| Proposal { name: name.into(), vote_count: 0 })
            .collect();
        if proposals.is_empty() {
            return Err(LedgerError::NoProposals);
        }

        self.proposals = proposals;
        self.initialized = true;
        Ok(())
    }

    /// Cast `voter`'s own ballot. Returns the weight that was counted.
    pub fn cast_vote(
        &mut self,
        registry: &mut VoterRegistry,
        voter_id: VoterId,
        proposal: ProposalIndex,
    ) -> Result<u64, LedgerError> {
        let voter = registry
            .voter_mut(&voter_id)
            .ok_or(LedgerError::UnknownVoter(voter_id))?;

        let count = self.proposals.len();
        let target = self
            .proposals
            .get_mut(proposal)
            .ok_or(LedgerError::InvalidProposal { index: proposal, count })?;

        if voter.voted {
            return Err(LedgerError::AlreadyVoted(voter_id));
        }
        if voter.delegate.is_some() {
            return Err(LedgerError::AlreadyDelegated(voter_id));
        }
        if voter.weight == 0 {
            return Err(LedgerError::NoVotingPower(voter_id));
        }

        voter.voted = true;
        voter.voted_proposal = Some(proposal);
        target.vote_count += voter.weight;

        Ok(voter.weight)
    }

    /// Add weight straight to a tally; used for delegations that arrive
    /// after the effective voter already voted.
    pub(crate) fn credit(&mut self, proposal: ProposalIndex, weight: u64) -> Result<(), LedgerError> {
        let count = self.proposals.len();
        let target = self
            .proposals
            .get_mut(proposal)
            .ok_or(LedgerError::InvalidProposal { index: proposal, count })?;
        target.vote_count += weight;
        Ok(())
    }

    /// Index with the highest tally. Ties go to the lowest index; with no
    /// votes at all this is proposal 0.
    pub fn winning_proposal(&self) -> ProposalIndex {
        let mut winner = 0;
        let mut best = 0;
        for (index, proposal) in self.proposals.iter().enumerate() {
            if proposal.vote_count > best {
                best = proposal.vote_count;
                winner = index;
            }
        }
        winner
    }

    pub fn winner_name(&self) -> &str {
        self.proposals
            .get(self.winning_proposal())
            .map(|p| p.name.as_str())
            .unwrap_or_default()
    }

    pub fn proposal(&self, index: ProposalIndex) -> Option<ProposalView> {
        self.proposals.get(index).map(|p| ProposalView {
            index,
            name: p.name.clone(),
            vote_count: p.vote_count,
        })
    }

    pub fn proposals(&self) -> impl Iterator<Item = ProposalView> + '_ {
        self.proposals.iter().enumerate().map(|(index, p)| ProposalView {
            index,
            name: p.name.clone(),
            vote_count: p.vote_count,
        })
    }

    pub fn names(&self) -> Vec<String> {
        self.proposals.iter().map(|p| p.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// Sum of all tallies.
    pub fn total_votes(&self) -> u64 {
        self.proposals.iter().map(|p| p.vote_count).sum()
    }

    pub(crate) fn tallies(&self) -> Vec<u64> {
        self.proposals.iter().map(|p| p.vote_count).collect()
    }

    pub(crate) fn restore_tallies(&mut self, tallies: &[u64]) {
        for (proposal, &count) in self.proposals.iter_mut().zip(tallies) {
            proposal.vote_count = count;
        }
    }
}
