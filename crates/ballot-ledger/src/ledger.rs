//! Voting ledger facade.
//!
//! The only entry point for commands. Each command either returns `Ok` with
//! every invariant holding, or an error with no state changed.
//!
//! Per-voter states: `Fresh` -> `Delegated` | `Voted`. Both targets are
//! terminal and mutually exclusive.

use ballot_types::{ProposalIndex, ProposalView, VoterId, VoterView};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ballot::Ballot;
use crate::error::LedgerError;
use crate::registry::{Voter, VoterRegistry};
use crate::resolver::DelegationResolver;

/// What happens when a delegation resolves to a voter who already voted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateDelegation {
    /// Add the delegator's weight straight to the proposal that voter chose
    #[default]
    CountTowardsVote,
    /// Refuse the delegation
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub late_delegation: LateDelegation,
}

/// Pre-image of the state one command can touch.
#[derive(Debug, Clone)]
pub(crate) struct UndoRecord {
    voter_count: usize,
    voters: Vec<Voter>,
    tallies: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct VotingLedger {
    registry: VoterRegistry,
    ballot: Ballot,
    config: LedgerConfig,
}

impl VotingLedger {
    /// Create a ledger over a fixed, non-empty proposal list.
    pub fn new<I, S>(proposals: I, config: LedgerConfig) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ballot = Ballot::new();
        ballot.add_proposals(proposals)?;

        Ok(Self {
            registry: VoterRegistry::new(),
            ballot,
            config,
        })
    }

    pub fn register(&mut self, id: VoterId) -> Result<(), LedgerError> {
        self.register_named(id, String::new())
    }

    pub fn register_named(&mut self, id: VoterId, name: impl Into<String>) -> Result<(), LedgerError> {
        self.registry.register_named(id, name)?;
        info!(voter = %id, "Voter registered");
        Ok(())
    }

    /// Transfer `from`'s weight to the end of `to`'s delegation chain.
    pub fn delegate(&mut self, from: VoterId, to: VoterId) -> Result<(), LedgerError> {
        let sender = self.registry.voter(&from).ok_or(LedgerError::UnknownVoter(from))?;
        if sender.voted {
            return Err(LedgerError::AlreadyVoted(from));
        }
        if sender.delegate.is_some() {
            return Err(LedgerError::AlreadyDelegated(from));
        }
        if from == to {
            return Err(LedgerError::SelfDelegation);
        }
        if !self.registry.contains(&to) {
            return Err(LedgerError::UnknownVoter(to));
        }
        let weight = sender.weight;

        // Speculative edge; every failure below must clear it again
        self.registry.set_delegate(&from, Some(to))?;

        let effective = match DelegationResolver::resolve(from, &self.registry) {
            Ok(effective) => effective,
            Err(e) => {
                self.registry.set_delegate(&from, None)?;
                debug!(from = %from, to = %to, "Delegation rejected: {}", e);
                return Err(e.into());
            }
        };

        match effective.voted_proposal {
            Some(proposal) => {
                if self.config.late_delegation == LateDelegation::Reject {
                    self.registry.set_delegate(&from, None)?;
                    return Err(LedgerError::DelegateAlreadyVoted(effective.id));
                }
                if let Err(e) = self.ballot.credit(proposal, weight) {
                    self.registry.set_delegate(&from, None)?;
                    return Err(e);
                }
            }
            None => {
                if let Some(target) = self.registry.voter_mut(&effective.id) {
                    target.weight += weight;
                }
            }
        }

        if let Some(sender) = self.registry.voter_mut(&from) {
            sender.weight = 0;
        }

        info!(
            from = %from,
            to = %to,
            effective = %effective.id,
            weight,
            late = effective.has_voted(),
            "Delegation committed"
        );
        Ok(())
    }

    pub fn vote(&mut self, voter: VoterId, proposal: ProposalIndex) -> Result<(), LedgerError> {
        let weight = self.ballot.cast_vote(&mut self.registry, voter, proposal)?;
        info!(voter = %voter, proposal, weight, "Vote cast");
        Ok(())
    }

    /// Voters in registration order.
    pub fn get_all_voters(&self) -> impl Iterator<Item = VoterView> + '_ {
        self.registry.all()
    }

    pub fn voter(&self, id: &VoterId) -> Option<VoterView> {
        self.registry.get(id)
    }

    pub fn proposals(&self) -> impl Iterator<Item = ProposalView> + '_ {
        self.ballot.proposals()
    }

    pub fn winning_proposal(&self) -> ProposalIndex {
        self.ballot.winning_proposal()
    }

    pub fn winner_name(&self) -> &str {
        self.ballot.winner_name()
    }

    pub fn registry(&self) -> &VoterRegistry {
        &self.registry
    }

    pub fn ballot(&self) -> &Ballot {
        &self.ballot
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Weight still undecided plus weight already tallied. Equals the weight
    /// granted at registration at all times.
    pub fn accounted_weight(&self) -> u64 {
        self.registry.undecided_weight() + self.ballot.total_votes()
    }

    /// Save the given voters and every tally. Cost is O(touched + proposals).
    pub(crate) fn undo_record(&self, touched: &[VoterId]) -> UndoRecord {
        UndoRecord {
            voter_count: self.registry.len(),
            voters: touched
                .iter()
                .filter_map(|id| self.registry.voter(id).cloned())
                .collect(),
            tallies: self.ballot.tallies(),
        }
    }

    pub(crate) fn undo(&mut self, record: UndoRecord) {
        self.registry.truncate(record.voter_count);
        for voter in record.voters {
            self.registry.restore(voter);
        }
        self.ballot.restore_tallies(&record.tallies);
    }
}
