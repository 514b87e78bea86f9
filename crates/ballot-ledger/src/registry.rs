//! Voter registry.
//!
//! Owns every voter record and its delegation pointer. Iteration order is
//! registration order and is what external voter listings expose.

use std::collections::HashMap;
use ballot_types::{ProposalIndex, VoterId, VoterView};
use crate::error::LedgerError;

/// Weight granted to every voter at registration.
pub const DEFAULT_WEIGHT: u64 = 1;

/// Voter record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voter {
    pub id: VoterId,
    pub name: String,
    /// 0 once merged into a delegate or tombstoned
    pub weight: u64,
    pub voted: bool,
    pub voted_proposal: Option<ProposalIndex>,
    pub delegate: Option<VoterId>,
}

impl Voter {
    fn new(id: VoterId, name: String) -> Self {
        Self {
            id,
            name,
            weight: DEFAULT_WEIGHT,
            voted: false,
            voted_proposal: None,
            delegate: None,
        }
    }

    pub fn view(&self) -> VoterView {
        VoterView {
            id: self.id,
            name: self.name.clone(),
            weight: self.weight,
            voted: self.voted,
            voted_proposal: self.voted_proposal,
            delegate: self.delegate,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VoterRegistry {
    voters: Vec<Voter>,
    index: HashMap<VoterId, usize>,
    granted: u64,
}

impl VoterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a voter with an empty display name.
    pub fn register(&mut self, id: VoterId) -> Result<(), LedgerError> {
        self.register_named(id, String::new())
    }

    pub fn register_named(&mut self, id: VoterId, name: impl Into<String>) -> Result<(), LedgerError> {
        if self.index.contains_key(&id) {
            return Err(LedgerError::AlreadyRegistered(id));
        }

        self.index.insert(id, self.voters.len());
        self.voters.push(Voter::new(id, name.into()));
        self.granted += DEFAULT_WEIGHT;
        Ok(())
    }

    pub fn get(&self, id: &VoterId) -> Option<VoterView> {
        self.voter(id).map(Voter::view)
    }

    pub fn contains(&self, id: &VoterId) -> bool {
        self.index.contains_key(id)
    }

    /// Voters in registration order. Each call starts from the beginning.
    pub fn all(&self) -> impl Iterator<Item = VoterView> + '_ {
        self.voters.iter().map(Voter::view)
    }

    pub fn len(&self) -> usize {
        self.voters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }

    /// Sum of weight handed out at registration.
    pub fn total_weight_granted(&self) -> u64 {
        self.granted
    }

    /// Weight still held by voters that neither voted nor delegated.
    pub fn undecided_weight(&self) -> u64 {
        self.voters
            .iter()
            .filter(|v| !v.voted && v.delegate.is_none())
            .map(|v| v.weight)
            .sum()
    }

    pub(crate) fn voter(&self, id: &VoterId) -> Option<&Voter> {
        self.index.get(id).map(|&i| &self.voters[i])
    }

    pub(crate) fn voter_mut(&mut self, id: &VoterId) -> Option<&mut Voter> {
        match self.index.get(id) {
            Some(&i) => self.voters.get_mut(i),
            None => None,
        }
    }

    /// Point `id` at `target` (or clear it). Used only while committing or
    /// rolling back a delegation.
    pub(crate) fn set_delegate(&mut self, id: &VoterId, target: Option<VoterId>) -> Result<(), LedgerError> {
        let voter = self.voter_mut(id).ok_or(LedgerError::UnknownVoter(*id))?;
        voter.delegate = target;
        Ok(())
    }

    /// Drop voters registered after the first `len`.
    pub(crate) fn truncate(&mut self, len: usize) {
        if len >= self.voters.len() {
            return;
        }
        for voter in self.voters.drain(len..) {
            self.index.remove(&voter.id);
            self.granted -= DEFAULT_WEIGHT;
        }
    }

    /// Put back a saved copy of a registered voter.
    pub(crate) fn restore(&mut self, saved: Voter) {
        if let Some(voter) = self.voter_mut(&saved.id) {
            *voter = saved;
        }
    }
}
