//! Journaled ledger commands.
//!
//! A command log starts with one `Initialize` record followed by the
//! register/delegate/vote commands in commit order. The `Initialize` record
//! carries the proposal list and the ledger policy, so replaying the log
//! alone rebuilds the ledger exactly.

use ballot_types::{ProposalIndex, VoterId};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, ServiceError};
use crate::ledger::{LedgerConfig, VotingLedger};
use crate::resolver::DelegationResolver;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Initialize {
        proposals: Vec<String>,
        /// Logs written before the policy was journaled replay with the default
        #[serde(default)]
        config: LedgerConfig,
    },
    Register {
        id: VoterId,
        #[serde(default)]
        name: String,
    },
    Delegate {
        from: VoterId,
        to: VoterId,
    },
    Vote {
        voter: VoterId,
        proposal: ProposalIndex,
    },
}

impl Command {
    pub fn encode(&self) -> Result<Vec<u8>, ServiceError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ServiceError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Apply to an existing ledger. `Initialize` only makes sense as the
    /// first record of a log, so it is refused here.
    pub fn apply(&self, ledger: &mut VotingLedger) -> Result<(), LedgerError> {
        match self {
            Command::Initialize { .. } => Err(LedgerError::ProposalsAlreadyInitialized),
            Command::Register { id, name } => ledger.register_named(*id, name.clone()),
            Command::Delegate { from, to } => ledger.delegate(*from, *to),
            Command::Vote { voter, proposal } => ledger.vote(*voter, *proposal),
        }
    }

    /// Rebuild a ledger from a full command sequence, under the policy
    /// recorded in its `Initialize` record.
    pub fn replay<I>(commands: I) -> Result<VotingLedger, ServiceError>
    where
        I: IntoIterator<Item = Command>,
    {
        let mut commands = commands.into_iter();
        let mut ledger = match commands.next() {
            Some(Command::Initialize { proposals, config }) => VotingLedger::new(proposals, config)?,
            _ => return Err(ServiceError::MissingInitialize),
        };

        for (seq, command) in commands.enumerate() {
            command
                .apply(&mut ledger)
                .map_err(|source| ServiceError::Replay { seq: seq as u64 + 1, source })?;
        }

        Ok(ledger)
    }

    /// Voters whose records applying this command may change.
    pub(crate) fn touched(&self, ledger: &VotingLedger) -> Vec<VoterId> {
        match self {
            Command::Initialize { .. } | Command::Register { .. } => Vec::new(),
            Command::Vote { voter, .. } => vec![*voter],
            Command::Delegate { from, to } => {
                let mut ids = vec![*from, *to];
                if let Ok(effective) = DelegationResolver::resolve(*to, ledger.registry()) {
                    ids.push(effective.id);
                }
                ids
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Initialize { .. } => "initialize",
            Command::Register { .. } => "register",
            Command::Delegate { .. } => "delegate",
            Command::Vote { .. } => "vote",
        }
    }
}
