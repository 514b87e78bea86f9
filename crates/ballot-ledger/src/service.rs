//! Single-writer ledger service.
//!
//! Wraps the ledger in one mutex so commands and consistent reads never
//! interleave. With a command log attached, a command is applied in place
//! and then journaled. A rejected command changes nothing by itself; a failed
//! append is taken back from an undo record of the voters and tallies the
//! command could touch.

use ballot_storage::CommandLog;
use ballot_types::{ProposalIndex, ProposalView, VoterId, VoterView};
use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::command::Command;
use crate::error::{LedgerError, ServiceError};
use crate::ledger::{LedgerConfig, VotingLedger};

pub struct LedgerService {
    ledger: Mutex<VotingLedger>,
    log: Option<CommandLog>,
}

impl LedgerService {
    /// Service without persistence.
    pub fn in_memory(proposals: Vec<String>, config: LedgerConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            ledger: Mutex::new(VotingLedger::new(proposals, config)?),
            log: None,
        })
    }

    /// Open a journaled service. An empty log is initialized with
    /// `proposals` and `config`; a non-empty log is replayed under the
    /// proposal list and policy it recorded.
    pub fn open(log: CommandLog, proposals: Vec<String>, config: LedgerConfig) -> Result<Self, ServiceError> {
        let ledger = if log.is_empty() {
            let ledger = VotingLedger::new(proposals.clone(), config)?;
            log.append(&Command::Initialize { proposals, config }.encode()?)?;
            info!("Initialized new command log with {} proposals", ledger.ballot().len());
            ledger
        } else {
            let records = log.read_all()?;
            let commands = records
                .iter()
                .map(|bytes| Command::decode(bytes))
                .collect::<Result<Vec<_>, _>>()?;

            let ledger = Command::replay(commands)?;
            if ledger.ballot().names() != proposals {
                warn!(
                    "Configured proposals differ from the command log; using {:?}",
                    ledger.ballot().names()
                );
            }
            if *ledger.config() != config {
                warn!(
                    "Configured ledger policy differs from the command log; using {:?}",
                    ledger.config()
                );
            }
            info!(
                "Replayed {} records: {} voters, {} votes tallied",
                records.len(),
                ledger.registry().len(),
                ledger.ballot().total_votes()
            );
            ledger
        };

        Ok(Self {
            ledger: Mutex::new(ledger),
            log: Some(log),
        })
    }

    /// Run one command atomically.
    pub fn execute(&self, command: Command) -> Result<(), ServiceError> {
        let mut ledger = self.ledger.lock();

        let result = match &self.log {
            None => command.apply(&mut ledger).map_err(ServiceError::from),
            Some(log) => Self::apply_journaled(&mut ledger, log, &command),
        };

        if let Err(ServiceError::Ledger(e)) = &result {
            warn!(command = command.name(), kind = e.kind(), "Command rejected: {}", e);
        }
        result
    }

    fn apply_journaled(ledger: &mut VotingLedger, log: &CommandLog, command: &Command) -> Result<(), ServiceError> {
        let bytes = command.encode()?;
        let undo = ledger.undo_record(&command.touched(ledger));

        command.apply(ledger)?;

        if let Err(e) = log.append(&bytes) {
            ledger.undo(undo);
            error!("Failed to journal {} command: {}", command.name(), e);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn register(&self, id: VoterId, name: impl Into<String>) -> Result<(), ServiceError> {
        self.execute(Command::Register { id, name: name.into() })
    }

    pub fn delegate(&self, from: VoterId, to: VoterId) -> Result<(), ServiceError> {
        self.execute(Command::Delegate { from, to })
    }

    pub fn vote(&self, voter: VoterId, proposal: ProposalIndex) -> Result<(), ServiceError> {
        self.execute(Command::Vote { voter, proposal })
    }

    /// Read under the writer lock.
    pub fn read<R>(&self, f: impl FnOnce(&VotingLedger) -> R) -> R {
        let ledger = self.ledger.lock();
        f(&*ledger)
    }

    pub fn get_all_voters(&self) -> Vec<VoterView> {
        self.read(|l| l.get_all_voters().collect())
    }

    pub fn voter(&self, id: &VoterId) -> Option<VoterView> {
        self.read(|l| l.voter(id))
    }

    pub fn proposals(&self) -> Vec<ProposalView> {
        self.read(|l| l.proposals().collect())
    }

    pub fn winning_proposal(&self) -> ProposalIndex {
        self.read(|l| l.winning_proposal())
    }

    pub fn winner_name(&self) -> String {
        self.read(|l| l.winner_name().to_string())
    }

    pub fn voter_count(&self) -> usize {
        self.read(|l| l.registry().len())
    }

    pub fn is_registered(&self, id: &VoterId) -> bool {
        self.read(|l| l.registry().contains(id))
    }

    /// Committed records, including the initialize header.
    pub fn journal_len(&self) -> Option<u64> {
        self.log.as_ref().map(|log| log.len())
    }

    /// Ledger error carried by a service error, if any.
    pub fn ledger_error(err: &ServiceError) -> Option<&LedgerError> {
        match err {
            ServiceError::Ledger(e) => Some(e),
            _ => None,
        }
    }
}
