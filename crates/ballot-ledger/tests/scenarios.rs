//! End-to-end ledger scenarios, in memory and against an on-disk log.

use std::sync::Arc;

use ballot_ledger::{LedgerConfig, LedgerError, LedgerService, ServiceError, VotingLedger};
use ballot_storage::{CommandLog, FileStore};
use ballot_types::VoterId;
use tempfile::TempDir;

fn id(n: u8) -> VoterId {
    VoterId::from_index(n)
}

#[test]
fn delegation_then_vote_counts_both_voters() {
    let mut ledger = VotingLedger::new(["A", "B"], LedgerConfig::default()).unwrap();
    ledger.register(id(1)).unwrap();
    ledger.register(id(2)).unwrap();
    ledger.register(id(3)).unwrap();

    ledger.delegate(id(2), id(1)).unwrap();
    ledger.vote(id(1), 0).unwrap();

    assert_eq!(ledger.ballot().proposal(0).unwrap().vote_count, 2);
    assert!(ledger.voter(&id(1)).unwrap().voted);
    assert_eq!(ledger.voter(&id(2)).unwrap().weight, 0);

    let v3 = ledger.voter(&id(3)).unwrap();
    assert_eq!(v3.weight, 1);
    assert!(!v3.voted);
}

#[test]
fn closing_a_cycle_fails_without_side_effects() {
    let mut ledger = VotingLedger::new(["A"], LedgerConfig::default()).unwrap();
    ledger.register(id(1)).unwrap();
    ledger.register(id(2)).unwrap();

    ledger.delegate(id(1), id(2)).unwrap();
    assert_eq!(ledger.delegate(id(2), id(1)), Err(LedgerError::Cycle));

    assert_eq!(ledger.voter(&id(1)).unwrap().delegate, Some(id(2)));
    assert_eq!(ledger.voter(&id(2)).unwrap().delegate, None);
    assert_eq!(ledger.voter(&id(2)).unwrap().weight, 2);
}

#[test]
fn tie_goes_to_lowest_index() {
    let mut ledger = VotingLedger::new(["A", "B", "C"], LedgerConfig::default()).unwrap();
    for n in 1..=7 {
        ledger.register(id(n)).unwrap();
    }
    // A:3 B:3 C:1, with B's votes cast first
    for n in 1..=3 {
        ledger.vote(id(n), 1).unwrap();
    }
    for n in 4..=6 {
        ledger.vote(id(n), 0).unwrap();
    }
    ledger.vote(id(7), 2).unwrap();

    for _ in 0..3 {
        assert_eq!(ledger.winning_proposal(), 0);
        assert_eq!(ledger.winner_name(), "A");
    }
}

#[test]
fn file_backed_service_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let proposals = vec!["Keep".to_string(), "Change".to_string()];

    {
        let store = Arc::new(FileStore::open(temp_dir.path()).unwrap());
        let log = CommandLog::open(store).unwrap();
        let service = LedgerService::open(log, proposals.clone(), LedgerConfig::default()).unwrap();

        service.register(id(1), "alice").unwrap();
        service.register(id(2), "bob").unwrap();
        service.register(id(3), "carol").unwrap();
        service.vote(id(1), 1).unwrap();
        service.delegate(id(2), id(1)).unwrap();
        // Rejected commands are never journaled
        assert!(service.delegate(id(3), id(3)).is_err());
    }

    let store = Arc::new(FileStore::open(temp_dir.path()).unwrap());
    let log = CommandLog::open(store).unwrap();
    let service = LedgerService::open(log, proposals, LedgerConfig::default()).unwrap();

    assert_eq!(service.journal_len(), Some(6));
    assert_eq!(service.winning_proposal(), 1);
    assert_eq!(service.winner_name(), "Change");
    assert_eq!(service.proposals()[1].vote_count, 2);

    let names: Vec<String> = service.get_all_voters().into_iter().map(|v| v.name).collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);

    // State after replay keeps enforcing the same rules
    let err = service.vote(id(1), 0).unwrap_err();
    assert!(matches!(err, ServiceError::Ledger(LedgerError::AlreadyVoted(_))));
}

#[test]
fn concurrent_commands_keep_weight_conserved() {
    let service = Arc::new(
        LedgerService::in_memory(vec!["A".to_string(), "B".to_string()], LedgerConfig::default())
            .unwrap(),
    );
    for n in 1..=40 {
        service.register(id(n), "").unwrap();
    }

    let handles: Vec<_> = (0..4u8)
        .map(|t| {
            let service = service.clone();
            std::thread::spawn(move || {
                for n in 1..=40u8 {
                    let target = (n + t) % 40 + 1;
                    let _ = service.delegate(id(n), id(target));
                    let _ = service.vote(id(target), (t % 2) as usize);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    service.read(|ledger| {
        assert_eq!(ledger.accounted_weight(), ledger.registry().total_weight_granted());
    });
}
