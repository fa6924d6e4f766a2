//! Replaying council event logs into the read model.

use council_indexer::{AllocationId, Indexer};
use council_runtime::{Council, CouncilFactory, EventLog, InMemoryPool};
use council_types::{
    Address, BudgetAllocation, CouncilConfig, CouncilEvent, CouncilId, EventPosition, LoggedEvent,
    TxHash, Units,
};
use proptest::prelude::*;

const ADMIN: u64 = 1;
const A: u64 = 10;
const B: u64 = 11;
const G1: u64 = 20;
const G2: u64 = 21;

fn addr(n: u64) -> Address {
    Address::from_low_u64(n)
}

fn alloc(pairs: &[(u64, Units)]) -> BudgetAllocation {
    BudgetAllocation::from_pairs(pairs.iter().map(|(n, a)| (addr(*n), *a)))
}

fn create() -> (Council<InMemoryPool>, EventLog) {
    create_with(addr(0xfa))
}

fn create_with(factory: Address) -> (Council<InMemoryPool>, EventLog) {
    let config = CouncilConfig::new("Spacing Guild", "SPA", addr(0xe7))
        .with_member(addr(A), 100)
        .with_member(addr(B), 50)
        .with_grantee("Grantee One", addr(G1))
        .with_grantee("Grantee Two", addr(G2));
    let mut log = EventLog::new();
    let council = CouncilFactory::new(factory)
        .create_council(&addr(ADMIN), &config, InMemoryPool::new(), &mut log)
        .unwrap();
    (council, log)
}

/// A log exercising every indexed event type
fn history() -> (CouncilId, EventLog) {
    let (mut council, mut log) = create();
    council
        .allocate(&addr(A), alloc(&[(G1, 30), (G2, 20)]), &mut log)
        .unwrap();
    council
        .allocate(&addr(B), alloc(&[(G2, 50)]), &mut log)
        .unwrap();
    council
        .set_max_allocations_per_member(&addr(ADMIN), 4, &mut log)
        .unwrap();
    council
        .remove_grantee(&addr(ADMIN), &addr(G2), &mut log)
        .unwrap();
    council
        .add_grantee(&addr(ADMIN), "Grantee Two Again", addr(G2), &mut log)
        .unwrap();
    council
        .allocate(&addr(A), alloc(&[(G2, 40)]), &mut log)
        .unwrap();
    council
        .remove_member(&addr(ADMIN), &addr(B), &mut log)
        .unwrap();
    (council.id(), log)
}

#[test]
fn test_indexes_council_history() {
    let (council, log) = history();
    let mut indexer = Indexer::new();
    let report = indexer.ingest(log.events().to_vec());
    assert_eq!(report.applied, log.len());

    let model = indexer.model();
    let entity = model.council(&council).unwrap();
    assert_eq!(entity.council_name, "Spacing Guild");
    assert_eq!(entity.council_symbol, "SPA");
    assert_eq!(entity.distribution_token, addr(0xe7));
    assert_eq!(entity.max_allocations_per_member, 4);

    let members = model.members(&council);
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].account, addr(A));
    assert_eq!(members[0].voting_power, 100);
    let removed = model.member(&council, &addr(B)).unwrap();
    assert!(!removed.enabled);
    assert_eq!(removed.voting_power, 0);

    assert_eq!(model.grantees(&council).len(), 2);
    assert_eq!(model.allocation_count(), 3);

    let latest = model.latest_allocation(&council, &addr(A)).unwrap();
    assert_eq!(latest.amounts, vec![40]);
    assert_eq!(latest.grantees[0].generation, 1);
    assert_eq!(latest.total(), 40);
    assert_eq!(model.latest_allocations(&council).len(), 2);
}

#[test]
fn test_readded_grantee_is_new_entity() {
    let (council, log) = history();
    let mut indexer = Indexer::new();
    indexer.ingest(log.events().to_vec());
    let model = indexer.model();

    let history = model.grantee_history(&council, &addr(G2));
    assert_eq!(history.len(), 2);
    assert!(!history[0].enabled);
    assert_eq!(history[0].name, "Grantee Two");
    assert!(history[1].enabled);
    assert_eq!(history[1].name, "Grantee Two Again");
    assert_eq!(model.grantee(&council, &addr(G2)).unwrap().id.generation, 1);

    // The first allocation still points at the stale identity
    let first = model.latest_allocation(&council, &addr(B)).unwrap();
    assert_eq!(first.grantees[0].generation, 0);
}

#[test]
fn test_replay_is_idempotent() {
    let (_, log) = history();

    let mut once = Indexer::new();
    once.ingest(log.events().to_vec());

    let mut twice = Indexer::new();
    twice.ingest(log.events().to_vec());
    let report = twice.ingest(log.events().to_vec());

    assert_eq!(report.applied, 0);
    assert_eq!(report.duplicates, log.len());
    assert_eq!(once.model(), twice.model());
    assert_eq!(once.cursor(), twice.cursor());
}

#[test]
fn test_batch_order_does_not_matter() {
    let (_, log) = history();

    let mut ordered = Indexer::new();
    ordered.ingest(log.events().to_vec());

    let mut reversed = Indexer::new();
    reversed.ingest(log.events().iter().rev().cloned().collect::<Vec<_>>());

    assert_eq!(ordered.model(), reversed.model());
}

#[test]
fn test_missing_references_are_skipped() {
    let council = CouncilId::new(addr(0xc0));
    let at = |block: u64, event: CouncilEvent| LoggedEvent {
        council,
        tx_hash: TxHash::derive(&block.to_be_bytes()),
        position: EventPosition::new(block as i64, block, 0),
        event,
    };

    let mut indexer = Indexer::new();
    let report = indexer.ingest(vec![
        at(1, CouncilEvent::MemberRemoved { account: addr(A) }),
        at(2, CouncilEvent::GranteeRemoved { account: addr(G1) }),
        at(
            3,
            CouncilEvent::BudgetAllocated {
                member: addr(A),
                allocation: alloc(&[(G1, 10)]),
            },
        ),
        at(
            4,
            CouncilEvent::MemberAdded {
                account: addr(A),
                voting_power: 100,
            },
        ),
        at(
            5,
            CouncilEvent::BudgetAllocated {
                member: addr(A),
                allocation: alloc(&[(G1, 10)]),
            },
        ),
        at(
            6,
            CouncilEvent::MaxAllocationsPerMemberSet {
                max_allocations_per_member: 3,
            },
        ),
    ]);

    assert_eq!(report.applied, 6);
    let model = indexer.model();
    assert_eq!(model.allocation_count(), 0);
    assert!(model.council(&council).is_none());
    assert_eq!(model.members(&council).len(), 1);
}

#[test]
fn test_allocation_keyed_by_transaction() {
    let (council, log) = history();
    let mut indexer = Indexer::new();
    indexer.ingest(log.events().to_vec());

    let logged = log
        .events()
        .iter()
        .find(|e| matches!(e.event, CouncilEvent::BudgetAllocated { .. }))
        .unwrap();
    let id = AllocationId::new(logged.tx_hash, logged.position.log_index);
    let entity = indexer.model().allocation(&id).unwrap();

    assert_eq!(entity.council, council);
    assert_eq!(entity.allocated_at, logged.position.timestamp);
    assert_eq!(id.to_string(), format!("{}-0", logged.tx_hash));
}

#[test]
fn test_snapshot_serializes() {
    let (_, log) = history();
    let mut indexer = Indexer::new();
    indexer.ingest(log.events().to_vec());

    let snapshot = indexer.model().snapshot();
    let json = snapshot.to_json().unwrap();
    let back: council_indexer::ReadModelSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn test_councils_share_one_indexer() {
    let (a, log_a) = create_with(addr(0xfa));
    let (b, log_b) = create_with(addr(0xfb));

    // Separate logs number blocks alike; line the timestamps up too
    let timestamp = log_a.events()[0].position.timestamp;
    let align = |log: &EventLog| -> Vec<LoggedEvent> {
        log.events()
            .iter()
            .cloned()
            .map(|mut e| {
                e.position.timestamp = timestamp;
                e
            })
            .collect()
    };

    let mut indexer = Indexer::new();
    indexer.ingest(align(&log_a));
    let report = indexer.ingest(align(&log_b));

    assert_eq!(report.applied, log_b.len());
    assert_eq!(report.duplicates, 0);
    let model = indexer.model();
    assert!(model.council(&a.id()).is_some());
    assert!(model.council(&b.id()).is_some());
    assert_eq!(model.members(&b.id()).len(), 2);
    assert_eq!(model.grantees(&b.id()).len(), 2);
}

#[test]
fn test_late_delivery_matches_in_order() {
    let (_, log) = history();
    let mut ordered = Indexer::new();
    ordered.ingest(log.events().to_vec());

    let mut late = Indexer::new();
    for chunk in log.events().chunks(3).rev() {
        late.ingest(chunk.to_vec());
    }

    assert_eq!(ordered.model(), late.model());
    assert_eq!(ordered.cursor(), late.cursor());
}

proptest! {
    /// Redelivering any subset of an applied log leaves the model unchanged.
    #[test]
    fn redelivery_is_harmless(picks in prop::collection::vec(any::<prop::sample::Index>(), 0..30)) {
        let (_, log) = history();
        let events = log.events();

        let mut indexer = Indexer::new();
        indexer.ingest(events.to_vec());
        let expected = indexer.model().clone();

        let redelivered: Vec<LoggedEvent> = picks.iter().map(|i| i.get(events).clone()).collect();
        let report = indexer.ingest(redelivered);

        prop_assert_eq!(report.applied, 0);
        prop_assert_eq!(indexer.model(), &expected);
    }

    /// Any delivery order and batching yields the in-order model.
    #[test]
    fn delivery_order_is_irrelevant(
        keys in prop::collection::vec(any::<u32>(), 64),
        batch_size in 1usize..6,
    ) {
        let (_, log) = history();
        let mut ordered = Indexer::new();
        ordered.ingest(log.events().to_vec());

        let mut shuffled: Vec<(u32, LoggedEvent)> = log
            .events()
            .iter()
            .enumerate()
            .map(|(i, e)| (keys[i % keys.len()], e.clone()))
            .collect();
        shuffled.sort_by_key(|(k, _)| *k);
        let shuffled: Vec<LoggedEvent> = shuffled.into_iter().map(|(_, e)| e).collect();

        let mut indexer = Indexer::new();
        for chunk in shuffled.chunks(batch_size) {
            indexer.ingest(chunk.to_vec());
        }

        prop_assert_eq!(indexer.model(), ordered.model());
        prop_assert_eq!(indexer.applied_count(), log.len());
    }
}
