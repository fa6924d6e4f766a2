//! Property tests: ledger invariants hold over random operation sequences.

use council_runtime::{Council, CouncilFactory, DistributionSink, EventLog, InMemoryPool};
use council_types::{Address, BudgetAllocation, CouncilConfig, Units};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

const ADMIN: u64 = 1;
const MEMBERS: u64 = 4;
const GRANTEES: u64 = 6;

fn member(i: u64) -> Address {
    Address::from_low_u64(100 + i)
}

fn grantee(i: u64) -> Address {
    Address::from_low_u64(200 + i)
}

#[derive(Clone, Debug)]
enum Op {
    Allocate(u64, Vec<(u64, Units)>),
    AddMember(u64, Units),
    RemoveMember(u64),
    AddGrantee(u64),
    RemoveGrantee(u64),
    SetCap(u8),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..MEMBERS, prop::collection::vec((0..GRANTEES, 0u128..80), 0..8))
            .prop_map(|(m, pairs)| Op::Allocate(m, pairs)),
        1 => (0..MEMBERS, 1u128..200).prop_map(|(m, vp)| Op::AddMember(m, vp)),
        1 => (0..MEMBERS).prop_map(Op::RemoveMember),
        1 => (0..GRANTEES).prop_map(Op::AddGrantee),
        1 => (0..GRANTEES).prop_map(Op::RemoveGrantee),
        1 => (0u8..12).prop_map(Op::SetCap),
    ]
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(arb_op(), 1..40)
}

fn setup() -> (Council<InMemoryPool>, EventLog) {
    let mut config = CouncilConfig::new("Property Council", "PROP", Address::from_low_u64(0xe7))
        .with_max_allocations_per_member(3);
    for i in 0..MEMBERS {
        config = config.with_member(member(i), 100);
    }
    for i in 0..GRANTEES / 2 {
        config = config.with_grantee(format!("grantee-{}", i), grantee(i));
    }
    let mut log = EventLog::new();
    let council = CouncilFactory::new(Address::from_low_u64(0xfa))
        .create_council(&Address::from_low_u64(ADMIN), &config, InMemoryPool::new(), &mut log)
        .unwrap();
    (council, log)
}

/// Returns true if the operation succeeded
fn apply(council: &mut Council<InMemoryPool>, log: &mut EventLog, op: &Op) -> bool {
    let admin = Address::from_low_u64(ADMIN);
    match op {
        Op::Allocate(m, pairs) => {
            let request = BudgetAllocation::from_pairs(pairs.iter().map(|(g, a)| (grantee(*g), *a)));
            council.allocate(&member(*m), request, log).is_ok()
        }
        Op::AddMember(m, vp) => council.add_member(&admin, member(*m), *vp, log).is_ok(),
        Op::RemoveMember(m) => council.remove_member(&admin, &member(*m), log).is_ok(),
        Op::AddGrantee(g) => council
            .add_grantee(&admin, &format!("grantee-{}", g), grantee(*g), log)
            .is_ok(),
        Op::RemoveGrantee(g) => council.remove_grantee(&admin, &grantee(*g), log).is_ok(),
        Op::SetCap(cap) => council.set_max_allocations_per_member(&admin, *cap, log).is_ok(),
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Every member's allocation stays within its voting power.
    #[test]
    fn allocation_never_exceeds_voting_power(ops in arb_ops()) {
        let (mut council, mut log) = setup();
        for op in &ops {
            apply(&mut council, &mut log, op);
            for i in 0..MEMBERS {
                let view = council.get_allocation(&member(i));
                prop_assert!(view.total_allocated <= view.voting_power);
                prop_assert_eq!(view.total_allocated, view.allocation.amounts.iter().sum::<Units>());
            }
        }
    }

    /// A successful allocation never references more distinct grantees than the cap.
    #[test]
    fn allocation_respects_cap(ops in arb_ops()) {
        let (mut council, mut log) = setup();
        for op in &ops {
            let ok = apply(&mut council, &mut log, op);
            if let (true, Op::Allocate(m, _)) = (ok, op) {
                let view = council.get_allocation(&member(*m));
                prop_assert!(view.allocation.accounts.len() <= usize::from(council.max_allocations_per_member()));
            }
        }
    }

    /// Sink shares, grantee aggregates and the council total always agree.
    #[test]
    fn sink_matches_ledger(ops in arb_ops()) {
        let (mut council, mut log) = setup();
        for op in &ops {
            apply(&mut council, &mut log, op);

            let member_total: Units = (0..MEMBERS)
                .map(|i| council.get_allocation(&member(i)).total_allocated)
                .sum();
            prop_assert_eq!(council.total_allocated(), member_total);
            prop_assert_eq!(council.sink().total_units(&council.pool()), member_total);

            for g in 0..GRANTEES {
                prop_assert_eq!(
                    council.sink().units_of(&council.pool(), &grantee(g)),
                    council.grantee_units(&grantee(g))
                );
            }
        }
    }

    /// Failed operations never append to the log.
    #[test]
    fn failed_operations_log_nothing(ops in arb_ops()) {
        let (mut council, mut log) = setup();
        for op in &ops {
            let before = log.len();
            let ok = apply(&mut council, &mut log, op);
            prop_assert_eq!(log.len(), if ok { before + 1 } else { before });
        }
    }
}
