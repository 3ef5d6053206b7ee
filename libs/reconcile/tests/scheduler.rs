//! Quota properties of the scheduler.

use std::collections::{BTreeMap, BTreeSet};

use matchmaker_id::{LimitId, OperationId};
use matchmaker_plan::{Limit, Operation};
use matchmaker_reconcile::{LimitLedger, QuotaScheduler};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn limit(index: u32, target: u32) -> Limit {
    Limit {
        id: LimitId::from_index(index),
        name: format!("Limit {}", index + 1),
        target,
    }
}

fn op(index: u32, limits: &[u32]) -> Operation {
    Operation {
        id: OperationId::from_index(index),
        game: "Azul".to_string(),
        to_create: "alice".to_string(),
        to_invite: BTreeSet::new(),
        options: BTreeMap::new(),
        limits: limits.iter().map(|l| LimitId::from_index(*l)).collect(),
    }
}

/// One generated operation: its limits, whether a live table already
/// fulfils it, and whether its creation would fail.
#[derive(Debug, Clone)]
struct Case {
    limits: Vec<u32>,
    matched: bool,
    fails: bool,
}

fn cases(limit_count: u32) -> impl Strategy<Value = Vec<Case>> {
    prop::collection::vec(
        (
            prop::collection::vec(0..limit_count, 0..=limit_count as usize),
            prop::bool::weighted(0.2),
            prop::bool::weighted(0.1),
        )
            .prop_map(|(limits, matched, fails)| Case {
                limits: limits.into_iter().collect::<BTreeSet<_>>().into_iter().collect(),
                matched,
                fails,
            }),
        0..16,
    )
}

proptest! {
    #[test]
    fn prop_quota_bound_and_conservation(
        targets in prop::collection::vec(0u32..5, 1..4),
        seed in any::<u64>(),
        cases in cases(3),
    ) {
        let limits: Vec<Limit> = targets
            .iter()
            .enumerate()
            .map(|(i, t)| limit(i as u32, *t))
            .collect();
        let ops: Vec<Operation> = cases
            .iter()
            .enumerate()
            .map(|(i, case)| {
                let refs: Vec<u32> = case
                    .limits
                    .iter()
                    .copied()
                    .filter(|l| (*l as usize) < limits.len())
                    .collect();
                op(i as u32, &refs)
            })
            .collect();

        let mut ledger = LimitLedger::new(&limits);
        let mut scheduler = QuotaScheduler::new(&mut ledger);
        for (op, case) in ops.iter().zip(&cases) {
            if case.matched {
                scheduler.admit_matched(op);
            } else {
                scheduler.admit_unmatched(op);
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut offered = BTreeSet::new();
        let mut created = BTreeSet::new();
        while let Some(id) = scheduler.next_candidate(&mut rng) {
            prop_assert!(offered.insert(id), "{id} offered twice");
            prop_assert!(!cases[id.slot()].matched, "{id} was already matched");
            if !cases[id.slot()].fails {
                scheduler.record_created(id);
                created.insert(id);
            }
        }

        for limit in &limits {
            let referencing = |set: &dyn Fn(&Operation) -> bool| {
                ops.iter().filter(|op| op.limits.contains(&limit.id) && set(op)).count() as u32
            };
            let matched = referencing(&|op| cases[op.id.slot()].matched);
            let new = referencing(&|op| created.contains(&op.id));

            // Matches are pre-existing and may exceed the target on their own;
            // new creations never push past it.
            if matched >= limit.target {
                prop_assert_eq!(new, 0);
            } else {
                prop_assert!(matched + new <= limit.target);
            }

            // Each fulfilment is counted exactly once per referenced limit.
            prop_assert_eq!(ledger.get(limit.id).unwrap().current, matched + new);
        }
    }
}

#[test]
fn test_contention_is_fair() {
    let limits = [limit(0, 1)];
    let ops = [op(0, &[0]), op(1, &[0])];
    let mut wins = [0u32; 2];

    for seed in 0..2000 {
        let mut ledger = LimitLedger::new(&limits);
        let mut scheduler = QuotaScheduler::new(&mut ledger);
        for op in &ops {
            scheduler.admit_unmatched(op);
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let chosen = scheduler.next_candidate(&mut rng).unwrap();
        scheduler.record_created(chosen);
        assert_eq!(scheduler.next_candidate(&mut rng), None);
        wins[chosen.slot()] += 1;
    }

    assert_eq!(wins[0] + wins[1], 2000);
    assert!((800..=1200).contains(&wins[0]), "unfair split {wins:?}");
}

#[test]
fn test_exhausted_limit_blocks_even_with_room_elsewhere() {
    // Limit A (target 1) is already spent by a match; limit B (target 5) is empty.
    let limits = [limit(0, 1), limit(1, 5)];
    let mut ledger = LimitLedger::new(&limits);
    let mut scheduler = QuotaScheduler::new(&mut ledger);
    scheduler.admit_matched(&op(0, &[0]));
    scheduler.admit_unmatched(&op(1, &[0, 1]));

    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(scheduler.next_candidate(&mut rng), None);
    assert_eq!(ledger.get(LimitId::from_index(1)).unwrap().current, 0);
}

#[test]
fn test_multi_limit_creation_counts_once_everywhere() {
    let limits = [limit(0, 3), limit(1, 3)];
    let mut ledger = LimitLedger::new(&limits);
    let mut scheduler = QuotaScheduler::new(&mut ledger);
    scheduler.admit_unmatched(&op(0, &[0, 1]));

    let mut rng = StdRng::seed_from_u64(0);
    let id = scheduler.next_candidate(&mut rng).unwrap();
    scheduler.record_created(id);
    assert_eq!(scheduler.next_candidate(&mut rng), None);

    assert_eq!(ledger.get(LimitId::from_index(0)).unwrap().current, 1);
    assert_eq!(ledger.get(LimitId::from_index(1)).unwrap().current, 1);
}
