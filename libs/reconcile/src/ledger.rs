//! Per-limit counters shared by every operation of a run.

use std::collections::{BTreeMap, BTreeSet};

use matchmaker_id::LimitId;
use matchmaker_plan::Limit;
use serde::Serialize;

/// How much of a limit has been spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitCount {
    pub id: LimitId,
    pub name: String,
    pub target: u32,
    /// Operations matched or created against this limit so far.
    pub current: u32,
}

impl LimitCount {
    pub fn remaining(&self) -> u32 {
        self.target.saturating_sub(self.current)
    }

    pub fn is_exhausted(&self) -> bool {
        self.current >= self.target
    }
}

/// Counters for every limit of a plan.
///
/// Counts only ever grow. A limit missing from the ledger is treated as
/// exhausted.
#[derive(Debug, Clone, Default)]
pub struct LimitLedger {
    counts: BTreeMap<LimitId, LimitCount>,
}

impl LimitLedger {
    pub fn new(limits: &[Limit]) -> Self {
        Self {
            counts: limits
                .iter()
                .map(|limit| {
                    (
                        limit.id,
                        LimitCount {
                            id: limit.id,
                            name: limit.name.clone(),
                            target: limit.target,
                            current: 0,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn get(&self, id: LimitId) -> Option<&LimitCount> {
        self.counts.get(&id)
    }

    pub fn target(&self, id: LimitId) -> u32 {
        self.counts.get(&id).map_or(0, |count| count.target)
    }

    pub fn remaining(&self, id: LimitId) -> u32 {
        self.counts.get(&id).map_or(0, LimitCount::remaining)
    }

    pub fn is_exhausted(&self, id: LimitId) -> bool {
        self.counts.get(&id).is_none_or(LimitCount::is_exhausted)
    }

    /// Returns true if every listed limit still has room.
    pub fn has_room(&self, limits: &[LimitId]) -> bool {
        limits.iter().all(|id| !self.is_exhausted(*id))
    }

    /// Counts one fulfilment against each distinct limit.
    ///
    /// Returns the limits this fulfilment exhausted.
    pub fn record(&mut self, limits: &[LimitId]) -> Vec<LimitId> {
        let distinct: BTreeSet<LimitId> = limits.iter().copied().collect();
        let mut exhausted = Vec::new();
        for id in distinct {
            if let Some(count) = self.counts.get_mut(&id) {
                let was_exhausted = count.is_exhausted();
                count.current = count.current.saturating_add(1);
                if !was_exhausted && count.is_exhausted() {
                    exhausted.push(id);
                }
            }
        }
        exhausted
    }

    pub fn into_counts(self) -> Vec<LimitCount> {
        self.counts.into_values().collect()
    }
}
