//! Quota-fair selection of the operations to create.
//!
//! The scheduler is driven by its caller: operations are admitted as matched
//! or unmatched, then [`QuotaScheduler::next_candidate`] hands out one
//! operation at a time. The caller attempts the creation and reports success
//! with [`QuotaScheduler::record_created`] before asking for the next one, so
//! cascading exhaustion is visible to every later decision.
//!
//! Order of candidates:
//!
//! 1. Unmatched operations without limits, in admission order.
//! 2. For each limit with pending operations, smallest target first (ties
//!    broken by document order), the operations still eligible under it.
//!    They keep admission order when they all fit in the remaining capacity
//!    and are shuffled otherwise.
//!
//! An operation is eligible while every one of its limits has room. Once any
//! of them is exhausted it is excluded for the rest of the run.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use matchmaker_id::{LimitId, OperationId};
use matchmaker_plan::Operation;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::LimitLedger;

/// Selects unmatched operations for creation under the limits' quotas.
pub struct QuotaScheduler<'l> {
    ledger: &'l mut LimitLedger,
    limits: BTreeMap<OperationId, Vec<LimitId>>,
    unconstrained: VecDeque<OperationId>,
    pending: BTreeMap<LimitId, Vec<OperationId>>,
    excluded: BTreeSet<OperationId>,
    /// Handed out as candidates or matched; never offered again.
    settled: BTreeSet<OperationId>,
    /// Limits left to fill, last to visit first. `None` until sealed.
    queue: Option<Vec<LimitId>>,
    active: Option<(LimitId, VecDeque<OperationId>)>,
}

impl<'l> QuotaScheduler<'l> {
    pub fn new(ledger: &'l mut LimitLedger) -> Self {
        Self {
            ledger,
            limits: BTreeMap::new(),
            unconstrained: VecDeque::new(),
            pending: BTreeMap::new(),
            excluded: BTreeSet::new(),
            settled: BTreeSet::new(),
            queue: None,
            active: None,
        }
    }

    /// An operation already fulfilled by a live table. It spends quota on
    /// each of its limits.
    pub fn admit_matched(&mut self, op: &Operation) {
        self.settled.insert(op.id);
        self.spend(&op.limits);
    }

    /// An operation that needs a new table.
    pub fn admit_unmatched(&mut self, op: &Operation) {
        if op.limits.is_empty() {
            self.unconstrained.push_back(op.id);
            return;
        }

        let distinct: BTreeSet<LimitId> = op.limits.iter().copied().collect();
        for limit in &distinct {
            self.pending.entry(*limit).or_default().push(op.id);
        }
        self.limits.insert(op.id, distinct.into_iter().collect());
    }

    /// Returns true if the operation can no longer be created this run.
    pub fn is_excluded(&self, op: OperationId) -> bool {
        self.excluded.contains(&op)
    }

    /// The next operation to create, or `None` when nothing is left.
    ///
    /// A candidate is never handed out twice. Candidates that are not
    /// reported through [`record_created`](Self::record_created) count as
    /// attempted and spend no quota.
    pub fn next_candidate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<OperationId> {
        if self.queue.is_none() {
            self.seal();
        }

        if let Some(op) = self.unconstrained.pop_front() {
            self.settled.insert(op);
            return Some(op);
        }

        loop {
            if let Some((limit, mut batch)) = self.active.take() {
                if self.ledger.remaining(limit) > 0 {
                    while let Some(op) = batch.pop_front() {
                        if self.is_eligible(op) {
                            self.settled.insert(op);
                            self.active = Some((limit, batch));
                            return Some(op);
                        }
                    }
                }
            }

            let limit = self.queue.as_mut()?.pop()?;
            let remaining = self.ledger.remaining(limit) as usize;
            if remaining == 0 {
                continue;
            }

            let mut eligible: Vec<OperationId> = self
                .pending
                .get(&limit)
                .into_iter()
                .flatten()
                .copied()
                .filter(|op| self.is_eligible(*op))
                .collect();
            if eligible.is_empty() {
                continue;
            }

            if eligible.len() > remaining {
                eligible.shuffle(rng);
                debug!(
                    limit = %limit,
                    remaining,
                    contenders = eligible.len(),
                    "Shuffled contenders for limit"
                );
            }
            self.active = Some((limit, eligible.into()));
        }
    }

    /// Counts a successful creation against every limit of the operation.
    pub fn record_created(&mut self, op: OperationId) {
        self.settled.insert(op);
        if let Some(limits) = self.limits.get(&op).cloned() {
            self.spend(&limits);
        }
    }

    fn is_eligible(&self, op: OperationId) -> bool {
        !self.settled.contains(&op) && !self.excluded.contains(&op)
    }

    fn spend(&mut self, limits: &[LimitId]) {
        for limit in self.ledger.record(limits) {
            self.exclude_pending(limit);
        }
    }

    fn exclude_pending(&mut self, limit: LimitId) {
        let Some(ops) = self.pending.get(&limit) else {
            return;
        };
        let before = self.excluded.len();
        self.excluded.extend(
            ops.iter()
                .copied()
                .filter(|op| !self.settled.contains(op)),
        );
        let newly = self.excluded.len() - before;
        if newly > 0 {
            debug!(limit = %limit, excluded = newly, "Limit exhausted");
        }
    }

    /// Excludes operations already blocked by an exhausted limit and fixes
    /// the order in which limits are filled.
    fn seal(&mut self) {
        let blocked: Vec<LimitId> = self
            .pending
            .keys()
            .copied()
            .filter(|limit| self.ledger.is_exhausted(*limit))
            .collect();
        for limit in blocked {
            self.exclude_pending(limit);
        }

        let mut order: Vec<LimitId> = self.pending.keys().copied().collect();
        order.sort_by_key(|limit| (self.ledger.target(*limit), *limit));
        order.reverse();
        self.queue = Some(order);
    }
}
