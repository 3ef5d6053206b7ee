//! What happened to each operation in a run.

use matchmaker_id::{OperationId, TableId};
use serde::Serialize;

use crate::LimitCount;

/// Final state of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Outcome {
    /// A live table already fulfilled it.
    Matched { table: TableId },
    Created { table: TableId },
    /// Would have been created; dry run.
    Planned,
    /// Left out by its limits.
    Deferred,
    Failed { reason: String },
    /// Its account could not be processed.
    Skipped { reason: String },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Matched { .. } => "matched",
            Self::Created { .. } => "created",
            Self::Planned => "planned",
            Self::Deferred => "deferred",
            Self::Failed { .. } => "failed",
            Self::Skipped { .. } => "skipped",
        }
    }

    pub fn table(&self) -> Option<TableId> {
        match self {
            Self::Matched { table } | Self::Created { table } => Some(*table),
            _ => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Failed { reason } | Self::Skipped { reason } => Some(reason),
            _ => None,
        }
    }
}

/// One row of the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationReport {
    pub operation: OperationId,
    pub creator: String,
    pub game: String,
    pub outcome: Outcome,
}

/// Statistics from a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub matched: usize,
    pub created: usize,
    pub planned: usize,
    pub deferred: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// The result of reconciling a whole batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// One entry per operation, in document order.
    pub operations: Vec<OperationReport>,
    /// Final limit counters.
    pub limits: Vec<LimitCount>,
    /// Accounts whose processing was aborted.
    pub failed_accounts: Vec<String>,
}

impl RunReport {
    pub fn outcome(&self, operation: OperationId) -> Option<&Outcome> {
        self.operations
            .iter()
            .find(|entry| entry.operation == operation)
            .map(|entry| &entry.outcome)
    }

    pub fn stats(&self) -> RunStats {
        let mut stats = RunStats::default();
        for entry in &self.operations {
            match entry.outcome {
                Outcome::Matched { .. } => stats.matched += 1,
                Outcome::Created { .. } => stats.created += 1,
                Outcome::Planned => stats.planned += 1,
                Outcome::Deferred => stats.deferred += 1,
                Outcome::Failed { .. } => stats.failed += 1,
                Outcome::Skipped { .. } => stats.skipped += 1,
            }
        }
        stats
    }

    /// Returns true if no account was aborted and no creation failed.
    pub fn is_success(&self) -> bool {
        let stats = self.stats();
        self.failed_accounts.is_empty() && stats.failed == 0
    }
}
