//! Reconciliation of desired operations against live remote tables.
//!
//! A run turns a validated [`Plan`](matchmaker_plan::Plan) into remote
//! tables while staying idempotent across repeated runs:
//!
//! - **Matching** ([`find_match`]): an operation already fulfilled by one
//!   of its creator's live tables is not created again.
//! - **Scheduling** ([`QuotaScheduler`]): unmatched operations are created
//!   only while every one of their limits has room. Contention for the last
//!   slots of a limit is settled by a uniform shuffle.
//! - **Orchestration** ([`Orchestrator`]): accounts run one after another,
//!   each with its own session. Failures are isolated per operation, and
//!   per account for login or lookup failures.
//!
//! # Invariants
//!
//! - An operation is matched or created at most once per run.
//! - Limit counters never decrease and new creations never push a limit
//!   past its target.
//! - Nothing touches the remote service unless [`validate`] found no error.

mod error;
mod ledger;
pub mod matcher;
mod orchestrator;
mod report;
mod scheduler;
mod validate;

pub use error::{ConfigError, RunError};
pub use ledger::{LimitCount, LimitLedger};
pub use matcher::find_match;
pub use orchestrator::{Orchestrator, RunSettings};
pub use report::{OperationReport, Outcome, RunReport, RunStats};
pub use scheduler::QuotaScheduler;
pub use validate::validate;
