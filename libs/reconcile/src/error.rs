//! Error types for validation and per-account runs.

use matchmaker_id::OperationId;
use matchmaker_plan::PlanError;
use matchmaker_remote::RemoteError;
use thiserror::Error;

/// A configuration problem. Any of these aborts the whole batch before the
/// remote service is contacted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(transparent)]
    Structure(#[from] PlanError),

    #[error("{operation}: `{user}` cannot invite themselves to their own table")]
    SelfInvite { operation: OperationId, user: String },

    #[error("{operation}: creator `{user}` is not a known user")]
    UnknownCreator { operation: OperationId, user: String },

    #[error("{operation}: missing password to create tables as `{user}`")]
    MissingPassword { operation: OperationId, user: String },

    #[error("{operation}: cannot find game `{game}`")]
    UnknownGame { operation: OperationId, game: String },
}

impl ConfigError {
    /// The operation at fault, if the error is tied to one.
    pub fn operation(&self) -> Option<OperationId> {
        match self {
            Self::Structure(_) => None,
            Self::SelfInvite { operation, .. }
            | Self::UnknownCreator { operation, .. }
            | Self::MissingPassword { operation, .. }
            | Self::UnknownGame { operation, .. } => Some(*operation),
        }
    }
}

/// Aborts processing of one account. Other accounts still run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("no password for `{user}`")]
    MissingPassword { user: String },

    #[error("login failed for `{user}`")]
    LoginFailed { user: String },

    #[error("player `{user}` not found")]
    UnknownPlayer { user: String },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}
