//! Error types for the remote boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Why a user-facing option (or game name) could not be resolved.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("option `{option}` is not a valid option")]
    UnknownOption { option: String },

    #[error("`{value}` is not a valid value for option `{option}`")]
    UnknownValue { option: String, value: String },

    #[error("`{query}` matches [{}]; use more letters", .candidates.join(", "))]
    AmbiguousGameName {
        query: String,
        candidates: Vec<String>,
    },

    #[error("`{query}` is not an available game")]
    UnknownGame { query: String },
}

/// Errors talking to the remote service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON from remote: {0}")]
    Json(#[from] serde_json::Error),

    #[error("remote refused: {0}")]
    Rejected(String),

    #[error("could not obtain a request token from the login page")]
    MissingRequestToken,

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Option(#[from] OptionError),

    #[error("cache error at {path:?}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
