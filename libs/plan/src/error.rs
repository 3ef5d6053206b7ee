//! Error types for configuration loading and tree resolution.

use std::path::PathBuf;

use thiserror::Error;

/// A structural problem found while resolving the operations tree.
///
/// Every variant carries the JSON path of the node that failed, e.g.
/// `$[0].children[2]`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("{path}: `toInvite` must be a string or a list of strings")]
    InvalidInvite { path: String },

    #[error("{path}: `options` must be an object")]
    InvalidOptions { path: String },

    #[error("{path}: option `{key}` must be a string, number or boolean")]
    InvalidOptionValue { path: String, key: String },

    #[error("{path}: `limit` must be a non-negative integer")]
    InvalidLimit { path: String },

    #[error("{path}: `toCreate` must be a string")]
    InvalidCreator { path: String },

    #[error("{path}: `game` must be a string")]
    InvalidGame { path: String },

    #[error("{path}: game `{game}` has no `toCreate` in scope")]
    MissingCreator { path: String, game: String },

    #[error("{path}: unrecognized node ({kind})")]
    UnrecognizedNode { path: String, kind: &'static str },
}

impl PlanError {
    /// The JSON path of the offending node.
    pub fn path(&self) -> &str {
        match self {
            Self::InvalidInvite { path }
            | Self::InvalidOptions { path }
            | Self::InvalidOptionValue { path, .. }
            | Self::InvalidLimit { path }
            | Self::InvalidCreator { path }
            | Self::InvalidGame { path }
            | Self::MissingCreator { path, .. }
            | Self::UnrecognizedNode { path, .. } => path,
        }
    }
}

/// Errors reading a configuration file from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid users file: {0}")]
    InvalidUsers(String),
}
