//! Reading configuration files from disk.

use std::path::Path;

use serde_json::Value;

use crate::{parse_users, resolve, LoadError, Plan, Users};

fn read_json(path: &Path) -> Result<Value, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads and parses the users file.
pub fn load_users(path: &Path) -> Result<Users, LoadError> {
    parse_users(read_json(path)?)
}

/// Loads the operations file and resolves it.
///
/// Only unreadable or non-JSON files are errors here; structural problems are
/// reported in [`Plan::errors`].
pub fn load_operations(path: &Path) -> Result<Plan, LoadError> {
    Ok(resolve(&read_json(path)?))
}
