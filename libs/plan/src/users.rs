//! Users file parsing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::LoadError;

/// An account known to the run.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub name: String,
    #[serde(skip)]
    pub password: Option<String>,
}

impl User {
    /// Creates a user without a password.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: None,
        }
    }

    /// Creates a user able to log in.
    pub fn with_password(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: Some(password.into()),
        }
    }

    /// Returns true if this user can authenticate.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Users keyed by name. A later entry with the same name replaces an earlier one.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Users(BTreeMap<String, User>);

impl Users {
    pub fn get(&self, name: &str) -> Option<&User> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<User> for Users {
    fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
        Self(iter.into_iter().map(|u| (u.name.clone(), u)).collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UserEntry {
    Name(String),
    Account {
        username: String,
        #[serde(default)]
        password: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UsersFile {
    List(Vec<UserEntry>),
    Wrapped { users: Vec<UserEntry> },
}

/// Parses a users document: a list of entries, or `{"users": [...]}`.
pub fn parse_users(value: Value) -> Result<Users, LoadError> {
    let file: UsersFile = serde_json::from_value(value).map_err(|_| {
        LoadError::InvalidUsers(
            "expected a list of usernames or {\"username\", \"password\"} objects".to_string(),
        )
    })?;

    let entries = match file {
        UsersFile::List(entries) | UsersFile::Wrapped { users: entries } => entries,
    };

    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            UserEntry::Name(name) => User::named(name),
            UserEntry::Account { username, password } => User {
                name: username,
                password,
            },
        })
        .collect())
}
