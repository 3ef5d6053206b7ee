//! Read-only snapshots of remote state.

use std::collections::{BTreeMap, BTreeSet};

use matchmaker_id::{GameId, PlayerId, TableId};
use serde::{Deserialize, Serialize};

use crate::{de, OptionError};

/// A seat at a live table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePlayer {
    pub fullname: String,
}

/// A table that is currently live for some player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub game_id: GameId,
    pub table_creator: PlayerId,
    /// Seated players keyed by player id.
    #[serde(default, deserialize_with = "de::object_map")]
    pub players: BTreeMap<String, TablePlayer>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub max_player: Option<String>,
    /// Game option values keyed by option id.
    #[serde(default, deserialize_with = "de::string_map")]
    pub options: BTreeMap<String, String>,
}

impl Table {
    /// Full names of everyone seated at the table.
    pub fn fullnames(&self) -> BTreeSet<&str> {
        self.players.values().map(|p| p.fullname.as_str()).collect()
    }

    /// The stored value of a game option, compared as a string.
    pub fn option(&self, option_id: &str) -> Option<&str> {
        self.options.get(option_id).map(String::as_str)
    }
}

/// A game as listed in the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEntry {
    pub id: GameId,
    pub codename: String,
}

/// Games keyed by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameCatalog(BTreeMap<String, GameEntry>);

impl GameCatalog {
    /// Exact lookup by display name.
    pub fn get(&self, display_name: &str) -> Option<&GameEntry> {
        self.0.get(display_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Forgiving lookup used when creating a table.
    ///
    /// Names are compared after [`normalize_name`]. An exact normalized match
    /// wins; otherwise the query must be the prefix of exactly one game.
    pub fn find(&self, query: &str) -> Result<(&str, &GameEntry), OptionError> {
        let wanted = normalize_name(query);
        let mut prefixed = Vec::new();

        for (name, entry) in &self.0 {
            let normalized = normalize_name(name);
            if normalized == wanted {
                return Ok((name.as_str(), entry));
            }
            if normalized.starts_with(&wanted) {
                prefixed.push((name.as_str(), entry));
            }
        }

        match prefixed.len() {
            1 => Ok(prefixed[0]),
            0 => Err(OptionError::UnknownGame {
                query: query.to_string(),
            }),
            _ => Err(OptionError::AmbiguousGameName {
                query: query.to_string(),
                candidates: prefixed.iter().map(|(name, _)| name.to_string()).collect(),
            }),
        }
    }
}

impl FromIterator<(String, GameEntry)> for GameCatalog {
    fn from_iter<I: IntoIterator<Item = (String, GameEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Lowercases and keeps only ASCII letters and digits.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// One selectable value of a game option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionChoice {
    #[serde(deserialize_with = "de::string")]
    pub id: String,
    pub name: String,
}

/// A game-specific option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOption {
    #[serde(deserialize_with = "de::string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub values: Vec<OptionChoice>,
}

/// The options a game exposes at table creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptionSchema {
    #[serde(default)]
    pub options: Vec<GameOption>,
}

impl GameOptionSchema {
    /// Resolves an option and one of its values by display name.
    pub fn lookup(&self, option: &str, value: &str) -> Result<(&str, &str), OptionError> {
        let found = self
            .options
            .iter()
            .find(|o| o.name == option)
            .ok_or_else(|| OptionError::UnknownOption {
                option: option.to_string(),
            })?;
        let choice = found
            .values
            .iter()
            .find(|v| v.name == value)
            .ok_or_else(|| OptionError::UnknownValue {
                option: option.to_string(),
                value: value.to_string(),
            })?;
        Ok((found.id.as_str(), choice.id.as_str()))
    }
}
