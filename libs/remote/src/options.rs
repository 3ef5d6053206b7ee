//! User-facing table options and their resolution.
//!
//! Option names in the configuration are either built-in table settings
//! (`mode`, `speed`, `minrep`, `presentation`, `levels`, `players`,
//! `restrictgroup`, `lang`), raw numeric option ids, or display names of
//! game-specific options looked up in the game's [`GameOptionSchema`].

use std::collections::BTreeMap;

use crate::{GameOptionSchema, OptionError};

/// Presentation text applied when the configuration sets none.
pub const DEFAULT_PRESENTATION: &str = "Created by matchmaker";

/// Options applied through dedicated endpoints rather than `changeoption`.
///
/// Live tables do not expose their values in `Table::options`, so they cannot
/// be verified when matching.
pub const SIDE_CHANNEL_OPTIONS: [&str; 7] = [
    "mode",
    "minrep",
    "presentation",
    "levels",
    "players",
    "restrictgroup",
    "lang",
];

const MODE_OPTION_ID: &str = "201";
const SPEED_OPTION_ID: &str = "200";

const MODES: [(&str, u8); 2] = [("normal", 0), ("training", 1)];

const SPEEDS: [(&str, u8); 12] = [
    ("fast", 0),
    ("normal", 1),
    ("slow", 2),
    ("24/day", 10),
    ("12/day", 11),
    ("8/day", 12),
    ("4/day", 13),
    ("3/day", 14),
    ("2/day", 15),
    ("1/day", 17),
    ("1/2days", 19),
    ("nolimit", 20),
];

const KARMA: [(&str, u8); 5] = [("0", 0), ("50", 1), ("65", 2), ("75", 3), ("85", 4)];

const LEVELS: [&str; 7] = [
    "beginner",
    "apprentice",
    "average",
    "good",
    "strong",
    "expert",
    "master",
];

/// One change to apply to a table under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOption {
    /// A `changeoption` call: game options, mode and speed.
    Change { id: String, value: String },
    /// Minimum karma, as an index into the reputation steps.
    MinReputation(u8),
    Presentation(String),
    /// Inclusive range of accepted player levels.
    Levels { min: u8, max: u8 },
    /// Exact number of wanted players.
    Players(String),
    /// Restrict to the creator's group whose name starts with this text.
    RestrictGroup(String),
    Language(String),
}

impl TableOption {
    /// Endpoint path applying this change.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Change { .. } => "/table/table/changeoption.html",
            Self::MinReputation(_) => "/table/table/changeTableAccessReputation.html",
            Self::Presentation(_) => "/table/table/setpresentation.html",
            Self::Levels { .. } => "/table/table/changeTableAccessLevel.html",
            Self::Players(_) => "/table/table/changeWantedPlayers.html",
            Self::RestrictGroup(_) => "/table/table/restrictToGroup.html",
            Self::Language(_) => "/table/table/restrictToLanguage.html",
        }
    }

    /// Query parameters for the endpoint, excluding the table id.
    ///
    /// `RestrictGroup` needs the group id, which only the table page knows;
    /// its parameters are filled in by the session.
    pub fn params(&self) -> Vec<(String, String)> {
        let pair = |k: &str, v: String| (k.to_string(), v);
        match self {
            Self::Change { id, value } => vec![pair("id", id.clone()), pair("value", value.clone())],
            Self::MinReputation(karma) => vec![pair("karma", karma.to_string())],
            Self::Presentation(text) => vec![pair("value", text.clone())],
            Self::Levels { min, max } => (0..LEVELS.len() as u8)
                .map(|i| pair(&format!("level{i}"), (*min <= i && i <= *max).to_string()))
                .collect(),
            Self::Players(n) => vec![pair("minp", n.clone()), pair("maxp", n.clone())],
            Self::RestrictGroup(_) => Vec::new(),
            Self::Language(lang) => vec![pair("lang", lang.clone())],
        }
    }
}

/// Plans every change needed to configure a new table.
///
/// `mode = normal` and the default presentation are applied unless the
/// configuration overrides them.
pub fn parse_options(
    options: &BTreeMap<String, String>,
    schema: &GameOptionSchema,
) -> Result<Vec<TableOption>, OptionError> {
    let mut merged: Vec<(&str, &str)> = Vec::with_capacity(options.len() + 2);
    if !options.contains_key("mode") {
        merged.push(("mode", "normal"));
    }
    if !options.contains_key("presentation") {
        merged.push(("presentation", DEFAULT_PRESENTATION));
    }
    merged.extend(options.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    merged
        .into_iter()
        .map(|(name, value)| parse_option(name, value, schema))
        .collect()
}

fn parse_option(
    name: &str,
    value: &str,
    schema: &GameOptionSchema,
) -> Result<TableOption, OptionError> {
    let unknown_value = || OptionError::UnknownValue {
        option: name.to_string(),
        value: value.to_string(),
    };

    Ok(match name {
        "minrep" => TableOption::MinReputation(lookup(&KARMA, value).ok_or_else(unknown_value)?),
        "presentation" => TableOption::Presentation(value.to_string()),
        "levels" => {
            let lowered = value.to_lowercase();
            let (min, max) = lowered.split_once('-').ok_or_else(unknown_value)?;
            let level = |l: &str| LEVELS.iter().position(|x| *x == l).map(|i| i as u8);
            TableOption::Levels {
                min: level(min).ok_or_else(unknown_value)?,
                max: level(max).ok_or_else(unknown_value)?,
            }
        }
        "players" => TableOption::Players(value.to_string()),
        "restrictgroup" => TableOption::RestrictGroup(value.to_string()),
        "lang" => TableOption::Language(value.to_string()),
        _ => {
            let (id, value) = resolve_option(name, value, schema)?;
            TableOption::Change { id, value }
        }
    })
}

/// Resolves an option applied through `changeoption` to its
/// `(option id, value id)` pair, as stored in a live table's options.
///
/// Handles `mode`, `speed`, all-digit option ids (passed through verbatim)
/// and game option display names.
pub fn resolve_option(
    name: &str,
    value: &str,
    schema: &GameOptionSchema,
) -> Result<(String, String), OptionError> {
    let unknown_value = || OptionError::UnknownValue {
        option: name.to_string(),
        value: value.to_string(),
    };

    match name {
        "mode" => {
            let mode = lookup(&MODES, value).ok_or_else(unknown_value)?;
            Ok((MODE_OPTION_ID.to_string(), mode.to_string()))
        }
        "speed" => {
            let speed = lookup(&SPEEDS, value).ok_or_else(unknown_value)?;
            Ok((SPEED_OPTION_ID.to_string(), speed.to_string()))
        }
        _ if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) => {
            Ok((name.to_string(), value.to_string()))
        }
        _ => {
            let (id, value) = schema.lookup(name, value)?;
            Ok((id.to_string(), value.to_string()))
        }
    }
}

fn lookup(table: &[(&str, u8)], key: &str) -> Option<u8> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn schema() -> GameOptionSchema {
        serde_json::from_value(json!({
            "options": [
                {"id": "100", "name": "Expansion", "values": [
                    {"id": "0", "name": "None"}, {"id": "1", "name": "Inns"}
                ]}
            ]
        }))
        .unwrap()
    }

    fn opts(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_are_applied_first() {
        let planned = parse_options(&BTreeMap::new(), &schema()).unwrap();
        assert_eq!(
            planned,
            vec![
                TableOption::Change {
                    id: "201".into(),
                    value: "0".into()
                },
                TableOption::Presentation(DEFAULT_PRESENTATION.into()),
            ]
        );
    }

    #[test]
    fn test_user_mode_overrides_default() {
        let planned = parse_options(&opts(&[("mode", "training")]), &schema()).unwrap();
        assert_eq!(planned.len(), 2);
        assert!(planned.contains(&TableOption::Change {
            id: "201".into(),
            value: "1".into()
        }));
    }

    #[rstest]
    #[case("speed", "1/day", TableOption::Change { id: "200".into(), value: "17".into() })]
    #[case("minrep", "75", TableOption::MinReputation(3))]
    #[case("players", "3", TableOption::Players("3".into()))]
    #[case("lang", "fr", TableOption::Language("fr".into()))]
    #[case("restrictgroup", "Friends", TableOption::RestrictGroup("Friends".into()))]
    #[case("levels", "Good-Expert", TableOption::Levels { min: 3, max: 5 })]
    #[case("110", "4", TableOption::Change { id: "110".into(), value: "4".into() })]
    #[case("Expansion", "Inns", TableOption::Change { id: "100".into(), value: "1".into() })]
    fn test_single_option(#[case] name: &str, #[case] value: &str, #[case] expected: TableOption) {
        assert_eq!(parse_option(name, value, &schema()).unwrap(), expected);
    }

    #[rstest]
    #[case("speed", "warp")]
    #[case("minrep", "99")]
    #[case("levels", "good")]
    #[case("levels", "good-godlike")]
    #[case("mode", "ranked")]
    #[case("Expansion", "Cathars")]
    fn test_unknown_values(#[case] name: &str, #[case] value: &str) {
        assert!(matches!(
            parse_option(name, value, &schema()).unwrap_err(),
            OptionError::UnknownValue { .. }
        ));
    }

    #[test]
    fn test_unknown_option_name() {
        let err = parse_options(&opts(&[("Variant", "B")]), &schema()).unwrap_err();
        assert_eq!(
            err,
            OptionError::UnknownOption {
                option: "Variant".into()
            }
        );
    }

    #[test]
    fn test_levels_params() {
        let params = TableOption::Levels { min: 1, max: 2 }.params();
        let enabled: Vec<_> = params
            .iter()
            .filter(|(_, v)| v == "true")
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(params.len(), 7);
        assert_eq!(enabled, vec!["level1", "level2"]);
    }

    #[test]
    fn test_players_sets_min_and_max() {
        assert_eq!(
            TableOption::Players("4".into()).params(),
            vec![("minp".into(), "4".into()), ("maxp".into(), "4".into())]
        );
    }
}
