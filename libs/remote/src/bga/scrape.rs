//! Extraction of data embedded in HTML pages.

use std::sync::LazyLock;

use matchmaker_id::GameId;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{GameCatalog, GameEntry, RemoteError};

static REQUEST_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"requestToken: '([0-9a-f]*)',").expect("Invalid request token regex")
});

static GROUP_SELECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<select id="restrictToGroup">([\s\S]*?)</select>"#)
        .expect("Invalid group select regex")
});

static GROUP_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(\d*)">([^<]*)"#).expect("Invalid group option regex"));

const NOT_LOGGED_IN: &str = "You must be logged in to see this page.";

/// The CSRF token embedded in the account page.
pub fn request_token(html: &str) -> Option<String> {
    REQUEST_TOKEN
        .captures(html)
        .map(|c| c[1].to_string())
        .filter(|token| !token.is_empty())
}

/// Returns false if the page is the "must be logged in" notice.
pub fn is_logged_in(html: &str) -> bool {
    !html.contains(NOT_LOGGED_IN)
}

/// `(group id, group name)` pairs offered by a table's group restriction.
pub fn group_options(html: &str) -> Vec<(String, String)> {
    let Some(select) = GROUP_SELECT.find(html) else {
        return Vec::new();
    };
    GROUP_OPTION
        .captures_iter(select.as_str())
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect()
}

#[derive(Deserialize)]
struct ListedGame {
    display_name_en: String,
    id: GameId,
    name: String,
}

/// Reads the game catalog from the `globalUserInfos=` assignment of the
/// public game list page.
pub fn parse_game_list(html: &str) -> Result<GameCatalog, RemoteError> {
    let line = html
        .lines()
        .find(|line| line.contains("globalUserInfos="))
        .ok_or_else(|| RemoteError::UnexpectedResponse("game list not found in page".into()))?;
    let start = line
        .find('{')
        .ok_or_else(|| RemoteError::UnexpectedResponse("game list is not an object".into()))?;
    let infos: Value = serde_json::from_str(line[start..].trim_end().trim_end_matches(';'))?;

    let listed = infos
        .get("game_list")
        .and_then(Value::as_array)
        .ok_or_else(|| RemoteError::UnexpectedResponse("missing game_list".into()))?;

    Ok(listed
        .iter()
        .filter_map(|game| match ListedGame::deserialize(game) {
            Ok(game) => Some((
                game.display_name_en,
                GameEntry {
                    id: game.id,
                    codename: game.name,
                },
            )),
            Err(e) => {
                debug!(error = %e, "Skipping malformed game list entry");
                None
            }
        })
        .collect())
}
