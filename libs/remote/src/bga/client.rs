//! Cookie-based session against the table service website.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use matchmaker_id::{PlayerId, TableId};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::scrape;
use crate::{
    FileCache, GameCatalog, GameEntry, GameOptionSchema, Remote, RemoteError, Table, TableOption,
};

/// Public site of the table service.
pub const DEFAULT_BASE_URL: &str = "https://boardgamearena.com";

/// Pause inserted before every request.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

const SESSION_COOKIE: &str = "TournoiEnLigneidt";
const REQUEST_TOKEN_HEADER: &str = "X-Request-Token";

/// Connection settings for the table service.
#[derive(Debug, Clone)]
pub struct BgaConfig {
    pub base_url: String,
    pub request_delay: Duration,
    pub timeout: Duration,
}

impl Default for BgaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_delay: DEFAULT_REQUEST_DELAY,
            timeout: Duration::from_secs(30),
        }
    }
}

impl BgaConfig {
    fn url(&self) -> Result<Url, RemoteError> {
        Url::parse(&self.base_url).map_err(|e| {
            RemoteError::UnexpectedResponse(format!("invalid base url {}: {e}", self.base_url))
        })
    }
}

/// One session with the table service.
pub struct BgaClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    site: Url,
    base_url: String,
    request_token: String,
    delay: Duration,
    catalog: Arc<GameCatalog>,
    cache: Option<FileCache>,
}

impl BgaClient {
    /// Open a session and obtain its request token.
    pub async fn connect(
        config: &BgaConfig,
        catalog: Arc<GameCatalog>,
        cache: Option<FileCache>,
    ) -> Result<Self, RemoteError> {
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .timeout(config.timeout)
            .build()?;

        let mut client = Self {
            http,
            jar,
            site: config.url()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_token: String::new(),
            delay: config.request_delay,
            catalog,
            cache,
        };

        let page = client.get_text("/account", &[]).await?;
        client.request_token =
            scrape::request_token(&page).ok_or(RemoteError::MissingRequestToken)?;
        debug!("Obtained request token");

        Ok(client)
    }

    /// Fetch the public game catalog. No session is needed.
    pub async fn fetch_game_catalog(config: &BgaConfig) -> Result<GameCatalog, RemoteError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let url = format!("{}/gamelist", config.base_url.trim_end_matches('/'));

        tokio::time::sleep(config.request_delay).await;
        debug!(url = %url, "Fetching game list");
        let page = http
            .get(&url)
            .query(&[("section", "all")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let catalog = scrape::parse_game_list(&page)?;
        info!(games = catalog.len(), "Loaded game catalog");
        Ok(catalog)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// The session cookie once logged in, the page token before that.
    fn token(&self) -> String {
        self.jar
            .cookies(&self.site)
            .and_then(|header| {
                header.to_str().ok().and_then(|cookies| {
                    cookies.split("; ").find_map(|cookie| {
                        cookie
                            .strip_prefix(SESSION_COOKIE)
                            .and_then(|rest| rest.strip_prefix('='))
                            .map(str::to_string)
                    })
                })
            })
            .unwrap_or_else(|| self.request_token.clone())
    }

    async fn get_text(&self, path: &str, params: &[(&str, String)]) -> Result<String, RemoteError> {
        tokio::time::sleep(self.delay).await;
        let url = self.url(path);
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("dojo.preventCache", prevent_cache())])
            .header(REQUEST_TOKEN_HEADER, self.token())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }

    async fn post_text(&self, path: &str, form: &[(&str, String)]) -> Result<String, RemoteError> {
        tokio::time::sleep(self.delay).await;
        let url = self.url(path);
        debug!(url = %url, "POST");

        let response = self
            .http
            .post(&url)
            .form(form)
            .header(REQUEST_TOKEN_HEADER, self.token())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, RemoteError> {
        let text = self.get_text(path, params).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Leave any game session left open by a previous run.
    async fn quit_playing_with_friends(&self) -> Result<(), RemoteError> {
        self.get_text("/group/group/removeAllFromGameSession.html", &[])
            .await?;
        Ok(())
    }

    async fn apply_option(
        &self,
        table: TableId,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<(), RemoteError> {
        let mut query: Vec<(&str, String)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.clone()))
            .collect();
        query.push(("table", table.to_string()));

        let text = self.get_text(path, &query).await?;
        if let Ok(value) = serde_json::from_str::<Value>(&text) {
            check_status(&value)?;
        }
        Ok(())
    }

    async fn restrict_to_group(&self, table: TableId, prefix: &str) -> Result<(), RemoteError> {
        let page = self
            .get_text("/table", &[("nr", "true".into()), ("table", table.to_string())])
            .await?;
        let groups = scrape::group_options(&page);

        let Some((group_id, _)) = groups.iter().rev().find(|(_, name)| name.starts_with(prefix))
        else {
            let names: Vec<&str> = groups.iter().map(|(_, name)| name.as_str()).collect();
            return Err(RemoteError::Rejected(format!(
                "no group starting with `{prefix}`; member of [{}]",
                names.join(", ")
            )));
        };

        self.apply_option(
            table,
            TableOption::RestrictGroup(prefix.to_string()).path(),
            vec![("group".to_string(), group_id.clone())],
        )
        .await
    }

    async fn fetch_game_options(&self, codename: &str) -> Result<GameOptionSchema, RemoteError> {
        let text = self
            .post_text(
                "/gamelist/gamelist/gameDetails.html",
                &[("game", codename.to_string())],
            )
            .await?;
        let value: Value = serde_json::from_str(&text)?;
        check_status(&value)?;

        let results = value.get("results").cloned().ok_or_else(|| {
            RemoteError::UnexpectedResponse(format!("no details for game {codename}"))
        })?;
        Ok(GameOptionSchema::deserialize(results)?)
    }
}

#[async_trait]
impl Remote for BgaClient {
    async fn login(&self, username: &str, password: &str) -> Result<bool, RemoteError> {
        let form = [
            ("email", username.to_string()),
            ("password", password.to_string()),
            ("rememberme", "on".to_string()),
            ("redirect", String::new()),
            ("request_token", self.request_token.clone()),
            ("form_id", "loginform".to_string()),
            ("dojo.preventCache", prevent_cache()),
        ];
        self.post_text("/account/account/login.html", &form).await?;

        let page = self.get_text("/community", &[]).await?;
        let logged_in = scrape::is_logged_in(&page);
        if logged_in {
            info!(username, "Logged in");
        } else {
            warn!(username, "Login was not accepted");
        }
        Ok(logged_in)
    }

    async fn player_id(&self, name: &str) -> Result<Option<PlayerId>, RemoteError> {
        let value = self
            .get_json(
                "/player/player/findplayer.html",
                &[
                    ("nofriends", String::new()),
                    ("q", name.to_string()),
                    ("start", "0".to_string()),
                    ("count", "Infinity".to_string()),
                ],
            )
            .await?;

        let items = value
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let exact = items
            .iter()
            .find(|item| item.get("fullname").and_then(Value::as_str) == Some(name));

        match exact.or(items.first()).and_then(|item| item.get("id")) {
            Some(id) => Ok(Some(PlayerId::deserialize(id)?)),
            None => Ok(None),
        }
    }

    async fn tables(&self, player: PlayerId) -> Result<Vec<Table>, RemoteError> {
        let value = self
            .get_json(
                "/tablemanager/tablemanager/tableinfos.html",
                &[
                    ("playerfilter", player.to_string()),
                    ("status", "play".to_string()),
                ],
            )
            .await?;

        let tables = value
            .get("data")
            .and_then(|data| data.get("tables"))
            .ok_or_else(|| {
                RemoteError::UnexpectedResponse(format!("could not load tables for {player}"))
            })?;

        match tables {
            Value::Object(map) => Ok(map
                .iter()
                .filter_map(|(id, table)| match Table::deserialize(table) {
                    Ok(table) => Some(table),
                    Err(e) => {
                        warn!(table = %id, error = %e, "Skipping malformed table");
                        None
                    }
                })
                .collect()),
            Value::Array(list) if list.is_empty() => Ok(Vec::new()),
            other => Err(RemoteError::UnexpectedResponse(format!(
                "tables is not an object: {other}"
            ))),
        }
    }

    async fn game_options(&self, codename: &str) -> Result<GameOptionSchema, RemoteError> {
        match &self.cache {
            Some(cache) => {
                cache
                    .get_or_fetch(&format!("options-{codename}"), || {
                        self.fetch_game_options(codename)
                    })
                    .await
            }
            None => self.fetch_game_options(codename).await,
        }
    }

    async fn create_table(&self, game: &str) -> Result<(GameEntry, TableId), RemoteError> {
        self.quit_playing_with_friends().await?;

        let (name, entry) = self.catalog.find(game)?;
        let entry = entry.clone();
        debug!(game = name, id = %entry.id, "Creating table");

        let value = self
            .get_json(
                "/table/table/createnew.html",
                &[
                    ("game", entry.id.to_string()),
                    ("forceManual", "true".to_string()),
                    ("is_meeting", "false".to_string()),
                ],
            )
            .await?;
        check_status(&value)?;

        let table = value
            .get("data")
            .and_then(|data| data.get("table"))
            .ok_or_else(|| RemoteError::UnexpectedResponse("created table has no id".into()))?;
        let table = TableId::deserialize(table)?;

        info!(game = name, table = %table, "Created table");
        Ok((entry, table))
    }

    async fn set_table_options(
        &self,
        table: TableId,
        options: &[TableOption],
    ) -> Result<(), RemoteError> {
        for option in options {
            match option {
                TableOption::RestrictGroup(prefix) => self.restrict_to_group(table, prefix).await?,
                other => {
                    self.apply_option(table, other.path(), other.params())
                        .await?
                }
            }
        }
        Ok(())
    }

    async fn invite_player(&self, table: TableId, player: PlayerId) -> Result<(), RemoteError> {
        let value = self
            .get_json(
                "/table/table/invitePlayer.html",
                &[("table", table.to_string()), ("player", player.to_string())],
            )
            .await?;
        check_status(&value)
    }

    async fn open_table(&self, table: TableId) -> Result<(), RemoteError> {
        self.get_text(
            "/table/table/openTableNow.html",
            &[("table", table.to_string())],
        )
        .await?;
        info!(table = %table, "Opened table");
        Ok(())
    }

    async fn logout(&self) -> Result<(), RemoteError> {
        self.get_text("/account/account/logout.html", &[]).await?;
        debug!("Logged out");
        Ok(())
    }
}

/// Fails with the remote's message when a response reports `status: 0`.
fn check_status(value: &Value) -> Result<(), RemoteError> {
    let refused = match value.get("status") {
        Some(Value::String(s)) => s == "0",
        Some(Value::Number(n)) => n.as_i64() == Some(0),
        Some(Value::Bool(b)) => !b,
        _ => false,
    };
    if !refused {
        return Ok(());
    }

    let message = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("request refused");
    Err(RemoteError::Rejected(message.to_string()))
}

fn prevent_cache() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}
