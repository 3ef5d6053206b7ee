//! In-memory remote service shared by the orchestration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use matchmaker_id::{GameId, PlayerId, TableId};
use matchmaker_plan::{User, Users};
use matchmaker_remote::{
    GameCatalog, GameEntry, GameOptionSchema, Remote, RemoteError, SessionFactory, Table,
    TableOption, TablePlayer,
};
use serde_json::json;

pub struct FakeState {
    pub catalog: GameCatalog,
    pub schemas: BTreeMap<String, GameOptionSchema>,
    /// Known players by full name.
    pub players: BTreeMap<String, PlayerId>,
    /// Accepted passwords by user name.
    pub passwords: BTreeMap<String, String>,
    pub tables: Vec<Table>,
    /// Games whose creation the service refuses.
    pub refuse_games: BTreeSet<String>,
    /// Option changes the service refuses on an existing table.
    pub refuse_options: Vec<TableOption>,
    /// Every call made, e.g. `create Azul` or `invite 1000 bob`.
    pub calls: Vec<String>,
    next_table: u64,
}

impl FakeState {
    fn name_of(&self, player: PlayerId) -> Option<&str> {
        self.players
            .iter()
            .find(|(_, id)| **id == player)
            .map(|(name, _)| name.as_str())
    }

    fn table_mut(&mut self, table: TableId) -> Result<&mut Table, RemoteError> {
        self.tables
            .iter_mut()
            .find(|t| t.id == table)
            .ok_or_else(|| RemoteError::Rejected(format!("no table {table}")))
    }
}

/// Handle on the shared fake service.
#[derive(Clone)]
pub struct Fake {
    state: Arc<Mutex<FakeState>>,
}

impl Fake {
    /// Azul and Hive are listed; alice, bob, carol and dave exist, and alice
    /// and carol can log in with `secret`.
    pub fn new() -> Self {
        let catalog: GameCatalog = [("Azul", 1, "azul"), ("Hive", 2, "hive")]
        .into_iter()
        .map(|(name, id, codename)| {
            (
                name.to_string(),
                GameEntry {
                    id: GameId::new(id),
                    codename: codename.to_string(),
                },
            )
        })
        .collect();

        let azul: GameOptionSchema = serde_json::from_value(json!({
            "options": [
                {"id": "100", "name": "Variant", "values": [
                    {"id": "0", "name": "Standard"}, {"id": "1", "name": "Glass"}
                ]}
            ]
        }))
        .unwrap();

        let players = ["alice", "bob", "carol", "dave"]
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), PlayerId::new(10 + i as u64)))
            .collect();

        let passwords = [("alice", "secret"), ("carol", "secret")]
            .iter()
            .map(|(u, p)| (u.to_string(), p.to_string()))
            .collect();

        Self {
            state: Arc::new(Mutex::new(FakeState {
                catalog,
                schemas: [("azul".to_string(), azul)].into_iter().collect(),
                players,
                passwords,
                tables: Vec::new(),
                refuse_games: BTreeSet::new(),
                refuse_options: Vec::new(),
                calls: Vec::new(),
                next_table: 1000,
            })),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn catalog(&self) -> GameCatalog {
        self.state().catalog.clone()
    }

    pub fn player(&self, name: &str) -> PlayerId {
        self.state().players[name]
    }

    /// Seeds a live table created by `creator` and seating `names`.
    pub fn add_table(&self, game: &str, creator: &str, names: &[&str]) -> TableId {
        let mut state = self.state();
        let id = TableId::new(state.next_table);
        state.next_table += 1;

        let game_id = state.catalog.get(game).unwrap().id;
        let creator = state.players[creator];
        let players = names
            .iter()
            .map(|name| {
                (
                    state.players[*name].to_string(),
                    TablePlayer {
                        fullname: name.to_string(),
                    },
                )
            })
            .collect();

        state.tables.push(Table {
            id,
            game_id,
            table_creator: creator,
            players,
            max_player: None,
            options: BTreeMap::new(),
        });
        id
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

pub fn users() -> Users {
    [
        User::with_password("alice", "secret"),
        User::named("bob"),
        User::with_password("carol", "secret"),
        User::with_password("dave", "letmein"),
    ]
    .into_iter()
    .collect()
}

pub struct FakeSession {
    state: Arc<Mutex<FakeState>>,
    player: Mutex<Option<PlayerId>>,
}

impl FakeSession {
    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn creator(&self) -> Result<PlayerId, RemoteError> {
        self.player
            .lock()
            .unwrap()
            .ok_or_else(|| RemoteError::Rejected("not logged in".into()))
    }
}

#[async_trait]
impl Remote for FakeSession {
    async fn login(&self, username: &str, password: &str) -> Result<bool, RemoteError> {
        self.record(format!("login {username}"));
        let state = self.state.lock().unwrap();
        let accepted = state.passwords.get(username).map(String::as_str) == Some(password);
        if accepted {
            *self.player.lock().unwrap() = state.players.get(username).copied();
        }
        Ok(accepted)
    }

    async fn player_id(&self, name: &str) -> Result<Option<PlayerId>, RemoteError> {
        Ok(self.state.lock().unwrap().players.get(name).copied())
    }

    async fn tables(&self, player: PlayerId) -> Result<Vec<Table>, RemoteError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .tables
            .iter()
            .filter(|t| t.players.contains_key(&player.to_string()) || t.table_creator == player)
            .cloned()
            .collect())
    }

    async fn game_options(&self, codename: &str) -> Result<GameOptionSchema, RemoteError> {
        self.record(format!("options {codename}"));
        Ok(self
            .state
            .lock()
            .unwrap()
            .schemas
            .get(codename)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_table(&self, game: &str) -> Result<(GameEntry, TableId), RemoteError> {
        let creator = self.creator()?;
        self.record(format!("create {game}"));

        let mut state = self.state.lock().unwrap();
        if state.refuse_games.contains(game) {
            return Err(RemoteError::Rejected(format!("cannot create {game}")));
        }
        let (_, entry) = state.catalog.find(game)?;
        let entry = entry.clone();

        let id = TableId::new(state.next_table);
        state.next_table += 1;
        let fullname = state.name_of(creator).unwrap_or_default().to_string();
        state.tables.push(Table {
            id,
            game_id: entry.id,
            table_creator: creator,
            players: [(creator.to_string(), TablePlayer { fullname })]
                .into_iter()
                .collect(),
            max_player: None,
            options: BTreeMap::new(),
        });
        Ok((entry, id))
    }

    async fn set_table_options(
        &self,
        table: TableId,
        options: &[TableOption],
    ) -> Result<(), RemoteError> {
        self.record(format!("configure {table}"));
        let mut state = self.state.lock().unwrap();
        if let Some(refused) = options.iter().find(|o| state.refuse_options.contains(o)) {
            return Err(RemoteError::Rejected(format!("cannot apply {refused:?}")));
        }
        let table = state.table_mut(table)?;
        for option in options {
            match option {
                TableOption::Change { id, value } => {
                    table.options.insert(id.clone(), value.clone());
                }
                TableOption::Players(n) => table.max_player = Some(n.clone()),
                _ => {}
            }
        }
        Ok(())
    }

    async fn invite_player(&self, table: TableId, player: PlayerId) -> Result<(), RemoteError> {
        self.record(format!("invite {table} {player}"));
        let mut state = self.state.lock().unwrap();
        let fullname = state
            .name_of(player)
            .ok_or_else(|| RemoteError::Rejected(format!("unknown player {player}")))?
            .to_string();
        state
            .table_mut(table)?
            .players
            .insert(player.to_string(), TablePlayer { fullname });
        Ok(())
    }

    async fn open_table(&self, table: TableId) -> Result<(), RemoteError> {
        self.record(format!("open {table}"));
        Ok(())
    }

    async fn logout(&self) -> Result<(), RemoteError> {
        self.record("logout".to_string());
        *self.player.lock().unwrap() = None;
        Ok(())
    }
}

#[async_trait]
impl SessionFactory for Fake {
    async fn game_catalog(&self) -> Result<GameCatalog, RemoteError> {
        Ok(self.catalog())
    }

    async fn open_session(&self) -> Result<Box<dyn Remote>, RemoteError> {
        Ok(Box::new(FakeSession {
            state: self.state.clone(),
            player: Mutex::new(None),
        }))
    }
}
