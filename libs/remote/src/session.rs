//! Session traits implemented by remote clients.

use async_trait::async_trait;
use matchmaker_id::{PlayerId, TableId};

use crate::{GameCatalog, GameEntry, GameOptionSchema, RemoteError, Table, TableOption};

/// One authenticated session with the remote service.
///
/// Calls mutate shared remote state (the session, the table under
/// construction) and must be issued one at a time.
#[async_trait]
pub trait Remote: Send + Sync {
    /// Log in. Returns true iff privileged calls now succeed.
    async fn login(&self, username: &str, password: &str) -> Result<bool, RemoteError>;

    /// Look up a player by name. `None` if no such player exists.
    async fn player_id(&self, name: &str) -> Result<Option<PlayerId>, RemoteError>;

    /// Tables currently live for a player, in the order the service lists them.
    async fn tables(&self, player: PlayerId) -> Result<Vec<Table>, RemoteError>;

    /// The option schema of a game, by codename.
    async fn game_options(&self, codename: &str) -> Result<GameOptionSchema, RemoteError>;

    /// Create a table for a game display name (or unambiguous prefix).
    async fn create_table(&self, game: &str) -> Result<(GameEntry, TableId), RemoteError>;

    /// Apply planned option changes to a table under construction.
    async fn set_table_options(
        &self,
        table: TableId,
        options: &[TableOption],
    ) -> Result<(), RemoteError>;

    async fn invite_player(&self, table: TableId, player: PlayerId) -> Result<(), RemoteError>;

    /// Open the table to the invited players.
    async fn open_table(&self, table: TableId) -> Result<(), RemoteError>;

    async fn logout(&self) -> Result<(), RemoteError>;

    /// Release transport resources. Nothing is required by default.
    async fn close(&self) {}
}

/// Opens sessions and serves the public game catalog.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Games available for table creation, keyed by display name.
    async fn game_catalog(&self) -> Result<GameCatalog, RemoteError>;

    /// Open a fresh, unauthenticated session.
    async fn open_session(&self) -> Result<Box<dyn Remote>, RemoteError>;
}
