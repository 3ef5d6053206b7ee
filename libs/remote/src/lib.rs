//! # matchmaker-remote
//!
//! Everything the engine knows about the remote table service.
//!
//! - [`Remote`] is one authenticated session; [`SessionFactory`] opens
//!   sessions and serves the (public) game catalog.
//! - [`Table`], [`GameCatalog`] and [`GameOptionSchema`] are read-only
//!   snapshots of remote state.
//! - [`parse_options`] and [`resolve_option`] turn user-facing option names
//!   into typed [`TableOption`] changes, failing with a closed
//!   [`OptionError`].
//! - [`FileCache`] is a time-boxed read-through cache for slow-changing
//!   remote documents.
//! - [`bga`] is the HTTP implementation of the boundary.

pub mod bga;
mod cache;
mod de;
mod error;
mod model;
mod options;
mod session;

pub use cache::FileCache;
pub use error::{OptionError, RemoteError};
pub use model::{GameCatalog, GameEntry, GameOption, GameOptionSchema, OptionChoice, Table, TablePlayer};
pub use options::{
    parse_options, resolve_option, TableOption, DEFAULT_PRESENTATION, SIDE_CHANNEL_OPTIONS,
};
pub use session::{Remote, SessionFactory};

pub use matchmaker_id::{GameId, PlayerId, TableId};
