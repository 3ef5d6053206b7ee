//! # matchmaker-id
//!
//! Typed identifiers used across the matchmaker workspace.
//!
//! ## Two families
//!
//! - **Handles** (`LimitId`, `OperationId`) are assigned locally, in document
//!   order, while the operations tree is resolved. They are the identity key
//!   for arena-style objects: two limits with the same display name and the
//!   same target are still different limits when their handles differ.
//!   Canonical form: `{prefix}_{index}`, e.g. `limit_3`.
//! - **Remote ids** (`PlayerId`, `TableId`, `GameId`) are assigned by the
//!   remote service. Its JSON is inconsistent about quoting, so they
//!   deserialize from either a JSON string or a JSON number and always
//!   serialize as a number.
//!
//! Ids are typed so that a table id can never be passed where a player id is
//! expected.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;
