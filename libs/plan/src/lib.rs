//! # matchmaker-plan
//!
//! Turns the declarative configuration into a flat worklist.
//!
//! ## Inputs
//!
//! - A **users file**: a list (or `{"users": [...]}`) of plain usernames or
//!   `{"username", "password"}` objects.
//! - An **operations tree**: nested nodes carrying `toCreate`, `toInvite`,
//!   `options`, `limit`, `game` and `children` (alias `c`). Attributes are
//!   inherited down each branch; every node with a `game` emits one
//!   [`Operation`].
//!
//! ## Output
//!
//! A [`Plan`]: operations in document order, the arena of [`Limit`]s they
//! reference by [`LimitId`], and the structural errors met on the way.
//! Resolution is best-effort; the caller decides whether errors are fatal.

mod error;
mod load;
mod model;
mod resolve;
mod users;

pub use error::{LoadError, PlanError};
pub use load::{load_operations, load_users};
pub use model::{Limit, Operation, Plan};
pub use resolve::resolve;
pub use users::{parse_users, User, Users};

pub use matchmaker_id::{LimitId, OperationId};
