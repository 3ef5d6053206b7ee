//! Resolved configuration model.

use std::collections::{BTreeMap, BTreeSet};

use matchmaker_id::{LimitId, OperationId};
use serde::Serialize;

use crate::PlanError;

/// A named cap on how many operations sharing it may be fulfilled in a run.
///
/// Limits are shared by identity ([`LimitId`]), never by name or target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Limit {
    pub id: LimitId,
    /// Display name, `Limit N` with N counted in document order from 1.
    pub name: String,
    pub target: u32,
}

/// One desired match, fully resolved from the operations tree.
///
/// Operations are distinct by [`OperationId`]; two operations with identical
/// fields are still two separate entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: OperationId,
    pub game: String,
    pub to_create: String,
    pub to_invite: BTreeSet<String>,
    pub options: BTreeMap<String, String>,
    pub limits: Vec<LimitId>,
}

impl Operation {
    /// Everyone who should be seated at the table, creator included.
    pub fn participants(&self) -> BTreeSet<&str> {
        self.to_invite
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.to_create.as_str()))
            .collect()
    }

    /// Returns true if the creator also appears among the invitees.
    pub fn invites_self(&self) -> bool {
        self.to_invite.contains(&self.to_create)
    }
}

/// The result of resolving an operations tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Plan {
    /// Operations in document order of emission.
    pub operations: Vec<Operation>,
    /// Limit arena, indexed by [`LimitId`].
    pub limits: Vec<Limit>,
    /// Structural errors; resolution continued past each of them.
    #[serde(skip)]
    pub errors: Vec<PlanError>,
}

impl Plan {
    /// Looks up a limit by handle.
    pub fn limit(&self, id: LimitId) -> Option<&Limit> {
        self.limits.get(id.slot())
    }

    /// Looks up an operation by handle.
    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(id.slot())
    }

    /// Returns true if resolution met no structural error.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Groups operations by creating account, in order of first appearance.
    pub fn by_creator(&self) -> Vec<(&str, Vec<&Operation>)> {
        let mut groups: Vec<(&str, Vec<&Operation>)> = Vec::new();
        for op in &self.operations {
            match groups.iter_mut().find(|(name, _)| *name == op.to_create) {
                Some((_, ops)) => ops.push(op),
                None => groups.push((op.to_create.as_str(), vec![op])),
            }
        }
        groups
    }
}
