//! Operations tree resolver.
//!
//! The tree is walked depth-first. Each object node derives its own context
//! from a copy of its parent's, so siblings never observe each other's
//! overrides:
//!
//! - `toCreate` replaces the inherited creator.
//! - `toInvite` (string or list) is appended to the inherited invitees.
//! - `options` is merged over the inherited options; the node wins.
//! - `limit` allocates a fresh [`Limit`] and appends it to the inherited list.
//! - `game` emits one [`Operation`] before the node's children are visited.
//! - `children` (or `c`) is resolved with the node's context.
//!
//! A bare string is a `game` inheriting the context verbatim; `null` is
//! ignored. A node whose attributes are malformed is reported and skipped
//! together with its subtree; siblings carry on.

use std::collections::BTreeMap;

use matchmaker_id::{LimitId, OperationId};
use serde_json::{Map, Value};

use crate::{Limit, Operation, Plan, PlanError};

/// Resolves an operations tree into a [`Plan`].
pub fn resolve(root: &Value) -> Plan {
    let mut resolver = Resolver::default();
    resolver.visit(root, &Context::default(), "$");
    Plan {
        operations: resolver.operations,
        limits: resolver.limits,
        errors: resolver.errors,
    }
}

/// Attributes inherited down one branch of the tree.
#[derive(Debug, Clone, Default)]
struct Context {
    to_create: Option<String>,
    to_invite: Vec<String>,
    options: BTreeMap<String, String>,
    limits: Vec<LimitId>,
}

/// Node-local attributes, validated before any of them is applied.
#[derive(Debug, Default)]
struct NodeAttrs {
    to_create: Option<String>,
    to_invite: Vec<String>,
    options: BTreeMap<String, String>,
    limit: Option<u32>,
    game: Option<String>,
}

#[derive(Debug, Default)]
struct Resolver {
    operations: Vec<Operation>,
    limits: Vec<Limit>,
    errors: Vec<PlanError>,
}

impl Resolver {
    fn visit(&mut self, node: &Value, ctx: &Context, path: &str) {
        match node {
            Value::Null => {}
            Value::String(game) => self.emit(game, ctx, path),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.visit(item, ctx, &format!("{path}[{i}]"));
                }
            }
            Value::Object(map) => self.visit_object(map, ctx, path),
            Value::Bool(_) => self.reject(path, "boolean"),
            Value::Number(_) => self.reject(path, "number"),
        }
    }

    fn visit_object(&mut self, map: &Map<String, Value>, parent: &Context, path: &str) {
        let Some(attrs) = self.read_attrs(map, path) else {
            return;
        };

        let mut ctx = parent.clone();
        if let Some(creator) = attrs.to_create {
            ctx.to_create = Some(creator);
        }
        ctx.to_invite.extend(attrs.to_invite);
        ctx.options.extend(attrs.options);
        if let Some(target) = attrs.limit {
            let id = LimitId::from_index(self.limits.len() as u32);
            self.limits.push(Limit {
                id,
                name: format!("Limit {}", self.limits.len() + 1),
                target,
            });
            ctx.limits.push(id);
        }

        if let Some(game) = &attrs.game {
            self.emit(game, &ctx, path);
        }

        for key in ["children", "c"] {
            if let Some(children) = map.get(key) {
                self.visit(children, &ctx, &format!("{path}.{key}"));
            }
        }
    }

    /// Reads every attribute of a node, recording all problems found.
    ///
    /// Returns `None` if any attribute is malformed.
    fn read_attrs(&mut self, map: &Map<String, Value>, path: &str) -> Option<NodeAttrs> {
        let mut attrs = NodeAttrs::default();
        let before = self.errors.len();

        match map.get("toCreate") {
            None | Some(Value::Null) => {}
            Some(Value::String(creator)) => attrs.to_create = Some(creator.clone()),
            Some(_) => self.errors.push(PlanError::InvalidCreator { path: path.into() }),
        }

        match map.get("toInvite") {
            None | Some(Value::Null) => {}
            Some(Value::String(name)) => attrs.to_invite.push(name.clone()),
            Some(Value::Array(names)) => {
                let names: Option<Vec<String>> = names
                    .iter()
                    .map(|n| n.as_str().map(str::to_string))
                    .collect();
                match names {
                    Some(names) => attrs.to_invite = names,
                    None => self.errors.push(PlanError::InvalidInvite { path: path.into() }),
                }
            }
            Some(_) => self.errors.push(PlanError::InvalidInvite { path: path.into() }),
        }

        match map.get("options") {
            None | Some(Value::Null) => {}
            Some(Value::Object(options)) => {
                for (key, value) in options {
                    match option_value(value) {
                        Some(value) => {
                            attrs.options.insert(key.clone(), value);
                        }
                        None => self.errors.push(PlanError::InvalidOptionValue {
                            path: path.into(),
                            key: key.clone(),
                        }),
                    }
                }
            }
            Some(_) => self.errors.push(PlanError::InvalidOptions { path: path.into() }),
        }

        match map.get("limit") {
            None | Some(Value::Null) => {}
            Some(value) => match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(target) => attrs.limit = Some(target),
                None => self.errors.push(PlanError::InvalidLimit { path: path.into() }),
            },
        }

        match map.get("game") {
            None | Some(Value::Null) => {}
            Some(Value::String(game)) => attrs.game = Some(game.clone()),
            Some(_) => self.errors.push(PlanError::InvalidGame { path: path.into() }),
        }

        (self.errors.len() == before).then_some(attrs)
    }

    fn emit(&mut self, game: &str, ctx: &Context, path: &str) {
        let Some(creator) = &ctx.to_create else {
            self.errors.push(PlanError::MissingCreator {
                path: path.into(),
                game: game.to_string(),
            });
            return;
        };

        self.operations.push(Operation {
            id: OperationId::from_index(self.operations.len() as u32),
            game: game.to_string(),
            to_create: creator.clone(),
            to_invite: ctx.to_invite.iter().cloned().collect(),
            options: ctx.options.clone(),
            limits: ctx.limits.clone(),
        });
    }

    fn reject(&mut self, path: &str, kind: &'static str) {
        self.errors.push(PlanError::UnrecognizedNode {
            path: path.into(),
            kind,
        });
    }
}

/// Option values are compared as strings against the remote service.
fn option_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_bare_string_inherits_nothing_without_creator() {
        let plan = resolve(&json!("Azul"));
        assert!(plan.operations.is_empty());
        assert!(matches!(plan.errors[0], PlanError::MissingCreator { .. }));
    }

    #[test]
    fn test_null_root_is_empty() {
        let plan = resolve(&Value::Null);
        assert!(plan.operations.is_empty());
        assert!(plan.is_clean());
    }

    #[test]
    fn test_number_node_is_rejected_with_path() {
        let plan = resolve(&json!({"toCreate": "alice", "children": ["Azul", 7]}));
        assert_eq!(plan.operations.len(), 1);
        assert_eq!(plan.errors.len(), 1);
        assert_eq!(plan.errors[0].path(), "$.children[1]");
    }

    #[test]
    fn test_numeric_option_values_are_stringified() {
        let plan = resolve(&json!({"toCreate": "a", "game": "Azul", "options": {"players": 2}}));
        assert_eq!(plan.operations[0].options["players"], "2");
    }

    #[test]
    fn test_nested_option_value_is_rejected() {
        let plan = resolve(&json!({"toCreate": "a", "game": "Azul", "options": {"x": {"y": 1}}}));
        assert!(plan.operations.is_empty());
        assert!(matches!(
            &plan.errors[0],
            PlanError::InvalidOptionValue { key, .. } if key == "x"
        ));
    }
}
