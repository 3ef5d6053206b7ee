use matchmaker_plan::{Plan, Users};
use matchmaker_remote::GameCatalog;

use crate::ConfigError;

/// Collects every configuration error of a plan.
///
/// Structural errors from resolution come first, then per-operation checks
/// in document order: self-invites, unknown or passwordless creators, and
/// games missing from the catalog (exact display name). The batch may only
/// run if the result is empty.
pub fn validate(plan: &Plan, users: &Users, catalog: &GameCatalog) -> Vec<ConfigError> {
    let mut errors: Vec<ConfigError> = plan.errors.iter().cloned().map(ConfigError::from).collect();

    for op in &plan.operations {
        if op.invites_self() {
            errors.push(ConfigError::SelfInvite {
                operation: op.id,
                user: op.to_create.clone(),
            });
        }

        match users.get(&op.to_create) {
            None => errors.push(ConfigError::UnknownCreator {
                operation: op.id,
                user: op.to_create.clone(),
            }),
            Some(user) if !user.has_password() => errors.push(ConfigError::MissingPassword {
                operation: op.id,
                user: op.to_create.clone(),
            }),
            Some(_) => {}
        }

        if catalog.get(&op.game).is_none() {
            errors.push(ConfigError::UnknownGame {
                operation: op.id,
                game: op.game.clone(),
            });
        }
    }

    errors
}
