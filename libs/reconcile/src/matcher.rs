//! Matching desired operations against live tables.

use std::collections::BTreeSet;

use matchmaker_id::{GameId, PlayerId};
use matchmaker_plan::Operation;
use matchmaker_remote::{
    resolve_option, GameCatalog, GameOptionSchema, OptionError, Table, SIDE_CHANNEL_OPTIONS,
};

/// Returns true if the option cannot be checked against a live table.
pub fn is_side_channel(option: &str) -> bool {
    SIDE_CHANNEL_OPTIONS.contains(&option)
}

/// Returns true if matching the operation needs its game's option schema.
pub fn needs_schema(op: &Operation) -> bool {
    op.options.keys().any(|option| !is_side_channel(option))
}

/// What a live table must look like to fulfil an operation.
struct Expectation<'o> {
    game_id: GameId,
    creator: PlayerId,
    participants: BTreeSet<&'o str>,
    players: Option<&'o str>,
    options: Vec<(String, String)>,
}

impl Expectation<'_> {
    fn is_met_by(&self, table: &Table) -> bool {
        if table.game_id != self.game_id || table.table_creator != self.creator {
            return false;
        }

        let seated = table.fullnames();
        if !self.participants.is_subset(&seated) {
            return false;
        }

        if let Some(players) = self.players {
            if table.max_player.as_deref() != Some(players) {
                return false;
            }
        }

        self.options
            .iter()
            .all(|(id, value)| table.option(id) == Some(value.as_str()))
    }
}

/// Finds the first live table that already fulfils `op`.
///
/// A table qualifies when it is for the same game, was created by `creator`,
/// seats every participant (extra seats are allowed) and carries the
/// operation's verifiable options. Options in [`SIDE_CHANNEL_OPTIONS`] other
/// than `players` are not checked.
///
/// Fails only if the game or an option cannot be resolved; the caller treats
/// that as "no match" for this operation alone.
pub fn find_match<'t, I>(
    op: &Operation,
    creator: PlayerId,
    tables: I,
    catalog: &GameCatalog,
    schema: &GameOptionSchema,
) -> Result<Option<&'t Table>, OptionError>
where
    I: IntoIterator<Item = &'t Table>,
{
    let game = catalog
        .get(&op.game)
        .ok_or_else(|| OptionError::UnknownGame {
            query: op.game.clone(),
        })?;

    let options = op
        .options
        .iter()
        .filter(|(name, _)| !is_side_channel(name))
        .map(|(name, value)| resolve_option(name, value, schema))
        .collect::<Result<Vec<_>, _>>()?;

    let expectation = Expectation {
        game_id: game.id,
        creator,
        participants: op.participants(),
        players: op.options.get("players").map(String::as_str),
        options,
    };

    Ok(tables.into_iter().find(|table| expectation.is_met_by(table)))
}
