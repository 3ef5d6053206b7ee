//! Runs a validated plan against the remote service, one account at a time.

use std::collections::{BTreeMap, BTreeSet};

use matchmaker_id::{OperationId, PlayerId, TableId};
use matchmaker_plan::{Operation, Plan, User, Users};
use matchmaker_remote::{
    parse_options, GameCatalog, GameOptionSchema, OptionError, Remote, RemoteError,
    SessionFactory, Table, TableOption,
};
use rand::Rng;
use tracing::{debug, error, info, instrument, warn};

use crate::matcher::{find_match, needs_schema};
use crate::{LimitLedger, OperationReport, Outcome, QuotaScheduler, RunError, RunReport};

/// Run-wide switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSettings {
    /// Select operations as usual but make no mutating remote call.
    pub dry_run: bool,
}

/// A creation that did not complete. `table` is set once the remote table
/// exists, in which case it holds a slot of every limit of the operation.
struct CreateFailure {
    table: Option<TableId>,
    error: RemoteError,
}

impl From<RemoteError> for CreateFailure {
    fn from(error: RemoteError) -> Self {
        Self { table: None, error }
    }
}

/// Option schemas fetched during one account's pass, by codename.
#[derive(Default)]
struct SchemaCache(BTreeMap<String, GameOptionSchema>);

impl SchemaCache {
    async fn get(
        &mut self,
        remote: &dyn Remote,
        codename: &str,
    ) -> Result<&GameOptionSchema, RemoteError> {
        if !self.0.contains_key(codename) {
            let schema = remote.game_options(codename).await?;
            self.0.insert(codename.to_string(), schema);
        }
        Ok(&self.0[codename])
    }
}

/// Reconciles every account of a plan.
///
/// The plan must have passed [`validate`](crate::validate). Accounts are
/// processed sequentially in order of first appearance and share one
/// [`LimitLedger`]. A failure of one account skips its operations and
/// leaves the others untouched.
pub struct Orchestrator<'a> {
    factory: &'a dyn SessionFactory,
    catalog: &'a GameCatalog,
    settings: RunSettings,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        factory: &'a dyn SessionFactory,
        catalog: &'a GameCatalog,
        settings: RunSettings,
    ) -> Self {
        Self {
            factory,
            catalog,
            settings,
        }
    }

    #[instrument(skip_all, fields(operations = plan.operations.len(), dry_run = self.settings.dry_run))]
    pub async fn run<R: Rng + ?Sized>(&self, plan: &Plan, users: &Users, rng: &mut R) -> RunReport {
        let mut ledger = LimitLedger::new(&plan.limits);
        let mut report = RunReport::default();

        for (creator, ops) in plan.by_creator() {
            let result = match users.get(creator) {
                Some(user) => self.run_account(user, &ops, &mut ledger, &mut *rng).await,
                None => Err(RunError::MissingPassword {
                    user: creator.to_string(),
                }),
            };

            match result {
                Ok(entries) => report.operations.extend(entries),
                Err(e) => {
                    warn!(user = creator, error = %e, "Failed to process account");
                    report.failed_accounts.push(creator.to_string());
                    let reason = e.to_string();
                    report.operations.extend(ops.iter().map(|op| {
                        entry(
                            op,
                            Outcome::Skipped {
                                reason: reason.clone(),
                            },
                        )
                    }));
                }
            }
        }

        report.operations.sort_by_key(|entry| entry.operation);
        report.limits = ledger.into_counts();

        let stats = report.stats();
        info!(
            matched = stats.matched,
            created = stats.created,
            planned = stats.planned,
            deferred = stats.deferred,
            failed = stats.failed,
            skipped = stats.skipped,
            accounts_failed = report.failed_accounts.len(),
            "Run complete"
        );
        report
    }

    /// Opens a session for one account, reconciles it and always logs out.
    #[instrument(skip_all, fields(user = %user.name))]
    async fn run_account<R: Rng + ?Sized>(
        &self,
        user: &User,
        ops: &[&Operation],
        ledger: &mut LimitLedger,
        rng: &mut R,
    ) -> Result<Vec<OperationReport>, RunError> {
        let password = user
            .password
            .as_deref()
            .ok_or_else(|| RunError::MissingPassword {
                user: user.name.clone(),
            })?;

        let session = self.factory.open_session().await?;
        let result = self
            .reconcile_account(session.as_ref(), user, password, ops, ledger, &mut *rng)
            .await;

        if let Err(e) = session.logout().await {
            warn!(error = %e, "Failed to log out");
        }
        session.close().await;

        result
    }

    async fn reconcile_account<R: Rng + ?Sized>(
        &self,
        remote: &dyn Remote,
        user: &User,
        password: &str,
        ops: &[&Operation],
        ledger: &mut LimitLedger,
        rng: &mut R,
    ) -> Result<Vec<OperationReport>, RunError> {
        if !remote.login(&user.name, password).await? {
            return Err(RunError::LoginFailed {
                user: user.name.clone(),
            });
        }

        let player = remote
            .player_id(&user.name)
            .await?
            .ok_or_else(|| RunError::UnknownPlayer {
                user: user.name.clone(),
            })?;

        let tables = remote.tables(player).await?;
        debug!(tables = tables.len(), "Loaded live tables");

        let mut schemas = SchemaCache::default();
        let mut outcomes: BTreeMap<OperationId, Outcome> = BTreeMap::new();
        let mut claimed: BTreeSet<TableId> = BTreeSet::new();
        let mut scheduler = QuotaScheduler::new(ledger);

        for op in ops {
            match self
                .match_operation(remote, op, player, &tables, &claimed, &mut schemas)
                .await
            {
                Ok(Some(table)) => {
                    info!(operation = %op.id, game = %op.game, table = %table, "Found matching table");
                    claimed.insert(table);
                    scheduler.admit_matched(op);
                    outcomes.insert(op.id, Outcome::Matched { table });
                }
                Ok(None) => scheduler.admit_unmatched(op),
                Err(e) => {
                    error!(
                        operation = %op.id,
                        game = %op.game,
                        error = %e,
                        "Could not check live tables, treating as unmatched"
                    );
                    scheduler.admit_unmatched(op);
                }
            }
        }

        let by_id: BTreeMap<OperationId, &Operation> = ops.iter().map(|op| (op.id, *op)).collect();
        while let Some(id) = scheduler.next_candidate(&mut *rng) {
            let Some(op) = by_id.get(&id) else {
                continue;
            };

            if self.settings.dry_run {
                info!(operation = %op.id, game = %op.game, invite = ?op.to_invite, "Dry run: would create table");
                scheduler.record_created(id);
                outcomes.insert(id, Outcome::Planned);
                continue;
            }

            match self.create(remote, op, &mut schemas).await {
                Ok(table) => {
                    scheduler.record_created(id);
                    outcomes.insert(id, Outcome::Created { table });
                }
                Err(CreateFailure { table: None, error }) => {
                    warn!(operation = %op.id, game = %op.game, error = %error, "Failed to create table");
                    outcomes.insert(
                        id,
                        Outcome::Failed {
                            reason: error.to_string(),
                        },
                    );
                }
                Err(CreateFailure {
                    table: Some(table),
                    error,
                }) => {
                    warn!(
                        operation = %op.id,
                        game = %op.game,
                        table = %table,
                        error = %error,
                        "Created table could not be set up"
                    );
                    scheduler.record_created(id);
                    outcomes.insert(
                        id,
                        Outcome::Failed {
                            reason: format!("table {table} was created but not set up: {error}"),
                        },
                    );
                }
            }
        }

        Ok(ops
            .iter()
            .map(|op| {
                let outcome = outcomes.remove(&op.id).unwrap_or(Outcome::Deferred);
                if outcome == Outcome::Deferred {
                    debug!(operation = %op.id, game = %op.game, "Deferred by limits");
                }
                entry(op, outcome)
            })
            .collect())
    }

    /// The first unclaimed live table fulfilling `op`.
    async fn match_operation(
        &self,
        remote: &dyn Remote,
        op: &Operation,
        player: PlayerId,
        tables: &[Table],
        claimed: &BTreeSet<TableId>,
        schemas: &mut SchemaCache,
    ) -> Result<Option<TableId>, RemoteError> {
        let unclaimed = tables.iter().filter(|table| !claimed.contains(&table.id));

        let found = if needs_schema(op) {
            let codename = self.codename(op)?;
            let schema = schemas.get(remote, codename).await?;
            find_match(op, player, unclaimed, self.catalog, schema)?
        } else {
            find_match(op, player, unclaimed, self.catalog, &GameOptionSchema::default())?
        };

        Ok(found.map(|table| table.id))
    }

    /// Creates, configures and opens a table for `op`.
    ///
    /// Options are resolved before anything is created. Invitees that cannot
    /// be found or invited are logged and skipped.
    async fn create(
        &self,
        remote: &dyn Remote,
        op: &Operation,
        schemas: &mut SchemaCache,
    ) -> Result<TableId, CreateFailure> {
        let codename = self.codename(op)?;
        let changes = parse_options(&op.options, schemas.get(remote, codename).await?)
            .map_err(RemoteError::from)?;

        let (_, table) = remote.create_table(&op.game).await?;
        self.set_up(remote, op, table, &changes)
            .await
            .map_err(|error| CreateFailure {
                table: Some(table),
                error,
            })?;

        info!(operation = %op.id, game = %op.game, table = %table, "Created table");
        Ok(table)
    }

    async fn set_up(
        &self,
        remote: &dyn Remote,
        op: &Operation,
        table: TableId,
        changes: &[TableOption],
    ) -> Result<(), RemoteError> {
        remote.set_table_options(table, changes).await?;

        for invitee in &op.to_invite {
            match remote.player_id(invitee).await {
                Ok(Some(player)) => {
                    if let Err(e) = remote.invite_player(table, player).await {
                        warn!(table = %table, invitee = %invitee, error = %e, "Failed to invite player");
                    }
                }
                Ok(None) => warn!(table = %table, invitee = %invitee, "Invitee not found"),
                Err(e) => {
                    warn!(table = %table, invitee = %invitee, error = %e, "Failed to look up invitee")
                }
            }
        }

        remote.open_table(table).await
    }

    fn codename(&self, op: &Operation) -> Result<&'a str, RemoteError> {
        self.catalog
            .get(&op.game)
            .map(|entry| entry.codename.as_str())
            .ok_or_else(|| {
                RemoteError::Option(OptionError::UnknownGame {
                    query: op.game.clone(),
                })
            })
    }
}

fn entry(op: &Operation, outcome: Outcome) -> OperationReport {
    OperationReport {
        operation: op.id,
        creator: op.to_create.clone(),
        game: op.game.clone(),
        outcome,
    }
}
