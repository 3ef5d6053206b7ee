//! Command-line arguments and the top-level run.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use matchmaker_plan::{load_operations, load_users, Plan, Users};
use matchmaker_reconcile::{validate, Orchestrator, RunSettings};
use matchmaker_remote::bga::BgaSessionFactory;
use matchmaker_remote::SessionFactory;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::error::CliError;
use crate::output::{self, OutputFormat};
use crate::settings::Settings;

/// matchmaker - Create the board game tables your plan asks for, once.
#[derive(Debug, Parser)]
#[command(name = "matchmaker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Users file: usernames and passwords.
    #[arg(long, env = "MATCHMAKER_USERS")]
    users_path: PathBuf,

    /// Operations tree describing the wanted tables.
    #[arg(long, env = "MATCHMAKER_OPERATIONS")]
    operations_path: PathBuf,

    /// Validate and print the plan without logging in or creating anything.
    #[arg(long, conflicts_with = "dry_run")]
    validate: bool,

    /// Run matching and scheduling but make no mutating remote call.
    #[arg(long)]
    dry_run: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Seed for the shuffle that settles contended limits.
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    pub async fn run(self, settings: &Settings) -> Result<()> {
        let users = load_users(&self.users_path).map_err(CliError::Load)?;
        let plan = load_operations(&self.operations_path).map_err(CliError::Load)?;
        info!(
            users = users.len(),
            operations = plan.operations.len(),
            limits = plan.limits.len(),
            "Loaded configuration"
        );

        let factory = BgaSessionFactory::new(settings.remote(), settings.cache());
        self.execute(&factory, &plan, &users).await
    }

    /// Validates the plan, then reconciles it unless only validation was
    /// asked for. Only the game catalog is read when validation fails.
    async fn execute(
        &self,
        factory: &dyn SessionFactory,
        plan: &Plan,
        users: &Users,
    ) -> Result<()> {
        let catalog = factory.game_catalog().await.map_err(CliError::Catalog)?;

        let errors = validate(plan, users, &catalog);
        if !errors.is_empty() {
            output::print_config_errors(&errors);
            return Err(CliError::Validation {
                count: errors.len(),
            }
            .into());
        }

        if self.validate {
            output::print_plan(plan, self.format);
            if self.format == OutputFormat::Table {
                output::print_success(&format!(
                    "Configuration is valid: {} operation(s), {} limit(s)",
                    plan.operations.len(),
                    plan.limits.len()
                ));
            }
            return Ok(());
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let orchestrator = Orchestrator::new(
            factory,
            &catalog,
            RunSettings {
                dry_run: self.dry_run,
            },
        );
        let report = orchestrator.run(plan, users, &mut rng).await;
        output::print_report(&report, self.format);

        if !report.is_success() {
            return Err(CliError::AccountsFailed {
                accounts: report.failed_accounts.clone(),
            }
            .into());
        }
        Ok(())
    }
}
