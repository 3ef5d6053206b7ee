//! Output formatting for the run report and the validated plan.

use clap::ValueEnum;
use colored::Colorize;
use matchmaker_plan::{Operation, Plan};
use matchmaker_reconcile::{ConfigError, OperationReport, Outcome, RunReport};
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

#[derive(Debug, Tabled)]
struct OperationRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Creator")]
    creator: String,

    #[tabled(rename = "Game")]
    game: String,

    #[tabled(rename = "Invite")]
    invite: String,

    #[tabled(rename = "Options")]
    options: String,

    #[tabled(rename = "Limits")]
    limits: String,
}

impl OperationRow {
    fn new(op: &Operation, plan: &Plan) -> Self {
        Self {
            id: op.id.to_string(),
            creator: op.to_create.clone(),
            game: op.game.clone(),
            invite: join_or_dash(op.to_invite.iter().cloned()),
            options: join_or_dash(op.options.iter().map(|(k, v)| format!("{k}={v}"))),
            limits: join_or_dash(op.limits.iter().map(|id| match plan.limit(*id) {
                Some(limit) => format!("{} ({})", limit.name, limit.target),
                None => id.to_string(),
            })),
        }
    }
}

#[derive(Debug, Tabled)]
struct OutcomeRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Creator")]
    creator: String,

    #[tabled(rename = "Game")]
    game: String,

    #[tabled(rename = "State")]
    state: String,

    #[tabled(rename = "Table")]
    table: String,

    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&OperationReport> for OutcomeRow {
    fn from(entry: &OperationReport) -> Self {
        let state = match &entry.outcome {
            Outcome::Matched { .. } | Outcome::Created { .. } | Outcome::Planned => {
                entry.outcome.label().green().to_string()
            }
            Outcome::Deferred => entry.outcome.label().dimmed().to_string(),
            Outcome::Failed { .. } | Outcome::Skipped { .. } => {
                entry.outcome.label().red().to_string()
            }
        };
        Self {
            id: entry.operation.to_string(),
            creator: entry.creator.clone(),
            game: entry.game.clone(),
            state,
            table: entry
                .outcome
                .table()
                .map_or_else(|| "-".to_string(), |t| t.to_string()),
            detail: entry.outcome.reason().unwrap_or("-").to_string(),
        }
    }
}

#[derive(Debug, Tabled)]
struct LimitRow {
    #[tabled(rename = "Limit")]
    name: String,

    #[tabled(rename = "Used")]
    current: u32,

    #[tabled(rename = "Target")]
    target: u32,
}

fn join_or_dash(items: impl Iterator<Item = String>) -> String {
    let joined = items.collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

fn print_json<T: Serialize + ?Sized>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
    }
}

/// Print the resolved plan.
pub fn print_plan(plan: &Plan, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if plan.operations.is_empty() {
                println!("{}", "No operations found.".dimmed());
            } else {
                let rows: Vec<OperationRow> = plan
                    .operations
                    .iter()
                    .map(|op| OperationRow::new(op, plan))
                    .collect();
                println!("{}", Table::new(rows));
            }
        }
        OutputFormat::Json => print_json(plan),
    }
}

/// Print the outcome of every operation, then the limit counters.
pub fn print_report(report: &RunReport, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if report.operations.is_empty() {
                println!("{}", "No operations found.".dimmed());
                return;
            }
            let rows: Vec<OutcomeRow> = report.operations.iter().map(OutcomeRow::from).collect();
            println!("{}", Table::new(rows));

            if !report.limits.is_empty() {
                let limits: Vec<LimitRow> = report
                    .limits
                    .iter()
                    .map(|l| LimitRow {
                        name: l.name.clone(),
                        current: l.current,
                        target: l.target,
                    })
                    .collect();
                println!("{}", Table::new(limits));
            }

            let stats = report.stats();
            print_info(&format!(
                "{} matched, {} created, {} planned, {} deferred, {} failed, {} skipped",
                stats.matched,
                stats.created,
                stats.planned,
                stats.deferred,
                stats.failed,
                stats.skipped
            ));
        }
        OutputFormat::Json => print_json(report),
    }
}

/// Print every configuration error on stderr.
pub fn print_config_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("  {} {}", "-".red(), error);
    }
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "Info:".blue().bold(), message);
}
