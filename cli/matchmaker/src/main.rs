//! matchmaker - keeps board game tables in line with a declared plan.
//!
//! Reads a users file and an operations tree, validates them, then for each
//! creating account matches the operations against its live tables and
//! creates the missing ones within their limits.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod error;
mod output;
mod settings;

use cli::Cli;
use settings::{LogFormat, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error::print_error(&e);
            std::process::exit(1);
        }
    };
    init_tracing(&settings);

    if let Err(e) = cli.run(&settings).await {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}

/// Logs go to stderr; `RUST_LOG` wins over the configured level.
fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match settings.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
