//! Horsestore CLI - run calls against the horse-store contract.
//!
//! Storage is kept in a JSON state file between invocations.

pub mod commands;
pub mod config;
pub mod output;
pub mod telemetry;

use clap::Parser;
use colored::Colorize;

fn main() -> anyhow::Result<()> {
    let cli = commands::Cli::parse();

    let (config_path, config) = match cli.resolve_config() {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            std::process::exit(1);
        }
    };

    telemetry::init_telemetry(&config.log_level, config.log_json)?;
    tracing::debug!(config = %config_path.display(), backend = %config.backend, "starting");

    if let Err(e) = commands::execute(cli.command, config_path, config) {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }

    Ok(())
}
