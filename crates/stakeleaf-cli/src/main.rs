//! Stakeleaf CLI - recovery phrases, CIP-1852 addresses and encrypted keystores.

pub mod commands;
pub mod config;
pub mod keystore;
pub mod output;
pub mod telemetry;

use clap::Parser;

use crate::commands::{Cli, Settings};
use crate::config::CliConfig;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        output::print_error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => CliConfig::load_from(path)?,
        None => CliConfig::load()?,
    };

    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    telemetry::init_telemetry(log_level, cli.json_logs)?;

    let settings = Settings::new(config, cli.network);
    tracing::debug!(network = %settings.network, "Loaded configuration");

    commands::execute(cli.command, &settings)
}
