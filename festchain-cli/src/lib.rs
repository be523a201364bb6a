pub mod cli;
pub mod commands;
pub mod config;
pub mod session;
pub mod shell;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use config::{load_config, CliConfig};

/// The main entry point for the client.
/// This function handles CLI parsing, configuration, logging and the selected command.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config_from_cli(cli.config.as_deref())?;
    festchain_logger::init(&config.log)?;
    tracing::debug!("Configuration loaded: {:#?}", &config);

    let mut session = session::connect(&config)?;
    commands::execute(&mut session, cli.account, cli.command).await
}

/// Loads the configuration file named on the command line, or the defaults.
fn load_config_from_cli(path: Option<&str>) -> Result<CliConfig> {
    if let Some(config_path) = path {
        println!("Loading configuration from '{}'", config_path);
        load_config(config_path)
    } else {
        println!("No config file provided, using default settings.");
        Ok(CliConfig::default())
    }
}
