use anyhow::{Context, Result};
use festchain_connector::config::ConnectorConfig;
use festchain_logger::LogConfig;
use serde::Deserialize;

/// The top-level configuration for the FestChain client.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct CliConfig {
    #[serde(default)]
    pub connector: ConnectorConfig,
    #[serde(default)]
    pub accounts: AccountsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Signer identities available to the session, in index order.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct AccountsConfig {
    /// Keypair files. When empty the Solana CLI default keypair is used.
    #[serde(default)]
    pub keypairs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct DisplayConfig {
    #[serde(default)]
    pub mode: DisplayMode,
}

/// Where rendered events go.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// A table when stdout is a terminal, the log otherwise.
    #[default]
    Auto,
    Table,
    Log,
}

/// Loads the client configuration from a specified TOML file.
///
/// It uses the `config` crate to read the file and deserialize it into
/// the `CliConfig` struct. `FESTCHAIN__*` environment variables override file values.
pub fn load_config(path: &str) -> Result<CliConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(config::Environment::with_prefix("FESTCHAIN").separator("__"));

    let settings: CliConfig = builder
        .build()
        .context(format!("Failed to build configuration from '{}'", path))?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    Ok(settings)
}
