//! Builds the client session from configuration: identities, presenter, and the
//! dispatcher over a live RPC connection.

use crate::config::{CliConfig, DisplayMode};
use anyhow::{anyhow, Context, Result};
use festchain_connector::{
    accounts::{AccountSelector, Identity},
    client::RemoteLedgerHandle,
    dispatcher::ActionDispatcher,
    presenter::{LogPresenter, Presenter, TablePresenter},
};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, signature::read_keypair_file};
use std::{
    io::IsTerminal,
    path::{Path, PathBuf},
    sync::Arc,
};

/// The dispatcher type used by the binary.
pub type Session = ActionDispatcher<RemoteLedgerHandle<RpcClient>, Box<dyn Presenter>>;

/// Expands a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// The keypair the Solana CLI uses by default.
fn default_keypair_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("solana").join("id.json"))
}

fn read_identity(path: &Path) -> Result<Identity> {
    read_keypair_file(path)
        .map(Identity::new)
        .map_err(|e| anyhow!("Failed to read keypair '{}': {}", path.display(), e))
}

/// Loads the configured keypairs in order, falling back to the Solana CLI default keypair.
pub fn load_identities(keypairs: &[String]) -> Result<Vec<Identity>> {
    if keypairs.is_empty() {
        return default_keypair_path()
            .filter(|path| path.exists())
            .map(|path| read_identity(&path))
            .into_iter()
            .collect();
    }
    keypairs
        .iter()
        .map(|path| read_identity(&expand_home(path)))
        .collect()
}

/// Picks the presenter for the configured display mode.
pub fn presenter(mode: &DisplayMode) -> Box<dyn Presenter> {
    let table = match mode {
        DisplayMode::Table => true,
        DisplayMode::Log => false,
        DisplayMode::Auto => std::io::stdout().is_terminal(),
    };
    if table {
        Box::new(TablePresenter::new(std::io::stdout()).clear_screen(true))
    } else {
        Box::new(LogPresenter)
    }
}

/// Connects to the configured cluster and returns a ready session.
pub fn connect(config: &CliConfig) -> Result<Session> {
    let identities = load_identities(&config.accounts.keypairs)?;
    let accounts = AccountSelector::new(identities)
        .context("No accounts found. Configure [accounts] keypairs or create a Solana CLI keypair")?;
    tracing::info!(
        accounts = ?accounts
            .list_identities()
            .iter()
            .map(|identity| identity.pubkey().to_string())
            .collect::<Vec<_>>(),
        "signer accounts loaded"
    );
    tracing::info!(active = %accounts.get_active().pubkey(), "active account");

    let ledger = &config.connector.ledger;
    let program_id = ledger.program_id()?;
    let interface = Arc::new(ledger.interface()?);

    let solana = &config.connector.solana;
    let rpc_client = Arc::new(RpcClient::new_with_commitment(
        solana.rpc_url.clone(),
        CommitmentConfig {
            commitment: solana.commitment,
        },
    ));
    tracing::info!(rpc_url = %solana.rpc_url, %program_id, "connecting to ledger");

    let handle = RemoteLedgerHandle::new(rpc_client, program_id, interface)
        .with_view_payer(accounts.get_active().pubkey());

    Ok(ActionDispatcher::new(
        Arc::new(handle),
        accounts,
        presenter(&config.display.mode),
    ))
}
