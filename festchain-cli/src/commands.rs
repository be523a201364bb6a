//! One-shot command execution and the scripted demo.

use crate::{cli::Commands, shell};
use anyhow::{anyhow, bail, Context, Result};
use festchain_connector::{
    accounts::AccountSelector, client::Ledger, dispatcher::ActionDispatcher, presenter::Presenter,
};
use solana_sdk::pubkey::Pubkey;
use std::{io::Write, str::FromStr};

const DEMO_TITLE: &str = "Rock Night";
const DEMO_DATE: &str = "Nov 25 6pm";
const DEMO_CAPACITY: u64 = 50;

/// Resolves an attendee given as a base58 key or as `#N`, the pubkey of local account N.
pub fn parse_attendee(accounts: &AccountSelector, attendee: &str) -> Result<Pubkey> {
    if let Some(index) = attendee.strip_prefix('#') {
        let index: usize = index
            .parse()
            .with_context(|| format!("invalid account index '{index}'"))?;
        return Ok(accounts.get(index)?.pubkey());
    }
    Pubkey::from_str(attendee).map_err(|e| anyhow!("invalid attendee '{attendee}': {e}"))
}

/// Writes the account list, marking the active one.
pub fn print_accounts(accounts: &AccountSelector, out: &mut impl Write) -> std::io::Result<()> {
    for (index, identity) in accounts.list_identities().iter().enumerate() {
        let marker = if index == accounts.active_index() { "*" } else { " " };
        writeln!(out, "{marker} #{index} {}", identity.pubkey())?;
    }
    Ok(())
}

/// Runs one CLI command against a session, signing with account `account`.
pub async fn execute<L, P>(
    dispatcher: &mut ActionDispatcher<L, P>,
    account: usize,
    command: Commands,
) -> Result<()>
where
    L: Ledger + ?Sized,
    P: Presenter,
{
    dispatcher.accounts_mut().set_active(account)?;

    match command {
        Commands::Accounts => print_accounts(dispatcher.accounts(), &mut std::io::stdout())?,
        Commands::List => {
            dispatcher.load_events().await?;
        }
        Commands::Create(cmd) => {
            let receipt = dispatcher
                .create_event(&cmd.title, &cmd.date, cmd.capacity)
                .await?;
            println!("Created '{}' ({})", cmd.title, receipt.signature);
        }
        Commands::Register { event_id } => {
            let receipt = dispatcher.register_for_event(event_id).await?;
            println!("Registered for event {event_id} ({})", receipt.signature);
        }
        Commands::Vote { event_id } => {
            let receipt = dispatcher.vote_for(event_id).await?;
            println!("Voted for event {event_id} ({})", receipt.signature);
        }
        Commands::MarkPresent { event_id, attendee } => {
            let attendee = parse_attendee(dispatcher.accounts(), &attendee)?;
            let receipt = dispatcher.mark_present(event_id, attendee).await?;
            println!("Marked {attendee} present at event {event_id} ({})", receipt.signature);
        }
        Commands::Shell => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            shell::start(dispatcher, stdin, &mut std::io::stdout()).await?;
        }
        Commands::Demo => {
            let event_id = demo(dispatcher).await?;
            println!("Demo finished on event {event_id}");
        }
    }
    Ok(())
}

/// The scripted flow: account 0 creates an event, account 1 registers and votes,
/// account 0 marks account 1 present. Returns the id of the created event.
pub async fn demo<L, P>(dispatcher: &mut ActionDispatcher<L, P>) -> Result<u64>
where
    L: Ledger + ?Sized,
    P: Presenter,
{
    let count = dispatcher.accounts().list_identities().len();
    if count < 2 {
        bail!("The demo needs two accounts, found {count}. Add a second keypair to [accounts]");
    }

    dispatcher.accounts_mut().set_active(0)?;
    let event_id = dispatcher.load_events().await?.len() as u64;
    dispatcher
        .create_event(DEMO_TITLE, DEMO_DATE, DEMO_CAPACITY)
        .await
        .context("demo: create_event")?;

    dispatcher.accounts_mut().set_active(1)?;
    let attendee = dispatcher.accounts().get_active().pubkey();
    dispatcher
        .register_for_event(event_id)
        .await
        .context("demo: register_for_event")?;
    dispatcher
        .vote_for(event_id)
        .await
        .context("demo: vote_for")?;

    dispatcher.accounts_mut().set_active(0)?;
    dispatcher
        .mark_present(event_id, attendee)
        .await
        .context("demo: mark_present")?;

    tracing::info!(event_id, "demo complete");
    Ok(event_id)
}
