//! The interactive shell: one command per line against a live session.
//!
//! Errors from a command are printed and the shell keeps reading; the event list is
//! only redrawn after a successful refresh.

use crate::commands::{parse_attendee, print_accounts};
use anyhow::Result;
use festchain_connector::{
    client::Ledger,
    dispatcher::ActionDispatcher,
    presenter::{Binding, Presenter},
};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

const HELP: &str = "\
commands:
  list                              reload and show all events
  accounts                          list signer accounts
  use <N>                           make account N active
  create <title> | <date> | <cap>   create an event
  register <id>                     register the active account
  vote <id>                         vote from the active account
  present <id> <key|#N>             mark an attendee present
  press <register|vote>:<id>        execute a table binding
  help                              show this text
  quit                              leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Quit,
    Empty,
    Accounts,
    Use(usize),
    List,
    Create {
        title: String,
        date: String,
        capacity: u64,
    },
    Register(u64),
    Vote(u64),
    Present(u64, String),
    Press(Binding),
}

fn parse_id(arg: Option<&str>, what: &str) -> Result<u64, String> {
    let arg = arg.ok_or_else(|| format!("missing {what}"))?;
    arg.parse().map_err(|_| format!("invalid {what} '{arg}'"))
}

/// Parses one shell line.
pub fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let mut words = rest.split_whitespace();

    let command = match verb {
        "" => ShellCommand::Empty,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        "accounts" => ShellCommand::Accounts,
        "list" => ShellCommand::List,
        "use" => {
            let index = words.next().ok_or("missing account index")?;
            ShellCommand::Use(
                index
                    .parse()
                    .map_err(|_| format!("invalid account index '{index}'"))?,
            )
        }
        "create" => {
            let parts: Vec<&str> = rest.split('|').map(str::trim).collect();
            let [title, date, capacity] = parts.as_slice() else {
                return Err("usage: create <title> | <date> | <capacity>".to_string());
            };
            if title.is_empty() {
                return Err("title must not be empty".to_string());
            }
            ShellCommand::Create {
                title: title.to_string(),
                date: date.to_string(),
                capacity: parse_id(Some(*capacity), "capacity")?,
            }
        }
        "register" => ShellCommand::Register(parse_id(words.next(), "event id")?),
        "vote" => ShellCommand::Vote(parse_id(words.next(), "event id")?),
        "present" => {
            let event_id = parse_id(words.next(), "event id")?;
            let attendee = words.next().ok_or("missing attendee")?;
            ShellCommand::Present(event_id, attendee.to_string())
        }
        "press" => ShellCommand::Press(words.next().ok_or("missing binding")?.parse()?),
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(command)
}

/// Loads the events once, then hands over to [`run`]. A failed load is reported
/// and the shell starts anyway.
pub async fn start<L, P, R>(
    dispatcher: &mut ActionDispatcher<L, P>,
    input: R,
    out: &mut impl Write,
) -> Result<()>
where
    L: Ledger + ?Sized,
    P: Presenter,
    R: AsyncBufRead + Unpin,
{
    if let Err(err) = dispatcher.load_events().await {
        writeln!(out, "warning: events not loaded: {err}")?;
    }
    run(dispatcher, input, out).await
}

/// Reads commands from `input` until `quit`, end of input, or Ctrl+C.
pub async fn run<L, P, R>(
    dispatcher: &mut ActionDispatcher<L, P>,
    input: R,
    out: &mut impl Write,
) -> Result<()>
where
    L: Ledger + ?Sized,
    P: Presenter,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        write!(out, "festchain[#{}]> ", dispatcher.accounts().active_index())?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = &mut ctrl_c => {
                tracing::info!("Received Ctrl+C, leaving the shell");
                None
            }
        };
        let Some(line) = line else {
            writeln!(out)?;
            break;
        };

        let command = match parse_line(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "error: {message}")?;
                continue;
            }
        };
        if let Err(err) = execute(dispatcher, command, out).await {
            writeln!(out, "error: {err:#}")?;
        }
    }
    Ok(())
}

async fn execute<L, P>(
    dispatcher: &mut ActionDispatcher<L, P>,
    command: ShellCommand,
    out: &mut impl Write,
) -> Result<()>
where
    L: Ledger + ?Sized,
    P: Presenter,
{
    match command {
        ShellCommand::Empty | ShellCommand::Quit => {}
        ShellCommand::Help => writeln!(out, "{HELP}")?,
        ShellCommand::Accounts => print_accounts(dispatcher.accounts(), out)?,
        ShellCommand::Use(index) => {
            dispatcher.accounts_mut().set_active(index)?;
            writeln!(out, "active account: #{index} {}", dispatcher.accounts().get_active().pubkey())?;
        }
        ShellCommand::List => {
            dispatcher.load_events().await?;
        }
        ShellCommand::Create {
            title,
            date,
            capacity,
        } => {
            dispatcher.create_event(&title, &date, capacity).await?;
        }
        ShellCommand::Register(event_id) => {
            dispatcher.register_for_event(event_id).await?;
        }
        ShellCommand::Vote(event_id) => {
            dispatcher.vote_for(event_id).await?;
        }
        ShellCommand::Present(event_id, attendee) => {
            let attendee = parse_attendee(dispatcher.accounts(), &attendee)?;
            dispatcher.mark_present(event_id, attendee).await?;
        }
        ShellCommand::Press(binding) => {
            dispatcher.trigger(binding).await?;
        }
    }
    Ok(())
}
