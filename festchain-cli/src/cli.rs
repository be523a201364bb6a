use clap::{Args, Parser, Subcommand};

/// Command-line client for the FestManager program.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration TOML file.
    /// If not provided, default values will be used.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Index of the account that signs mutations.
    #[arg(short, long, global = true, default_value_t = 0)]
    pub account: usize,

    #[command(subcommand)]
    pub command: Commands,
}

/// Defines the available subcommands for the application.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the configured signer accounts.
    Accounts,
    /// Load all events from the ledger and show them.
    List,
    /// Create an event (admin account).
    Create(CreateCmd),
    /// Register the active account for an event.
    Register { event_id: u64 },
    /// Vote for an event from the active account.
    Vote { event_id: u64 },
    /// Mark an attendee present (admin account).
    /// The attendee is a base58 public key or `#N` for local account N.
    MarkPresent { event_id: u64, attendee: String },
    /// Start an interactive session.
    Shell,
    /// Run the scripted flow: create, register, vote, mark present.
    Demo,
}

/// Arguments for the `create` subcommand.
#[derive(Args, Debug)]
pub struct CreateCmd {
    #[arg(long)]
    pub title: String,
    /// Free-form schedule, e.g. "Nov 25 6pm".
    #[arg(long)]
    pub date: String,
    #[arg(long)]
    pub capacity: u64,
}
