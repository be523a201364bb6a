//! A Rust client library for the FestManager program on Solana.
//!
//! The connector keeps a local view of the program's events consistent with the ledger by
//! reloading everything after each mutation. All validation and state live in the program;
//! this crate only calls it, decodes what it returns, and reports failures.
//!
//! # Key Components
//!
//! *   [`client`]: The [`RemoteLedgerHandle`](client::RemoteLedgerHandle) with typed
//!     `call`/`send` primitives, and the [`Ledger`](client::Ledger) trait above it.
//! *   [`interface`]: The interface descriptor and the wire encoding of arguments and results.
//! *   [`accounts`]: The in-memory [`AccountSelector`](accounts::AccountSelector).
//! *   [`sync`]: The [`EventSyncClient`](sync::EventSyncClient) and the
//!     [`EventRecord`](sync::EventRecord) projection.
//! *   [`presenter`]: Log and table presenters and the trigger binding table.
//! *   [`dispatcher`]: The [`ActionDispatcher`](dispatcher::ActionDispatcher) session object.
pub mod accounts;
pub mod client;
/// Defines configuration structures for the connector.
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod interface;
pub mod presenter;
pub mod sync;

pub use error::ConnectorError;
