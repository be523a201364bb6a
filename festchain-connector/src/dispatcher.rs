//! # Action Dispatcher
//!
//! The `ActionDispatcher` is the session object of a client: it owns the ledger handle, the
//! account selector, the sync client and the presenter, and exposes the four mutations of
//! the FestManager program.
//!
//! ## Operation pattern
//! Every mutation follows the same steps:
//! 1. resolve the active identity;
//! 2. `send` the method signed by that identity;
//! 3. on success, run one sync cycle and render the result;
//! 4. on failure, log the error and stop. The previous presentation stays as it was.
//!
//! Nothing is deduplicated here: invoking an operation twice sends two transactions.
use crate::{
    accounts::AccountSelector,
    client::{Ledger, Receipt},
    error::ConnectorError,
    interface::{methods, Value},
    presenter::{Binding, Presenter, Trigger},
    sync::{EventRecord, EventSyncClient},
};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;

pub struct ActionDispatcher<L: Ledger + ?Sized, P: Presenter> {
    ledger: Arc<L>,
    accounts: AccountSelector,
    sync: EventSyncClient<L>,
    presenter: P,
}

impl<L: Ledger + ?Sized, P: Presenter> ActionDispatcher<L, P> {
    pub fn new(ledger: Arc<L>, accounts: AccountSelector, presenter: P) -> Self {
        let sync = EventSyncClient::new(ledger.clone());
        Self {
            ledger,
            accounts,
            sync,
            presenter,
        }
    }

    pub fn accounts(&self) -> &AccountSelector {
        &self.accounts
    }

    /// Mutable access for switching the active account.
    pub fn accounts_mut(&mut self) -> &mut AccountSelector {
        &mut self.accounts
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Runs a sync cycle and renders it. On failure nothing is rendered.
    pub async fn load_events(&mut self) -> Result<Vec<EventRecord>, ConnectorError> {
        match self.sync.refresh().await {
            Ok(records) => {
                self.presenter.render(&records);
                Ok(records)
            }
            Err(err) => {
                tracing::error!(error = %err, "loading events failed");
                Err(err)
            }
        }
    }

    /// Creates an event. Capacity and date rules are enforced by the program.
    pub async fn create_event(
        &mut self,
        title: &str,
        date: &str,
        capacity: u64,
    ) -> Result<Receipt, ConnectorError> {
        self.submit(
            "create_event",
            methods::CREATE_EVENT,
            vec![title.into(), date.into(), capacity.into()],
        )
        .await
    }

    /// Registers the active account for an event.
    pub async fn register_for_event(&mut self, event_id: u64) -> Result<Receipt, ConnectorError> {
        self.submit(
            "register_for_event",
            methods::REGISTER_FOR_EVENT,
            vec![event_id.into()],
        )
        .await
    }

    /// Votes for an event from the active account.
    pub async fn vote_for(&mut self, event_id: u64) -> Result<Receipt, ConnectorError> {
        self.submit("vote_for", methods::VOTE, vec![event_id.into()])
            .await
    }

    /// Marks `attendee` present at an event. The program restricts this to the event admin.
    pub async fn mark_present(
        &mut self,
        event_id: u64,
        attendee: Pubkey,
    ) -> Result<Receipt, ConnectorError> {
        self.submit(
            "mark_present",
            methods::MARK_PRESENT,
            vec![event_id.into(), attendee.into()],
        )
        .await
    }

    /// Executes a binding-table entry.
    pub async fn trigger(&mut self, binding: Binding) -> Result<Receipt, ConnectorError> {
        match binding.trigger {
            Trigger::Register => self.register_for_event(binding.event_id).await,
            Trigger::Vote => self.vote_for(binding.event_id).await,
        }
    }

    async fn submit(
        &mut self,
        action: &'static str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Receipt, ConnectorError> {
        let identity = self.accounts.get_active().clone();
        tracing::info!(action, from = %identity.pubkey(), ?args, "submitting");

        let receipt = match self.ledger.send(method, &args, identity.keypair()).await {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::error!(action, error = %err, "action failed");
                return Err(err);
            }
        };
        tracing::info!(action, signature = %receipt.signature, "action confirmed");

        self.load_events().await?;
        Ok(receipt)
    }
}
