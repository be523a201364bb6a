//! # Event Synchronization
//!
//! The [`EventSyncClient`] rebuilds the local view of every event from the ledger. A sync
//! cycle reads the event count and then fetches each event by index, one round trip at a
//! time in increasing order. There is no cache: each cycle starts again from index 0.
//!
//! A cycle is all-or-nothing. If any fetch fails the whole refresh fails with
//! [`ConnectorError::Sync`] and records fetched so far are discarded.

use crate::{
    client::Ledger,
    error::ConnectorError,
    interface::{methods, Value},
};
use std::sync::Arc;

/// A read-only projection of one event on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Positional index in the remote collection.
    pub id: u64,
    pub title: String,
    /// Free-form schedule string.
    pub date: String,
    pub capacity: u64,
    pub registered_count: u64,
    pub vote_count: u64,
    /// Whether mutations are currently permitted.
    pub active: bool,
}

impl EventRecord {
    /// Maps the positional tuple `(title, date, capacity, registeredCount, voteCount, active)`.
    pub fn from_fields(id: u64, fields: &[Value]) -> Result<Self, ConnectorError> {
        let [title, date, capacity, registered, votes, active] = fields else {
            return Err(ConnectorError::Interface(format!(
                "event {id}: expected 6 fields, got {}",
                fields.len()
            )));
        };
        Ok(Self {
            id,
            title: title.as_str()?.to_string(),
            date: date.as_str()?.to_string(),
            capacity: capacity.as_u64()?,
            registered_count: registered.as_u64()?,
            vote_count: votes.as_u64()?,
            active: active.as_bool()?,
        })
    }
}

/// Fetches the full list of events from a [`Ledger`].
pub struct EventSyncClient<L: Ledger + ?Sized> {
    ledger: Arc<L>,
}

impl<L: Ledger + ?Sized> Clone for EventSyncClient<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
        }
    }
}

impl<L: Ledger + ?Sized> EventSyncClient<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    /// Runs one sync cycle.
    pub async fn refresh(&self) -> Result<Vec<EventRecord>, ConnectorError> {
        self.fetch_all()
            .await
            .map_err(|e| ConnectorError::Sync(Box::new(e)))
    }

    async fn fetch_all(&self) -> Result<Vec<EventRecord>, ConnectorError> {
        let count = self.ledger.call(methods::EVENT_COUNT, &[]).await?;
        let count = match count.as_slice() {
            [value] => value.as_u64()?,
            other => {
                return Err(ConnectorError::Interface(format!(
                    "{} returned {} values",
                    methods::EVENT_COUNT,
                    other.len()
                )))
            }
        };
        tracing::debug!(count, "total events");

        let mut records = Vec::new();
        for id in 0..count {
            let fields = self.ledger.call(methods::GET_EVENT, &[Value::from(id)]).await?;
            let record = EventRecord::from_fields(id, &fields)?;
            tracing::debug!(?record, "event fetched");
            records.push(record);
        }
        Ok(records)
    }
}
