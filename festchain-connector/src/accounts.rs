use crate::error::ConnectorError;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::{fmt, sync::Arc};

/// A local signer keypair usable to author mutations.
#[derive(Clone)]
pub struct Identity(Arc<Keypair>);

impl Identity {
    pub fn new(keypair: Keypair) -> Self {
        Self(Arc::new(keypair))
    }

    pub fn pubkey(&self) -> Pubkey {
        self.0.pubkey()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.0
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identity").field(&self.pubkey()).finish()
    }
}

impl From<Keypair> for Identity {
    fn from(keypair: Keypair) -> Self {
        Self::new(keypair)
    }
}

/// Tracks which of the available identities signs the next mutation.
///
/// The active index always lies in `[0, identities.len())` and starts at 0.
#[derive(Debug, Clone)]
pub struct AccountSelector {
    identities: Vec<Identity>,
    active: usize,
}

impl AccountSelector {
    /// Creates a selector over `identities` with the first one active.
    ///
    /// Fails with [`ConnectorError::NoIdentities`] when the list is empty.
    pub fn new(identities: Vec<Identity>) -> Result<Self, ConnectorError> {
        if identities.is_empty() {
            return Err(ConnectorError::NoIdentities);
        }
        Ok(Self {
            identities,
            active: 0,
        })
    }

    pub fn list_identities(&self) -> &[Identity] {
        &self.identities
    }

    /// Makes identity `index` active. An out-of-range index leaves the selection as it was.
    pub fn set_active(&mut self, index: usize) -> Result<(), ConnectorError> {
        if index >= self.identities.len() {
            return Err(ConnectorError::IndexOutOfRange {
                index,
                count: self.identities.len(),
            });
        }
        self.active = index;
        tracing::info!(index, account = %self.identities[index].pubkey(), "active account set");
        Ok(())
    }

    pub fn get_active(&self) -> &Identity {
        &self.identities[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Returns identity `index` without changing the selection.
    pub fn get(&self, index: usize) -> Result<&Identity, ConnectorError> {
        self.identities
            .get(index)
            .ok_or(ConnectorError::IndexOutOfRange {
                index,
                count: self.identities.len(),
            })
    }
}
