//! An in-memory ledger for exercising commands without a cluster.

use async_trait::async_trait;
use festchain_connector::{
    client::{Ledger, Receipt},
    interface::{methods, Value},
    ConnectorError,
};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

/// Events as `(title, date, capacity, registered)`. No permission rules; every
/// send is recorded as `(method, signer)`. Views fail while `offline` is set.
#[derive(Default)]
pub struct MemoryLedger {
    events: Mutex<Vec<(String, String, u64, u64)>>,
    pub sends: Mutex<Vec<(String, Pubkey)>>,
    pub offline: AtomicBool,
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn call(&self, method: &str, args: &[Value]) -> Result<Vec<Value>, ConnectorError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ConnectorError::Connectivity("offline".to_string()));
        }
        let events = self.events.lock().unwrap();
        match method {
            methods::EVENT_COUNT => Ok(vec![Value::from(events.len() as u64)]),
            methods::GET_EVENT => {
                let id = args[0].as_u64()? as usize;
                let (title, date, capacity, registered) = events[id].clone();
                Ok(vec![
                    title.into(),
                    date.into(),
                    capacity.into(),
                    registered.into(),
                    0u64.into(),
                    true.into(),
                ])
            }
            other => Err(ConnectorError::Interface(format!("unknown view {other}"))),
        }
    }

    async fn send(
        &self,
        method: &str,
        args: &[Value],
        signer: &Keypair,
    ) -> Result<Receipt, ConnectorError> {
        let mut events = self.events.lock().unwrap();
        match method {
            methods::CREATE_EVENT => events.push((
                args[0].as_str()?.to_string(),
                args[1].as_str()?.to_string(),
                args[2].as_u64()?,
                0,
            )),
            methods::REGISTER_FOR_EVENT => {
                let id = args[0].as_u64()? as usize;
                let event = events
                    .get_mut(id)
                    .ok_or_else(|| ConnectorError::RemoteRejection("no such event".into()))?;
                event.3 += 1;
            }
            _ => {}
        }
        self.sends
            .lock()
            .unwrap()
            .push((method.to_string(), signer.pubkey()));
        Ok(Receipt {
            method: method.to_string(),
            signature: Signature::default(),
        })
    }
}
