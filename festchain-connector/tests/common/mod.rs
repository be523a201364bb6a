//! Shared test doubles: an in-memory FestManager ledger and a recording presenter.
#![allow(dead_code)]

use async_trait::async_trait;
use festchain_connector::{
    accounts::{AccountSelector, Identity},
    client::{Ledger, Receipt},
    interface::{methods, Value},
    presenter::Presenter,
    sync::EventRecord,
    ConnectorError,
};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

#[derive(Debug, Clone)]
struct FestEvent {
    title: String,
    date: String,
    capacity: u64,
    registered: Vec<Pubkey>,
    voters: Vec<Pubkey>,
    present: Vec<Pubkey>,
    active: bool,
}

/// An in-memory stand-in for the deployed FestManager program.
///
/// Only the admin may create events and mark attendance; registration is refused when an
/// event is full or the caller is already registered; each registrant votes once.
pub struct FestLedger {
    admin: Pubkey,
    events: Mutex<Vec<FestEvent>>,
    offline: AtomicBool,
    fail_fetch_at: Mutex<Option<u64>>,
    pub count_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub sends: AtomicUsize,
}

impl FestLedger {
    pub fn new(admin: Pubkey) -> Self {
        Self {
            admin,
            events: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
            fail_fetch_at: Mutex::new(None),
            count_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            sends: AtomicUsize::new(0),
        }
    }

    /// Seeds an event directly, bypassing permission checks.
    pub fn seed(&self, title: &str, capacity: u64, registered: u64) {
        self.events.lock().unwrap().push(FestEvent {
            title: title.to_string(),
            date: "TBA".to_string(),
            capacity,
            registered: (0..registered).map(|_| Pubkey::new_unique()).collect(),
            voters: Vec::new(),
            present: Vec::new(),
            active: true,
        });
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes the fetch of event `index` fail with a connectivity error.
    pub fn fail_fetch_at(&self, index: Option<u64>) {
        *self.fail_fetch_at.lock().unwrap() = index;
    }

    /// Number of completed-or-attempted sync cycles (each starts with a count query).
    pub fn refreshes(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    pub fn is_present(&self, event_id: u64, attendee: &Pubkey) -> bool {
        self.events.lock().unwrap()[event_id as usize]
            .present
            .contains(attendee)
    }

    fn check_online(&self) -> Result<(), ConnectorError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ConnectorError::Connectivity("connection refused".into()));
        }
        Ok(())
    }

    fn event_index(&self, events: &[FestEvent], value: &Value) -> Result<usize, ConnectorError> {
        let id = value.as_u64()? as usize;
        if id >= events.len() {
            return Err(ConnectorError::RemoteRejection(format!("event {id} does not exist")));
        }
        Ok(id)
    }
}

fn reject(msg: &str) -> Result<Receipt, ConnectorError> {
    Err(ConnectorError::RemoteRejection(msg.to_string()))
}

#[async_trait]
impl Ledger for FestLedger {
    async fn call(&self, method: &str, args: &[Value]) -> Result<Vec<Value>, ConnectorError> {
        self.check_online()?;
        let events = self.events.lock().unwrap();
        match (method, args) {
            (methods::EVENT_COUNT, []) => {
                self.count_calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![Value::from(events.len() as u64)])
            }
            (methods::GET_EVENT, [index]) => {
                self.fetch_calls.fetch_add(1, Ordering::SeqCst);
                let id = index.as_u64()?;
                if *self.fail_fetch_at.lock().unwrap() == Some(id) {
                    return Err(ConnectorError::Connectivity(format!("fetch {id} dropped")));
                }
                let i = self.event_index(&events, index)?;
                let e = &events[i];
                Ok(vec![
                    e.title.clone().into(),
                    e.date.clone().into(),
                    e.capacity.into(),
                    (e.registered.len() as u64).into(),
                    (e.voters.len() as u64).into(),
                    e.active.into(),
                ])
            }
            _ => Err(ConnectorError::Interface(format!("unknown view '{method}'"))),
        }
    }

    async fn send(
        &self,
        method: &str,
        args: &[Value],
        signer: &Keypair,
    ) -> Result<Receipt, ConnectorError> {
        self.check_online()?;
        self.sends.fetch_add(1, Ordering::SeqCst);
        let from = signer.pubkey();
        let mut events = self.events.lock().unwrap();

        match (method, args) {
            (methods::CREATE_EVENT, [title, date, capacity]) => {
                if from != self.admin {
                    return reject("only the admin can create events");
                }
                events.push(FestEvent {
                    title: title.as_str()?.to_string(),
                    date: date.as_str()?.to_string(),
                    capacity: capacity.as_u64()?,
                    registered: Vec::new(),
                    voters: Vec::new(),
                    present: Vec::new(),
                    active: true,
                });
            }
            (methods::REGISTER_FOR_EVENT, [id]) => {
                let i = self.event_index(&events, id)?;
                let e = &mut events[i];
                if !e.active {
                    return reject("event is closed");
                }
                if e.registered.len() as u64 >= e.capacity {
                    return reject("event is full");
                }
                if e.registered.contains(&from) {
                    return reject("already registered");
                }
                e.registered.push(from);
            }
            (methods::VOTE, [id]) => {
                let i = self.event_index(&events, id)?;
                let e = &mut events[i];
                if !e.registered.contains(&from) {
                    return reject("only registrants can vote");
                }
                if e.voters.contains(&from) {
                    return reject("already voted");
                }
                e.voters.push(from);
            }
            (methods::MARK_PRESENT, [id, attendee]) => {
                if from != self.admin {
                    return reject("only the admin can mark attendance");
                }
                let attendee = attendee.as_pubkey()?;
                let i = self.event_index(&events, id)?;
                let e = &mut events[i];
                if !e.registered.contains(&attendee) {
                    return reject("attendee is not registered");
                }
                e.present.push(attendee);
            }
            _ => {
                return Err(ConnectorError::Interface(format!(
                    "unknown mutation '{method}'"
                )))
            }
        }

        Ok(Receipt {
            method: method.to_string(),
            signature: Signature::default(),
        })
    }
}

/// Remembers every render it receives.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub renders: Vec<Vec<EventRecord>>,
}

impl Presenter for RecordingPresenter {
    fn render(&mut self, records: &[EventRecord]) {
        self.renders.push(records.to_vec());
    }
}

/// Creates `n` fresh identities; identity 0 is the admin.
pub fn accounts(n: usize) -> AccountSelector {
    AccountSelector::new((0..n).map(|_| Identity::new(Keypair::new())).collect()).unwrap()
}
