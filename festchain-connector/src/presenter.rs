//! # Presentation
//!
//! A [`Presenter`] turns a freshly synced list of [`EventRecord`]s into output. Every
//! render replaces the previous presentation entirely; nothing is diffed.
//!
//! Interaction is decoupled from any display technology through the [`BindingTable`]:
//! each rendered record exposes a `register` and a `vote` trigger, and a host resolves a
//! trigger to a [`Binding`] which the dispatcher executes.

use crate::sync::EventRecord;
use std::{fmt, io::Write, str::FromStr};

/// Renders records to a display surface or a log sink. Rendering cannot fail.
pub trait Presenter: Send {
    fn render(&mut self, records: &[EventRecord]);
}

impl Presenter for Box<dyn Presenter> {
    fn render(&mut self, records: &[EventRecord]) {
        (**self).render(records)
    }
}

/// The per-record actions a host can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Register,
    Vote,
}

impl Trigger {
    pub const ALL: [Trigger; 2] = [Trigger::Register, Trigger::Vote];

    pub fn name(self) -> &'static str {
        match self {
            Trigger::Register => "register",
            Trigger::Vote => "vote",
        }
    }
}

/// One `(trigger, record id)` entry of a binding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Binding {
    pub trigger: Trigger,
    pub event_id: u64,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.trigger.name(), self.event_id)
    }
}

impl FromStr for Binding {
    type Err = String;

    /// Parses a `<trigger>:<id>` label such as `vote:3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, id) = s
            .split_once(':')
            .ok_or_else(|| format!("expected <trigger>:<id>, got '{s}'"))?;
        let trigger = Trigger::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| format!("unknown trigger '{name}'"))?;
        let event_id = id
            .parse()
            .map_err(|_| format!("invalid event id '{id}'"))?;
        Ok(Binding { trigger, event_id })
    }
}

/// The triggers exposed by one presentation, in render order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    entries: Vec<Binding>,
}

impl BindingTable {
    pub fn from_records(records: &[EventRecord]) -> Self {
        let entries = records
            .iter()
            .flat_map(|record| {
                Trigger::ALL.into_iter().map(move |trigger| Binding {
                    trigger,
                    event_id: record.id,
                })
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[Binding] {
        &self.entries
    }

    /// Finds the binding for `trigger` on record `event_id`, if it was rendered.
    pub fn lookup(&self, trigger: Trigger, event_id: u64) -> Option<Binding> {
        self.entries
            .iter()
            .copied()
            .find(|b| b.trigger == trigger && b.event_id == event_id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The log sink: used when no display surface is available.
#[derive(Debug, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn render(&mut self, records: &[EventRecord]) {
        tracing::info!(total = records.len(), "events loaded");
        for record in records {
            tracing::info!(
                id = record.id,
                title = %record.title,
                date = %record.date,
                capacity = record.capacity,
                registered = record.registered_count,
                votes = record.vote_count,
                active = record.active,
                "event"
            );
        }
    }
}

/// ANSI sequence clearing the terminal and homing the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Draws records as a text table on a writer, e.g. a terminal.
pub struct TablePresenter<W: Write + Send> {
    out: W,
    clear_screen: bool,
    bindings: BindingTable,
}

impl<W: Write + Send> TablePresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            clear_screen: false,
            bindings: BindingTable::default(),
        }
    }

    /// Clears the whole screen before each repaint.
    pub fn clear_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    /// The binding table of the last render.
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&mut self, records: &[EventRecord]) -> std::io::Result<()> {
        if self.clear_screen {
            write!(self.out, "{CLEAR_SCREEN}")?;
        }
        writeln!(self.out, "Events ({})", records.len())?;
        for record in records {
            let status = if record.active { "open" } else { "closed" };
            writeln!(
                self.out,
                "#{:<3} {:<24} {:<16} {:>5}/{:<5} votes: {:<5} {:<6} [{}] [{}]",
                record.id,
                record.title,
                record.date,
                record.registered_count,
                record.capacity,
                record.vote_count,
                status,
                Binding {
                    trigger: Trigger::Register,
                    event_id: record.id
                },
                Binding {
                    trigger: Trigger::Vote,
                    event_id: record.id
                },
            )?;
        }
        self.out.flush()
    }
}

impl<W: Write + Send> Presenter for TablePresenter<W> {
    fn render(&mut self, records: &[EventRecord]) {
        self.bindings = BindingTable::from_records(records);
        if let Err(err) = self.paint(records) {
            tracing::warn!(error = %err, "failed to draw events table");
        }
    }
}
