//! Command implementations for the ticketboard CLI.
//!
//! This module contains the business logic for each CLI command, on top of
//! the pure engine in [`crate::tickets`]:
//! - `tickets` - board, list, show, add, done/undo, start/stop, validate
//! - `documents` - fmt, features, export, archive
//! - `config` - show and set configuration
//!
//! Every command returns a result type implementing [`Output`] so `main`
//! can print it as JSON or as human-readable text.

pub mod config;
pub mod documents;
pub mod tickets;

pub use config::{ConfigSet, ConfigShow, config_set, config_show};
pub use documents::{
    ArchiveResult, ExportResult, FeaturesResult, FmtResult, archive, export, feature_done, features,
    fmt,
};
pub use tickets::{
    BoardResult, DoneResult, InProgressResult, ListFilter, TicketAdded, TicketDetail, TicketList,
    UndoResult, ValidateResult, add, board, done, list, show, start, stop, undo, validate,
};

use std::collections::HashSet;

use crate::models::{Ticket, parse_ticket_ref, ticket_id};
use crate::storage::{DocumentStore, InProgressStore};
use crate::tickets::{SerializeOptions, parse_tickets, serialize_tickets};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;

    /// Whether the command should exit non-zero after printing.
    fn is_failure(&self) -> bool {
        false
    }
}

/// The collaborators a command works against.
///
/// `main` wires file-backed stores; tests use the in-memory ones.
pub struct Workspace {
    pub tickets: Box<dyn DocumentStore>,
    pub features: Box<dyn DocumentStore>,
    pub in_progress: Box<dyn InProgressStore>,
    pub options: SerializeOptions,
}

impl Workspace {
    pub fn new(
        tickets: Box<dyn DocumentStore>,
        features: Box<dyn DocumentStore>,
        in_progress: Box<dyn InProgressStore>,
        options: SerializeOptions,
    ) -> Self {
        Self {
            tickets,
            features,
            in_progress,
            options,
        }
    }

    /// Parse the current tickets document.
    pub fn load_tickets(&self) -> Result<Vec<Ticket>> {
        let content = self.tickets.read()?;
        Ok(parse_tickets(&content))
    }

    /// Rewrite the tickets document canonically.
    pub fn save_tickets(&mut self, tickets: &[Ticket]) -> Result<()> {
        let content = serialize_tickets(tickets, &self.options);
        self.tickets.write(&content)
    }
}

/// Turn CLI id arguments into canonical `ticket-N` ids that exist in `tickets`.
///
/// Repeats are dropped. Malformed ids fail with [`Error::InvalidId`], unknown
/// ones with [`Error::NotFound`].
pub fn resolve_ids<S: AsRef<str>>(raw: &[S], tickets: &[Ticket]) -> Result<Vec<String>> {
    let known: HashSet<u32> = tickets.iter().map(|t| t.number).collect();
    let mut ids = Vec::new();
    for number in parse_ids(raw)? {
        if !known.contains(&number) {
            return Err(Error::NotFound(ticket_id(number)));
        }
        let id = ticket_id(number);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Parse CLI id arguments without checking they exist.
pub fn parse_ids<S: AsRef<str>>(raw: &[S]) -> Result<Vec<u32>> {
    raw.iter()
        .map(|s| {
            let s = s.as_ref();
            parse_ticket_ref(s).ok_or_else(|| Error::InvalidId(s.to_string()))
        })
        .collect()
}

fn to_json_string<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

fn one_line(ticket: &Ticket) -> String {
    let mark = if ticket.done { "x" } else { " " };
    format!(
        "[{}] #{} {} ({}, {})",
        mark, ticket.number, ticket.title, ticket.priority, ticket.feature_name
    )
}
