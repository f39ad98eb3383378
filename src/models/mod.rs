//! Data models for ticketboard entities.
//!
//! This module defines the core data structures:
//! - `Ticket` - A work item parsed from one checklist line of the tickets document
//! - `Priority` - The `### P0..P3` section a ticket was found under
//! - `TicketStatus` - Display status, always derived from `Ticket::done`
//! - `ParsedFeature` - A roadmap line from the features document
//! - `Board` - The Kanban view derived from tickets plus the in-progress overlay

pub mod board;

pub use board::{Board, Column, ColumnKey, Columns};

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Feature group used when no `#### Feature:` header precedes a ticket.
pub const DEFAULT_FEATURE: &str = "General";

/// Prefix of every ticket id (`ticket-{number}`).
pub const TICKET_ID_PREFIX: &str = "ticket-";

/// Priority section of the tickets document.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Priority {
    #[default]
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    /// Every priority, in document order.
    pub const ALL: [Priority; 4] = [Priority::P0, Priority::P1, Priority::P2, Priority::P3];

    /// Parse from string, case-insensitive (`"p1"` and `"P1"` both work).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P0" => Some(Priority::P0),
            "P1" => Some(Priority::P1),
            "P2" => Some(Priority::P2),
            "P3" => Some(Priority::P3),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        }
    }

    /// Fixed label written after the code in a priority header.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::P0 => "Critical / foundation",
            Priority::P1 => "High / quality and maintainability",
            Priority::P2 => "Medium / polish and scale",
            Priority::P3 => "Lower / later",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ticket status as shown on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Todo,
    Done,
}

impl TicketStatus {
    pub fn from_done(done: bool) -> Self {
        if done {
            TicketStatus::Done
        } else {
            TicketStatus::Todo
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Todo => "Todo",
            TicketStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A work item parsed from the tickets document.
///
/// `id` and `status` are not stored: both are derived (from `number` and
/// `done` respectively) and emitted when the ticket is serialized to JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Stable cross-reference key, unique within a document
    pub number: u32,

    /// Short title
    pub title: String,

    /// Text after the first em-dash separator, if any
    #[serde(default)]
    pub description: Option<String>,

    /// Nearest preceding priority header
    #[serde(default)]
    pub priority: Priority,

    /// Nearest preceding feature header
    #[serde(default = "default_feature_name")]
    pub feature_name: String,

    /// Whether the checkbox is ticked
    #[serde(default)]
    pub done: bool,

    /// Agent mentions, without the `@` prefix
    #[serde(default)]
    pub agents: Option<Vec<String>>,

    /// Reserved; not encoded in the markdown grammar
    #[serde(default)]
    pub milestone_id: Option<i64>,

    /// Reserved; not encoded in the markdown grammar
    #[serde(default)]
    pub idea_id: Option<i64>,
}

fn default_feature_name() -> String {
    DEFAULT_FEATURE.to_string()
}

impl Ticket {
    /// Create an open ticket in the default feature group.
    pub fn new(number: u32, title: impl Into<String>, priority: Priority) -> Self {
        Self {
            number,
            title: title.into(),
            description: None,
            priority,
            feature_name: default_feature_name(),
            done: false,
            agents: None,
            milestone_id: None,
            idea_id: None,
        }
    }

    /// Set the feature group.
    pub fn with_feature(mut self, feature_name: impl Into<String>) -> Self {
        self.feature_name = feature_name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the agent mentions.
    pub fn with_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.agents = Some(agents.into_iter().map(Into::into).collect());
        self
    }

    /// Mark the checkbox as ticked.
    pub fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }

    /// The ticket id, always `ticket-{number}`.
    pub fn id(&self) -> String {
        ticket_id(self.number)
    }

    /// Status derived from `done`.
    pub fn status(&self) -> TicketStatus {
        TicketStatus::from_done(self.done)
    }
}

impl Serialize for Ticket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Ticket", 11)?;
        state.serialize_field("id", &self.id())?;
        state.serialize_field("number", &self.number)?;
        state.serialize_field("title", &self.title)?;
        if let Some(ref description) = self.description {
            state.serialize_field("description", description)?;
        } else {
            state.skip_field("description")?;
        }
        state.serialize_field("priority", &self.priority)?;
        state.serialize_field("featureName", &self.feature_name)?;
        state.serialize_field("done", &self.done)?;
        state.serialize_field("status", &self.status())?;
        if let Some(ref agents) = self.agents {
            state.serialize_field("agents", agents)?;
        } else {
            state.skip_field("agents")?;
        }
        if let Some(milestone_id) = self.milestone_id {
            state.serialize_field("milestoneId", &milestone_id)?;
        } else {
            state.skip_field("milestoneId")?;
        }
        if let Some(idea_id) = self.idea_id {
            state.serialize_field("ideaId", &idea_id)?;
        } else {
            state.skip_field("ideaId")?;
        }
        state.end()
    }
}

/// Build the id for a ticket number.
pub fn ticket_id(number: u32) -> String {
    format!("{}{}", TICKET_ID_PREFIX, number)
}

/// Parse a user-supplied ticket reference: `ticket-7`, `#7` or `7`.
///
/// Returns `None` for anything else, including zero.
pub fn parse_ticket_ref(s: &str) -> Option<u32> {
    let s = s.trim();
    let digits = s
        .strip_prefix(TICKET_ID_PREFIX)
        .or_else(|| s.strip_prefix('#'))
        .unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

/// A roadmap entry from the features document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFeature {
    /// Positional id (e.g., "feature-1-Core-Foundation")
    pub id: String,

    /// Feature title with the trailing ticket refs removed
    pub title: String,

    /// Ticket numbers referenced on the line, in order of appearance
    pub ticket_refs: Vec<u32>,

    /// Whether the checkbox is ticked
    pub done: bool,
}
