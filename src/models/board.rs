//! Kanban board types.
//!
//! A `Board` is never persisted. It is rebuilt from the parsed tickets and the
//! in-progress overlay every time it is needed.

use super::Ticket;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// The four fixed board columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    Backlog,
    InProgress,
    Done,
    /// Reserved; no rule currently routes tickets here
    Testing,
}

impl ColumnKey {
    /// Every column, in display order.
    pub const ALL: [ColumnKey; 4] = [
        ColumnKey::Backlog,
        ColumnKey::InProgress,
        ColumnKey::Done,
        ColumnKey::Testing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKey::Backlog => "backlog",
            ColumnKey::InProgress => "in_progress",
            ColumnKey::Done => "done",
            ColumnKey::Testing => "testing",
        }
    }

    /// Column heading shown to humans.
    pub fn display_name(&self) -> &'static str {
        match self {
            ColumnKey::Backlog => "Backlog",
            ColumnKey::InProgress => "In progress",
            ColumnKey::Done => "Done",
            ColumnKey::Testing => "Testing",
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One board column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub items: Vec<Ticket>,
}

impl Column {
    fn empty(key: ColumnKey) -> Self {
        Self {
            name: key.display_name().to_string(),
            items: Vec::new(),
        }
    }
}

/// The fixed set of columns, keyed the way the rendering layer expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Columns {
    pub backlog: Column,
    pub in_progress: Column,
    pub done: Column,
    pub testing: Column,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            backlog: Column::empty(ColumnKey::Backlog),
            in_progress: Column::empty(ColumnKey::InProgress),
            done: Column::empty(ColumnKey::Done),
            testing: Column::empty(ColumnKey::Testing),
        }
    }
}

impl Columns {
    pub fn get(&self, key: ColumnKey) -> &Column {
        match key {
            ColumnKey::Backlog => &self.backlog,
            ColumnKey::InProgress => &self.in_progress,
            ColumnKey::Done => &self.done,
            ColumnKey::Testing => &self.testing,
        }
    }

    pub fn get_mut(&mut self, key: ColumnKey) -> &mut Column {
        match key {
            ColumnKey::Backlog => &mut self.backlog,
            ColumnKey::InProgress => &mut self.in_progress,
            ColumnKey::Done => &mut self.done,
            ColumnKey::Testing => &mut self.testing,
        }
    }

    /// Iterate columns in display order.
    pub fn iter(&self) -> impl Iterator<Item = (ColumnKey, &Column)> {
        ColumnKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    /// Find the first column holding the ticket with this number.
    pub fn column_of(&self, number: u32) -> Option<ColumnKey> {
        self.iter()
            .find(|(_, column)| column.items.iter().any(|t| t.number == number))
            .map(|(key, _)| key)
    }
}

/// Kanban data consumed by the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Tickets in document order
    pub tickets: Vec<Ticket>,

    /// When the tickets were parsed
    #[serde(serialize_with = "serialize_millis")]
    pub parsed_at: DateTime<Utc>,

    pub columns: Columns,
}

/// ISO 8601 with millisecond precision and a `Z` suffix.
fn serialize_millis<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
