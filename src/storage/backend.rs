//! Storage traits for the two collaborators around the ticket engine.
//!
//! - `DocumentStore` - holds the tickets (or features) markdown text
//! - `InProgressStore` - holds the in-progress overlay, which the markdown
//!   grammar cannot express
//!
//! File-backed implementations live in [`super::document`] and
//! [`super::kanban_state`]; in-memory ones are provided for embedding.

use crate::Result;

/// Raw markdown persistence.
///
/// A missing document reads as the empty string. Writes replace the whole
/// document; there is no locking, so concurrent writers must serialize their
/// own read-modify-write cycles.
pub trait DocumentStore: Send + Sync {
    /// Read the full document text.
    fn read(&self) -> Result<String>;

    /// Replace the full document text.
    fn write(&mut self, content: &str) -> Result<()>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;
}

/// Persistence for the set of ticket ids currently in progress.
pub trait InProgressStore: Send + Sync {
    /// Load the ids in stored order. Missing state loads as empty.
    fn load(&self) -> Result<Vec<String>>;

    /// Replace the stored ids.
    fn save(&mut self, ids: &[String]) -> Result<()>;

    /// Get the storage location description (for display purposes).
    fn location(&self) -> String;
}

/// Document held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    content: String,
    writes: usize,
}

impl MemoryDocumentStore {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            writes: 0,
        }
    }

    /// Number of writes performed so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read(&self) -> Result<String> {
        Ok(self.content.clone())
    }

    fn write(&mut self, content: &str) -> Result<()> {
        self.content = content.to_string();
        self.writes += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// In-progress overlay held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryInProgressStore {
    ids: Vec<String>,
}

impl MemoryInProgressStore {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl InProgressStore for MemoryInProgressStore {
    fn load(&self) -> Result<Vec<String>> {
        Ok(self.ids.clone())
    }

    fn save(&mut self, ids: &[String]) -> Result<()> {
        self.ids = super::dedup_ids(ids);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
