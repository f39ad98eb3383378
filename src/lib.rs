//! Ticketboard - markdown tickets checklist as the source of truth for a Kanban board.
//!
//! This library provides the core functionality for the `tb` CLI tool:
//! parsing the tickets document, deriving board columns, applying done /
//! in-progress changes, and writing the document back in canonical form.

pub mod action_log;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod storage;
pub mod telemetry;
pub mod tickets;

/// Test utilities for isolated test environments.
#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    use crate::storage::{FileDocumentStore, FileInProgressStore};

    /// Test environment with an isolated repository and data directory.
    ///
    /// Everything is passed explicitly, so tests never depend on
    /// `TB_DATA_DIR` or the user's real data directory.
    pub struct TestEnv {
        /// Simulated repository directory
        pub repo_dir: TempDir,
        /// Isolated data storage directory
        pub data_dir: TempDir,
    }

    impl TestEnv {
        pub fn new() -> Self {
            Self {
                repo_dir: TempDir::new().unwrap(),
                data_dir: TempDir::new().unwrap(),
            }
        }

        /// Get the path to the simulated repository.
        pub fn path(&self) -> &Path {
            self.repo_dir.path()
        }

        /// Get the path to the isolated data directory.
        pub fn data_path(&self) -> &Path {
            self.data_dir.path()
        }

        /// Path of the tickets document inside the repository.
        pub fn tickets_path(&self) -> PathBuf {
            self.path().join(".cursor/planner/tickets.md")
        }

        /// Document store over the tickets document.
        pub fn document_store(&self) -> FileDocumentStore {
            FileDocumentStore::new(self.tickets_path())
        }

        /// In-progress store rooted in the isolated data directory.
        pub fn in_progress_store(&self) -> FileInProgressStore {
            FileInProgressStore::open_with_data_dir(self.path(), self.data_path()).unwrap()
        }
    }

    impl Default for TestEnv {
        fn default() -> Self {
            Self::new()
        }
    }
}

/// Library-level error type for ticketboard operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ticket not found: {0}")]
    NotFound(String),

    #[error("Invalid ticket ID: {0} (expected ticket-N, #N or N)")]
    InvalidId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for ticketboard operations.
pub type Result<T> = std::result::Result<T, Error>;
