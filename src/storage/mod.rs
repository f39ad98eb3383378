//! Storage layer for ticketboard.
//!
//! Two collaborators sit around the pure ticket engine:
//! - **Documents**: the tickets / features markdown inside the repository
//!   (`.cursor/planner/tickets.md` by default)
//! - **In-progress state**: a JSON sidecar kept outside the repository at
//!   `~/.local/share/ticketboard/<repo-hash>/kanban-state.json`
//!
//! `TB_DATA_DIR` replaces the platform data directory, which keeps tests and
//! sandboxed runs away from the user's real state.

pub mod backend;
pub mod document;
pub mod kanban_state;

pub use backend::{DocumentStore, InProgressStore, MemoryDocumentStore, MemoryInProgressStore};
pub use document::{FileDocumentStore, LEGACY_DIR};
pub use kanban_state::{FileInProgressStore, KANBAN_STATE_FILE};

use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Environment variable overriding the base data directory.
pub const DATA_DIR_ENV: &str = "TB_DATA_DIR";

/// Application directory name under the data directory.
pub const APP_DIR: &str = "ticketboard";

/// Root of all ticketboard data (`<data-dir>/ticketboard`).
pub fn data_root() -> Result<PathBuf> {
    let base = match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::data_dir()
            .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?,
    };
    Ok(base.join(APP_DIR))
}

/// Get the storage directory for a repository.
///
/// Uses a hash of the repository path to create a unique directory
/// under the data root.
pub fn get_storage_dir(repo_path: &Path) -> Result<PathBuf> {
    let base = data_root()?;
    Ok(base.join(repo_hash(repo_path)?))
}

/// Same as [`get_storage_dir`] with an explicit base data directory.
pub fn get_storage_dir_with_data_dir(repo_path: &Path, data_dir: &Path) -> Result<PathBuf> {
    Ok(data_dir.join(APP_DIR).join(repo_hash(repo_path)?))
}

/// First 12 hex chars of the SHA-256 of the canonical repository path.
pub fn repo_hash(repo_path: &Path) -> Result<String> {
    let repo_canonical = repo_path
        .canonicalize()
        .map_err(|e| Error::Other(format!("Could not canonicalize repo path: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(repo_canonical.to_string_lossy().as_bytes());
    let hash_hex = format!("{:x}", hasher.finalize());
    Ok(hash_hex[..12].to_string())
}

/// Walk up from `start` looking for a `.git` entry.
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Drop repeated ids, keeping the first occurrence.
pub(crate) fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
