//! The in-progress sidecar (`kanban-state.json`).
//!
//! The tickets grammar only knows open and done, so which tickets are being
//! worked on lives next to the per-repository data instead of in the
//! document. Format:
//!
//! ```json
//! {"inProgressIds": ["ticket-3"], "updatedAt": "2026-01-01T00:00:00.000Z"}
//! ```

use super::backend::InProgressStore;
use super::{dedup_ids, get_storage_dir, get_storage_dir_with_data_dir};
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name of the sidecar inside the repository storage directory.
pub const KANBAN_STATE_FILE: &str = "kanban-state.json";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KanbanStateFile {
    #[serde(default)]
    in_progress_ids: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

/// In-progress ids persisted as JSON under the repository's storage dir.
#[derive(Debug, Clone)]
pub struct FileInProgressStore {
    path: PathBuf,
}

impl FileInProgressStore {
    /// Open the sidecar for a repository, using the default data directory.
    pub fn open(repo_path: &Path) -> Result<Self> {
        Ok(Self::at(get_storage_dir(repo_path)?.join(KANBAN_STATE_FILE)))
    }

    /// Open the sidecar for a repository under an explicit data directory.
    pub fn open_with_data_dir(repo_path: &Path, data_dir: &Path) -> Result<Self> {
        Ok(Self::at(
            get_storage_dir_with_data_dir(repo_path, data_dir)?.join(KANBAN_STATE_FILE),
        ))
    }

    /// Use an exact file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last save time recorded in the file, if any.
    pub fn updated_at(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(state) = self.read_state()? else {
            return Ok(None);
        };
        Ok(state
            .updated_at
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    fn read_state(&self) -> Result<Option<KanbanStateFile>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let state = serde_json::from_str(&raw).map_err(|e| {
            Error::Other(format!(
                "Could not parse in-progress state {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Some(state))
    }
}

impl InProgressStore for FileInProgressStore {
    fn load(&self) -> Result<Vec<String>> {
        let Some(state) = self.read_state()? else {
            return Ok(Vec::new());
        };

        let mut ids = Vec::with_capacity(state.in_progress_ids.len());
        for value in state.in_progress_ids {
            match value {
                serde_json::Value::String(id) => ids.push(id),
                other => tracing::warn!(
                    path = %self.path.display(),
                    entry = %other,
                    "ignoring non-string in-progress entry"
                ),
            }
        }
        Ok(ids)
    }

    fn save(&mut self, ids: &[String]) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Other("In-progress state path has no parent".to_string()))?;
        fs::create_dir_all(parent)?;

        let state = KanbanStateFile {
            in_progress_ids: dedup_ids(ids)
                .into_iter()
                .map(serde_json::Value::String)
                .collect(),
            updated_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
        let json = serde_json::to_string_pretty(&state)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::info!(path = %self.path.display(), count = state.in_progress_ids.len(), "saved in-progress state");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
