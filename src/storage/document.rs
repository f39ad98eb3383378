//! File-backed markdown documents.

use super::backend::DocumentStore;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Name of the directory archived documents are moved into.
pub const LEGACY_DIR: &str = "legacy";

/// A markdown document on disk.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    path: PathBuf,
}

impl FileDocumentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Move the document to `<dir>/legacy/<stem>-YYYY-MM-DD.md`.
    ///
    /// A `-2`, `-3`, ... suffix is added when that name is taken. Returns
    /// `None` when there is no document to archive.
    pub fn archive(&self, date: NaiveDate) -> Result<Option<PathBuf>> {
        if !self.exists() {
            return Ok(None);
        }

        let parent = self.parent_dir();
        let legacy_dir = parent.join(LEGACY_DIR);
        fs::create_dir_all(&legacy_dir)?;

        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        let base = format!("{}-{}", stem, date.format("%Y-%m-%d"));

        let mut target = legacy_dir.join(format!("{}.md", base));
        let mut attempt = 2;
        while target.exists() {
            target = legacy_dir.join(format!("{}-{}.md", base, attempt));
            attempt += 1;
        }

        fs::rename(&self.path, &target)?;
        tracing::info!(from = %self.path.display(), to = %target.display(), "archived document");
        Ok(Some(target))
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

impl DocumentStore for FileDocumentStore {
    fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write via a temp file in the same directory, then rename over the target.
    fn write(&mut self, content: &str) -> Result<()> {
        let parent = self.parent_dir();
        fs::create_dir_all(&parent)?;

        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(&self.path)
            .map_err(|e| Error::Io(e.error))?;

        tracing::info!(path = %self.path.display(), bytes = content.len(), "wrote document");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
