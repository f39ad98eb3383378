//! Common test utilities for ticketboard integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's `~/.local/share/ticketboard/` or `~/.config/ticketboard/`.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// A small document covering both priorities, two features, a done ticket,
/// a description and an agent mention.
pub const SAMPLE_TICKETS: &str = "\
# Work items (tickets) — demo

## Prioritized work items (tickets)

### P0 — Critical / foundation

#### Feature: Core

- [ ] #1 Set up repo — scaffold the crate
- [x] #2 Add CI

### P1 — High / quality and maintainability

#### Feature: Docs

- [ ] #3 Write guide — @writer
";

/// A test environment with isolated data and config storage.
///
/// Each `TestEnv` creates three temporary directories:
/// - `repo_dir`: Acts as the repository root
/// - `data_dir`: Holds ticketboard's data (via `TB_DATA_DIR`)
/// - `config_dir`: Holds the system config (via `TB_CONFIG_DIR`)
///
/// The `tb()` method sets these per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub repo_dir: TempDir,
    pub data_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with isolated directories.
    pub fn new() -> Self {
        Self {
            repo_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a new test environment with the sample tickets document.
    pub fn with_sample() -> Self {
        let env = Self::new();
        env.write_tickets(SAMPLE_TICKETS);
        env
    }

    /// Get a Command for the tb binary with isolated directories.
    pub fn tb(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tb"));
        cmd.current_dir(self.repo_dir.path());
        cmd.env("TB_REPO", self.repo_dir.path());
        cmd.env("TB_DATA_DIR", self.data_dir.path());
        cmd.env("TB_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("TB_LOG");
        cmd.env_remove("TB_ACTION_LOG");
        cmd
    }

    pub fn path(&self) -> &Path {
        self.repo_dir.path()
    }

    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }

    pub fn config_path(&self) -> &Path {
        self.config_dir.path()
    }

    /// Default location of the tickets document.
    pub fn tickets_path(&self) -> PathBuf {
        self.path().join(".cursor/planner/tickets.md")
    }

    /// Default location of the features roadmap.
    pub fn features_path(&self) -> PathBuf {
        self.path().join(".cursor/planner/features.md")
    }

    pub fn write_tickets(&self, content: &str) {
        write_file(&self.tickets_path(), content);
    }

    pub fn read_tickets(&self) -> String {
        fs::read_to_string(self.tickets_path()).unwrap()
    }

    pub fn write_features(&self, content: &str) {
        write_file(&self.features_path(), content);
    }

    pub fn read_features(&self) -> String {
        fs::read_to_string(self.features_path()).unwrap()
    }

    /// Run tb with `args`, assert success, and parse stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.tb().args(args).assert().success().get_output().stdout.clone();
        serde_json::from_slice(&output).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}
