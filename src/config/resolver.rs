//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Project file (`<repo>/ticketboard.kdl`)
//! 3. System file (`~/.config/ticketboard/config.kdl`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{OutputFormat, TicketboardConfig};
use crate::tickets::serialize::DEFAULT_PROJECT_NAME;
use crate::{Error, Result};

/// Environment variable overriding the system config directory.
pub const CONFIG_DIR_ENV: &str = "TB_CONFIG_DIR";

/// File name of the system config inside the config directory.
pub const SYSTEM_CONFIG_FILE: &str = "config.kdl";

/// File name of the project config at the repository root.
pub const PROJECT_CONFIG_FILE: &str = "ticketboard.kdl";

pub const DEFAULT_TICKETS_PATH: &str = ".cursor/planner/tickets.md";
pub const DEFAULT_FEATURES_PATH: &str = ".cursor/planner/features.md";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from the project's ticketboard.kdl
    Project,
    /// Value from the system config.kdl
    System,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Project => write!(f, "project"),
            ValueSource::System => write!(f, "system"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub project_name: Resolved<String>,
    pub tickets_path: Resolved<String>,
    pub features_path: Resolved<String>,
    pub output_format: Resolved<OutputFormat>,
}

impl ResolvedConfig {
    /// Defaults for a repository at `repo_path`.
    pub fn defaults(repo_path: &Path) -> Self {
        Self {
            project_name: Resolved::new(default_project_name(repo_path), ValueSource::Default),
            tickets_path: Resolved::new(DEFAULT_TICKETS_PATH.to_string(), ValueSource::Default),
            features_path: Resolved::new(DEFAULT_FEATURES_PATH.to_string(), ValueSource::Default),
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name.value
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format.value
    }

    /// Absolute path of the tickets document.
    pub fn tickets_file(&self, repo_path: &Path) -> PathBuf {
        repo_path.join(&self.tickets_path.value)
    }

    /// Absolute path of the features roadmap.
    pub fn features_file(&self, repo_path: &Path) -> PathBuf {
        repo_path.join(&self.features_path.value)
    }
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub project_name: Option<String>,
    pub tickets_path: Option<String>,
    pub features_path: Option<String>,
    pub output_format: Option<OutputFormat>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output format override.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Set tickets path override.
    pub fn with_tickets_path(mut self, path: impl Into<String>) -> Self {
        self.tickets_path = Some(path.into());
        self
    }
}

/// Directory holding the system config.
pub fn system_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join("ticketboard")),
    }
}

pub fn system_config_path() -> Option<PathBuf> {
    system_config_dir().map(|d| d.join(SYSTEM_CONFIG_FILE))
}

pub fn project_config_path(repo_path: &Path) -> PathBuf {
    repo_path.join(PROJECT_CONFIG_FILE)
}

/// Read the system config; empty when no config directory is known.
pub fn read_system_config() -> Result<TicketboardConfig> {
    match system_config_path() {
        Some(path) => TicketboardConfig::load(&path),
        None => Ok(TicketboardConfig::new()),
    }
}

pub fn read_project_config(repo_path: &Path) -> Result<TicketboardConfig> {
    TicketboardConfig::load(&project_config_path(repo_path))
}

/// Resolve configuration with the full precedence chain.
pub fn resolve_config(repo_path: &Path, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let system = read_system_config()?;
    let project = read_project_config(repo_path)?;
    Ok(resolve_layers(repo_path, overrides, &project, &system))
}

/// Combine already-loaded layers.
pub fn resolve_layers(
    repo_path: &Path,
    overrides: &ConfigOverrides,
    project: &TicketboardConfig,
    system: &TicketboardConfig,
) -> ResolvedConfig {
    let defaults = ResolvedConfig::defaults(repo_path);

    ResolvedConfig {
        project_name: pick(
            &overrides.project_name,
            &project.project_name,
            &system.project_name,
            defaults.project_name,
        ),
        tickets_path: pick(
            &overrides.tickets_path,
            &project.tickets_path,
            &system.tickets_path,
            defaults.tickets_path,
        ),
        features_path: pick(
            &overrides.features_path,
            &project.features_path,
            &system.features_path,
            defaults.features_path,
        ),
        output_format: pick(
            &overrides.output_format,
            &project.output_format,
            &system.output_format,
            defaults.output_format,
        ),
    }
}

fn pick<T: Clone>(
    cli: &Option<T>,
    project: &Option<T>,
    system: &Option<T>,
    default: Resolved<T>,
) -> Resolved<T> {
    if let Some(v) = cli {
        Resolved::new(v.clone(), ValueSource::CliFlag)
    } else if let Some(v) = project {
        Resolved::new(v.clone(), ValueSource::Project)
    } else if let Some(v) = system {
        Resolved::new(v.clone(), ValueSource::System)
    } else {
        default
    }
}

/// Directory name of the repository, or `"project"`.
pub fn default_project_name(repo_path: &Path) -> String {
    let canonical = repo_path.canonicalize().ok();
    canonical
        .as_deref()
        .unwrap_or(repo_path)
        .file_name()
        .map(|n| n.to_string_lossy().trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string())
}

/// Update one key in the project file, returning the saved config.
pub fn set_project_value(repo_path: &Path, key: &str, value: &str) -> Result<TicketboardConfig> {
    let path = project_config_path(repo_path);
    let mut config = TicketboardConfig::load(&path)?;
    config.set(key, value)?;
    config.validate().map_err(Error::Config)?;
    config.save(&path)?;
    tracing::info!(path = %path.display(), key, "updated project config");
    Ok(config)
}
