//! `tb config` commands.

use std::path::Path;

use serde::Serialize;

use super::{Output, to_json_string};
use crate::config::{ResolvedConfig, TicketboardConfig, project_config_path, set_project_value};
use crate::Result;

#[derive(Debug, Serialize)]
pub struct ConfigShow {
    #[serde(flatten)]
    pub resolved: ResolvedConfig,
    pub project_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_file: Option<String>,
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let r = &self.resolved;
        let mut lines = vec![
            format!("project-name  = {} ({})", r.project_name.value, r.project_name.source),
            format!("tickets-path  = {} ({})", r.tickets_path.value, r.tickets_path.source),
            format!("features-path = {} ({})", r.features_path.value, r.features_path.source),
            format!("output-format = {} ({})", r.output_format.value, r.output_format.source),
            String::new(),
            format!("Project file: {}", self.project_file),
        ];
        if let Some(ref system) = self.system_file {
            lines.push(format!("System file:  {}", system));
        }
        lines.join("\n")
    }
}

/// Report the effective configuration and where each value came from.
pub fn config_show(repo_path: &Path, resolved: ResolvedConfig) -> ConfigShow {
    ConfigShow {
        resolved,
        project_file: project_config_path(repo_path).display().to_string(),
        system_file: crate::config::system_config_path().map(|p| p.display().to_string()),
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigSet {
    pub key: String,
    pub value: String,
    pub path: String,
    pub config: TicketboardConfig,
}

impl Output for ConfigSet {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {} in {}", self.key, self.value, self.path)
    }
}

/// Write one key into the project's `ticketboard.kdl`.
pub fn config_set(repo_path: &Path, key: &str, value: &str) -> Result<ConfigSet> {
    let config = set_project_value(repo_path, key, value)?;
    Ok(ConfigSet {
        key: key.to_string(),
        value: value.trim().to_string(),
        path: project_config_path(repo_path).display().to_string(),
        config,
    })
}
