//! KDL schema for `config.kdl` / `ticketboard.kdl`.
//!
//! Both the system file and the project file share one schema:
//!
//! ```kdl
//! project-name "Planner"
//! tickets-path ".cursor/planner/tickets.md"
//! features-path ".cursor/planner/features.md"
//! output-format "human"  // or "json"
//! ```
//!
//! Unknown nodes are ignored so newer files still load.

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, Result};

/// Keys accepted by `tb config set`.
pub const CONFIG_KEYS: [&str; 4] = ["project-name", "tickets-path", "features-path", "output-format"];

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings read from a single KDL file. Every field is optional; the
/// resolver fills the gaps from lower-precedence layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketboardConfig {
    /// Display name used in the document header
    pub project_name: Option<String>,

    /// Tickets document, relative to the repository root
    pub tickets_path: Option<String>,

    /// Features roadmap, relative to the repository root
    pub features_path: Option<String>,

    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,
}

impl TicketboardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for (key, value) in [
            ("project-name", &self.project_name),
            ("tickets-path", &self.tickets_path),
            ("features-path", &self.features_path),
        ] {
            if let Some(v) = value
                && v.trim().is_empty()
            {
                return Err(format!("{} must not be empty", key));
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        Self {
            project_name: string_arg(doc, "project-name"),
            tickets_path: string_arg(doc, "tickets-path"),
            features_path: string_arg(doc, "features-path"),
            output_format: string_arg(doc, "output-format").and_then(|s| OutputFormat::parse(&s)),
        }
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();
        let entries = [
            ("project-name", self.project_name.clone()),
            ("tickets-path", self.tickets_path.clone()),
            ("features-path", self.features_path.clone()),
            ("output-format", self.output_format.map(|f| f.as_str().to_string())),
        ];
        for (name, value) in entries {
            if let Some(value) = value {
                let mut node = KdlNode::new(name);
                node.push(KdlEntry::new(KdlValue::String(value)));
                doc.nodes_mut().push(node);
            }
        }
        doc
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &TicketboardConfig) {
        if other.project_name.is_some() {
            self.project_name = other.project_name.clone();
        }
        if other.tickets_path.is_some() {
            self.tickets_path = other.tickets_path.clone();
        }
        if other.features_path.is_some() {
            self.features_path = other.features_path.clone();
        }
        if other.output_format.is_some() {
            self.output_format = other.output_format;
        }
    }

    /// Set a single key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::Config(format!("{} must not be empty", key)));
        }
        match key {
            "project-name" => self.project_name = Some(value.to_string()),
            "tickets-path" => self.tickets_path = Some(value.to_string()),
            "features-path" => self.features_path = Some(value.to_string()),
            "output-format" => {
                let format = OutputFormat::parse(value).ok_or_else(|| {
                    Error::Config(format!(
                        "output-format must be \"json\" or \"human\", got {}",
                        value
                    ))
                })?;
                self.output_format = Some(format);
            }
            other => {
                return Err(Error::Config(format!(
                    "Unknown config key: {} (expected one of: {})",
                    other,
                    CONFIG_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Load from a KDL file. A missing file yields an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path)?;
        let doc: KdlDocument = content
            .parse()
            .map_err(|e| Error::Config(format!("Failed to parse KDL in {}: {}", path.display(), e)))?;

        let config = Self::from_kdl(&doc);
        config
            .validate()
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Write to a KDL file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_kdl_string())?;
        Ok(())
    }

    /// Render as formatted KDL text, one node per line.
    pub fn to_kdl_string(&self) -> String {
        let mut doc = self.to_kdl();
        doc.autoformat();
        doc.to_string()
    }
}

fn string_arg(doc: &KdlDocument, name: &str) -> Option<String> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .and_then(|entry| entry.value().as_string())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("HUMAN"), Some(OutputFormat::Human));
        assert_eq!(OutputFormat::parse("yaml"), None);
    }

    #[test]
    fn test_config_from_kdl_full() {
        let kdl = r#"
            project-name "Planner"
            tickets-path "docs/tickets.md"
            features-path "docs/features.md"
            output-format "human"
            unknown-node 42
        "#;
        let doc: KdlDocument = kdl.parse().unwrap();
        let config = TicketboardConfig::from_kdl(&doc);

        assert_eq!(config.project_name.as_deref(), Some("Planner"));
        assert_eq!(config.tickets_path.as_deref(), Some("docs/tickets.md"));
        assert_eq!(config.features_path.as_deref(), Some("docs/features.md"));
        assert_eq!(config.output_format, Some(OutputFormat::Human));
    }

    #[test]
    fn test_config_from_kdl_wrong_types_ignored() {
        let doc: KdlDocument = "project-name 5\noutput-format \"xml\"".parse().unwrap();
        assert_eq!(TicketboardConfig::from_kdl(&doc), TicketboardConfig::default());
    }

    #[test]
    fn test_config_to_kdl_roundtrip() {
        let config = TicketboardConfig {
            project_name: Some("My App".to_string()),
            tickets_path: None,
            features_path: Some("f.md".to_string()),
            output_format: Some(OutputFormat::Json),
        };
        let text = config.to_kdl_string();
        let doc: KdlDocument = text.parse().unwrap();
        assert_eq!(TicketboardConfig::from_kdl(&doc), config);
    }

    #[test]
    fn test_config_merge() {
        let mut base = TicketboardConfig {
            project_name: Some("base".to_string()),
            output_format: Some(OutputFormat::Human),
            ..Default::default()
        };
        let other = TicketboardConfig {
            project_name: Some("other".to_string()),
            tickets_path: Some("t.md".to_string()),
            ..Default::default()
        };
        base.merge(&other);
        assert_eq!(base.project_name.as_deref(), Some("other"));
        assert_eq!(base.tickets_path.as_deref(), Some("t.md"));
        assert_eq!(base.output_format, Some(OutputFormat::Human));
    }

    #[test]
    fn test_config_set() {
        let mut config = TicketboardConfig::new();
        config.set("output-format", "Human").unwrap();
        assert_eq!(config.output_format, Some(OutputFormat::Human));
        assert!(matches!(config.set("output-format", "xml"), Err(Error::Config(_))));
        assert!(matches!(config.set("editor", "vim"), Err(Error::Config(_))));
        assert!(matches!(config.set("project-name", "  "), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_strings() {
        let config = TicketboardConfig {
            tickets_path: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().contains("tickets-path"));
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ticketboard.kdl");
        assert_eq!(TicketboardConfig::load(&path).unwrap(), TicketboardConfig::default());

        std::fs::write(&path, "project-name \"unterminated").unwrap();
        assert!(matches!(TicketboardConfig::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.kdl");
        let mut config = TicketboardConfig::new();
        config.set("project-name", "Roundtrip").unwrap();
        config.save(&path).unwrap();
        assert_eq!(TicketboardConfig::load(&path).unwrap(), config);
    }
}
