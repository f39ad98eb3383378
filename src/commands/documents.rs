//! Whole-document commands: formatting, the features roadmap, export and
//! archiving.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{Output, Workspace, to_json_string};
use crate::models::{ParsedFeature, ticket_id};
use crate::storage::FileDocumentStore;
use crate::tickets::{
    CorrelationReport, export_markdown, mark_done, mark_feature_done_by_ticket_refs,
    parse_features, parse_tickets, serialize::document_last_updated, serialize_tickets,
    validate_correlation,
};
use crate::{Error, Result};

// === fmt ===

#[derive(Debug, Serialize)]
pub struct FmtResult {
    pub path: String,
    /// Whether the document was already canonical (ignoring its date)
    pub canonical: bool,
    /// Whether the document was rewritten
    pub written: bool,
}

impl Output for FmtResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        match (self.canonical, self.written) {
            (true, _) => format!("{} is canonical", self.path),
            (false, true) => format!("Rewrote {}", self.path),
            (false, false) => format!("{} is not canonical (run `tb fmt`)", self.path),
        }
    }

    fn is_failure(&self) -> bool {
        !self.canonical && !self.written
    }
}

/// Rewrite the tickets document in canonical form.
///
/// The `Last updated` line is ignored when deciding whether the document is
/// already canonical, so formatting an untouched document is a no-op. With
/// `check`, nothing is written.
pub fn fmt(ws: &mut Workspace, check: bool) -> Result<FmtResult> {
    let content = ws.tickets.read()?;
    let tickets = parse_tickets(&content);

    let mut as_dated = ws.options.clone();
    if let Some(date) = document_last_updated(&content) {
        as_dated.last_updated = date;
    }
    let canonical = serialize_tickets(&tickets, &as_dated) == content;

    let written = !canonical && !check;
    if written {
        ws.save_tickets(&tickets)?;
    }
    Ok(FmtResult {
        path: ws.tickets.location(),
        canonical,
        written,
    })
}

// === features ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesResult {
    pub path: String,
    pub features: Vec<ParsedFeature>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationReport>,
    /// Feature ticked by `--done`, with the tickets it closed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tickets_marked_done: Vec<String>,
}

impl Output for FeaturesResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ref id) = self.completed {
            lines.push(format!("Feature completed: {}", id));
            if !self.tickets_marked_done.is_empty() {
                lines.push(format!("Marked done: {}", self.tickets_marked_done.join(", ")));
            }
        }
        if self.features.is_empty() {
            lines.push(format!("No features found in {}", self.path));
        }
        for feature in &self.features {
            let mark = if feature.done { "x" } else { " " };
            let refs: Vec<String> = feature.ticket_refs.iter().map(|n| format!("#{}", n)).collect();
            lines.push(format!("[{}] {} ({})", mark, feature.title, refs.join(", ")));
        }
        if let Some(ref report) = self.correlation {
            lines.push(String::new());
            lines.push(report.message.clone());
            lines.extend(report.details.iter().map(|d| format!("  - {}", d)));
        }
        lines.join("\n")
    }

    fn is_failure(&self) -> bool {
        self.correlation.as_ref().is_some_and(|r| !r.ok)
    }
}

/// Parse the features roadmap, optionally checking it against the tickets.
pub fn features(ws: &Workspace, validate: bool) -> Result<FeaturesResult> {
    let features = parse_features(&ws.features.read()?);
    let correlation = if validate {
        Some(validate_correlation(&features, &ws.load_tickets()?))
    } else {
        None
    };
    Ok(FeaturesResult {
        path: ws.features.location(),
        features,
        correlation,
        completed: None,
        tickets_marked_done: Vec::new(),
    })
}

/// Complete a roadmap feature: mark every ticket it references done and
/// tick its line.
///
/// The feature is selected by its id or by its 1-based position.
pub fn feature_done(ws: &mut Workspace, selector: &str) -> Result<FeaturesResult> {
    let content = ws.features.read()?;
    let parsed = parse_features(&content);
    let selector = selector.trim();
    let feature = parsed
        .iter()
        .enumerate()
        .find(|(index, f)| f.id == selector || (index + 1).to_string() == selector)
        .map(|(_, f)| f.clone())
        .ok_or_else(|| Error::InvalidInput(format!("Feature not found: {}", selector)))?;

    if feature.ticket_refs.is_empty() {
        return Err(Error::InvalidInput(format!(
            "Feature {} does not reference any tickets",
            feature.id
        )));
    }

    let ids: Vec<String> = feature.ticket_refs.iter().copied().map(ticket_id).collect();
    let before = ws.load_tickets()?;
    let newly_done: Vec<String> = before
        .iter()
        .filter(|t| !t.done && ids.contains(&t.id()))
        .map(|t| t.id())
        .collect();

    let mutation = mark_done(before, &ids);
    if mutation.changed {
        ws.save_tickets(&mutation.tickets)?;
    }

    let in_progress = ws.in_progress.load()?;
    let kept: Vec<String> = in_progress.iter().filter(|id| !ids.contains(id)).cloned().collect();
    if kept.len() != in_progress.len() {
        ws.in_progress.save(&kept)?;
    }

    let updated = mark_feature_done_by_ticket_refs(&content, &feature.ticket_refs);
    if updated != content {
        ws.features.write(&updated)?;
    }
    tracing::info!(feature = %feature.id, tickets = newly_done.len(), "completed feature");

    Ok(FeaturesResult {
        path: ws.features.location(),
        features: parse_features(&updated),
        correlation: None,
        completed: Some(feature.id),
        tickets_marked_done: newly_done,
    })
}

// === export ===

#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
}

impl Output for ExportResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        match (&self.path, &self.markdown) {
            (Some(path), _) => format!("Exported {} ticket(s) to {}", self.count, path.display()),
            (None, Some(markdown)) if !markdown.is_empty() => markdown.clone(),
            _ => "No tickets to export.".to_string(),
        }
    }
}

/// Render the shareable export, writing it to `output` when given.
pub fn export(ws: &Workspace, output: Option<&Path>, exported_at: DateTime<Utc>) -> Result<ExportResult> {
    let tickets = ws.load_tickets()?;
    let markdown = export_markdown(&tickets, &ws.options.project_name, exported_at);

    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, format!("{}\n", markdown))?;
            tracing::info!(path = %path.display(), count = tickets.len(), "exported tickets");
            Ok(ExportResult {
                count: tickets.len(),
                path: Some(path.to_path_buf()),
                markdown: None,
            })
        }
        None => Ok(ExportResult {
            count: tickets.len(),
            path: None,
            markdown: Some(markdown),
        }),
    }
}

// === archive ===

#[derive(Debug, Serialize)]
pub struct ArchiveResult {
    /// Where the previous document went; `None` when there was none
    pub archived_to: Option<PathBuf>,
    pub path: String,
}

impl Output for ArchiveResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        match self.archived_to {
            Some(ref to) => format!("Archived to {}; started a fresh {}", to.display(), self.path),
            None => format!("Nothing to archive; started a fresh {}", self.path),
        }
    }
}

/// Move the tickets document into `legacy/` and start an empty one.
pub fn archive(ws: &mut Workspace, file: &FileDocumentStore, date: NaiveDate) -> Result<ArchiveResult> {
    let archived_to = file.archive(date)?;
    ws.save_tickets(&[])?;
    Ok(ArchiveResult {
        archived_to,
        path: ws.tickets.location(),
    })
}
