//! Standalone markdown export of a ticket list, for sharing outside the
//! planner. Unlike the canonical writer this format is not parsed back.

use crate::models::Ticket;
use chrono::{DateTime, SecondsFormat, Utc};

/// Render tickets as a shareable markdown document.
///
/// Returns an empty string when there is nothing to export.
pub fn export_markdown(tickets: &[Ticket], project_name: &str, exported_at: DateTime<Utc>) -> String {
    if tickets.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        "# Project tickets".to_string(),
        String::new(),
        format!("**Project:** {}", escape_heading(project_name)),
        format!(
            "Exported at {}. {} ticket(s).",
            exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            tickets.len()
        ),
        String::new(),
        "---".to_string(),
        String::new(),
    ];

    for ticket in tickets {
        let title = match ticket.title.trim() {
            "" => "Untitled".to_string(),
            t => escape_heading(t),
        };
        lines.push(format!("## #{} — {}", ticket.number, title));
        lines.push(String::new());
        lines.push(format!(
            "**Priority:** {} · **Status:** {} · **Feature:** {}",
            ticket.priority,
            ticket.status(),
            escape_heading(&ticket.feature_name)
        ));
        lines.push(String::new());
        if let Some(description) = ticket.description.as_deref().map(str::trim)
            && !description.is_empty()
        {
            lines.push(description.to_string());
            lines.push(String::new());
        }
        lines.push("---".to_string());
        lines.push(String::new());
    }

    lines.join("\n").trim_end().to_string()
}

fn escape_heading(text: &str) -> String {
    text.replace('#', "\\#")
}
