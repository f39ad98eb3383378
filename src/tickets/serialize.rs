//! Canonical writer for the tickets document.
//!
//! The writer regenerates the whole document from ticket records. Prose from
//! a hand-edited document is not preserved; only what the parser reads back is.

use super::parser::EM_DASH_SEPARATOR;
use crate::models::{Priority, Ticket};
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Project name used when none is configured.
pub const DEFAULT_PROJECT_NAME: &str = "project";

/// Value of the `**Source:**` metadata line.
pub const DEFAULT_SOURCE: &str = "Kanban";

const LAST_UPDATED_PREFIX: &str = "**Last updated:** ";

static EXCESS_NEWLINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

/// Options for [`serialize_tickets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    pub project_name: String,
    pub source: String,
    pub last_updated: NaiveDate,
}

impl SerializeOptions {
    /// Options stamped with today's local date.
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            source: DEFAULT_SOURCE.to_string(),
            last_updated: Local::now().date_naive(),
        }
    }

    pub fn with_last_updated(mut self, date: NaiveDate) -> Self {
        self.last_updated = date;
        self
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_NAME)
    }
}

/// Write tickets as a complete canonical document.
///
/// Titles and descriptions are trimmed and a blank description is dropped,
/// matching what the parser reads back. Fields must otherwise already be
/// representable (see [`NewTicket::validate`]): single-line text, no spaced
/// em-dash in a title, agent names without whitespace or `@`.
///
/// [`NewTicket::validate`]: crate::tickets::NewTicket::validate
pub fn serialize_tickets(tickets: &[Ticket], options: &SerializeOptions) -> String {
    let project_name = single_line(&options.project_name);
    let mut lines: Vec<String> = vec![
        format!("# Work items (tickets) — {}", project_name),
        String::new(),
        format!("**Project:** {}", project_name),
        format!("**Source:** {}", single_line(&options.source)),
        format!("{}{}", LAST_UPDATED_PREFIX, options.last_updated.format("%Y-%m-%d")),
        String::new(),
        "---".to_string(),
        String::new(),
        "## Summary: Done vs missing".to_string(),
        String::new(),
        "### Done".to_string(),
        String::new(),
        "| Area | What's implemented |".to_string(),
        "|------|-------------------|".to_string(),
        String::new(),
        "### Missing or incomplete".to_string(),
        String::new(),
        "| Area | Gap |".to_string(),
        "|------|-----|".to_string(),
        String::new(),
        "---".to_string(),
        String::new(),
        "## Prioritized work items (tickets)".to_string(),
        String::new(),
    ];

    for (priority, groups) in group_tickets(tickets) {
        lines.push(format!("### {} — {}", priority, priority.label()));
        lines.push(String::new());
        for (feature, group) in groups {
            lines.push(format!("#### Feature: {}", feature));
            lines.push(String::new());
            lines.extend(group.iter().map(|t| render_ticket_line(t)));
            lines.push(String::new());
        }
    }

    lines.push("## Next steps".to_string());
    lines.push(String::new());
    lines.push("1. Complete open P0 tickets before moving on to P1.".to_string());

    let text = lines.join("\n") + "\n";
    EXCESS_NEWLINES_RE.replace_all(&text, "\n\n").into_owned()
}

/// Render one checklist line, the exact inverse of the parser's extraction.
pub fn render_ticket_line(ticket: &Ticket) -> String {
    let mut line = format!(
        "- [{}] #{} {}",
        if ticket.done { "x" } else { " " },
        ticket.number,
        ticket.title.trim()
    );
    if let Some(description) = ticket.description.as_deref().map(str::trim)
        && !description.is_empty()
    {
        line.push_str(EM_DASH_SEPARATOR);
        line.push_str(description);
    }
    let mentions: Vec<String> = ticket
        .agents
        .iter()
        .flatten()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(|a| format!("@{}", a))
        .collect();
    if !mentions.is_empty() {
        line.push_str(EM_DASH_SEPARATOR);
        line.push_str(&mentions.join(" "));
    }
    line
}

/// Tickets in the order the serializer writes them: by priority, then by
/// feature in first-seen order, then by number.
pub fn canonical_order(tickets: &[Ticket]) -> Vec<Ticket> {
    group_tickets(tickets)
        .into_iter()
        .flat_map(|(_, groups)| groups)
        .flat_map(|(_, group)| group.into_iter().cloned())
        .collect()
}

/// Read the `**Last updated:**` date of an existing document, if present.
pub fn document_last_updated(content: &str) -> Option<NaiveDate> {
    content
        .lines()
        .find_map(|line| line.trim().strip_prefix(LAST_UPDATED_PREFIX))
        .and_then(|date| NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok())
}

type FeatureGroups<'a> = Vec<(&'a str, Vec<&'a Ticket>)>;

/// Group tickets by priority (fixed order, empty priorities skipped) and by
/// feature within each priority (first-seen order, sorted by number inside).
fn group_tickets(tickets: &[Ticket]) -> Vec<(Priority, FeatureGroups<'_>)> {
    Priority::ALL
        .into_iter()
        .filter_map(|priority| {
            let mut groups: FeatureGroups<'_> = Vec::new();
            for ticket in tickets.iter().filter(|t| t.priority == priority) {
                match groups
                    .iter_mut()
                    .find(|(name, _)| *name == ticket.feature_name)
                {
                    Some((_, group)) => group.push(ticket),
                    None => groups.push((ticket.feature_name.as_str(), vec![ticket])),
                }
            }
            if groups.is_empty() {
                return None;
            }
            for (_, group) in groups.iter_mut() {
                group.sort_by_key(|t| t.number);
            }
            Some((priority, groups))
        })
        .collect()
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::parser::parse_tickets;

    fn options() -> SerializeOptions {
        SerializeOptions::new("MyApp")
            .with_last_updated(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap())
    }

    #[test]
    fn test_single_ticket_document() {
        let tickets = vec![Ticket::new(1, "First task", Priority::P0)];
        let md = serialize_tickets(&tickets, &options());
        assert!(md.contains("# Work items (tickets) — MyApp"));
        assert!(md.contains("### P0"));
        assert!(md.contains("#### Feature: General"));
        assert!(md.contains("- [ ] #1 First task"));
        assert!(md.contains("**Last updated:** 2026-02-01"));
        assert!(md.contains("## Next steps"));
    }

    #[test]
    fn test_default_project_name() {
        let md = serialize_tickets(&[], &SerializeOptions::default());
        assert!(md.contains("— project"));
        assert!(!md.contains("### P0"));
    }

    #[test]
    fn test_no_triple_newlines() {
        let md = serialize_tickets(&[], &options());
        assert!(!md.contains("\n\n\n"));
        assert!(md.ends_with('\n'));
        assert!(!md.ends_with("\n\n"));
    }

    #[test]
    fn test_ticket_line_segments() {
        let ticket = Ticket::new(4, "Implement API", Priority::P1)
            .with_description("backend work")
            .with_agents(["backend-dev", "frontend-dev"])
            .with_done(true);
        assert_eq!(
            render_ticket_line(&ticket),
            "- [x] #4 Implement API — backend work — @backend-dev @frontend-dev"
        );

        let agents_only = Ticket::new(5, "Wire", Priority::P1).with_agents(["ops"]);
        assert_eq!(render_ticket_line(&agents_only), "- [ ] #5 Wire — @ops");
    }

    #[test]
    fn test_priority_sections_in_fixed_order_and_skipped_when_empty() {
        let tickets = vec![
            Ticket::new(1, "Later", Priority::P3),
            Ticket::new(2, "Now", Priority::P0),
        ];
        let md = serialize_tickets(&tickets, &options());
        let p0 = md.find("### P0 — Critical / foundation").unwrap();
        let p3 = md.find("### P3 — Lower / later").unwrap();
        assert!(p0 < p3);
        assert!(!md.contains("### P1"));
        assert!(!md.contains("### P2"));
    }

    #[test]
    fn test_features_first_seen_and_numbers_sorted() {
        let tickets = vec![
            Ticket::new(5, "E", Priority::P0).with_feature("Zeta"),
            Ticket::new(3, "C", Priority::P0).with_feature("Alpha"),
            Ticket::new(1, "A", Priority::P0).with_feature("Zeta"),
        ];
        let ordered: Vec<_> = canonical_order(&tickets).iter().map(|t| t.number).collect();
        assert_eq!(ordered, vec![1, 5, 3]);

        let md = serialize_tickets(&tickets, &options());
        assert!(md.find("#### Feature: Zeta").unwrap() < md.find("#### Feature: Alpha").unwrap());
    }

    #[test]
    fn test_roundtrip_canonical_list() {
        let tickets = vec![
            Ticket::new(1, "Set up repo", Priority::P0).with_description("Initialize"),
            Ticket::new(2, "Auth", Priority::P0)
                .with_feature("Users")
                .with_done(true)
                .with_agents(["backend-dev"]),
            Ticket::new(3, "Schema", Priority::P1)
                .with_feature("Data Layer")
                .with_description("tables — and RLS")
                .with_agents(["backend-dev", "dba"]),
            Ticket::new(4, "Polish", Priority::P2).with_feature("UI"),
        ];
        assert_eq!(canonical_order(&tickets), tickets);
        let md = serialize_tickets(&tickets, &options());
        assert_eq!(parse_tickets(&md), tickets);
    }

    #[test]
    fn test_roundtrip_arbitrary_order_yields_canonical_order() {
        let tickets = vec![
            Ticket::new(9, "Last", Priority::P2),
            Ticket::new(2, "Second", Priority::P0).with_feature("Auth"),
            Ticket::new(1, "First", Priority::P0).with_feature("Auth"),
        ];
        let md = serialize_tickets(&tickets, &options());
        assert_eq!(parse_tickets(&md), canonical_order(&tickets));
    }

    #[test]
    fn test_serialize_is_idempotent_through_parse() {
        let original = "### P1\n#### Feature: X\n- [ ] #2 B — d\n- [x] #1 A\nrandom prose\n";
        let once = serialize_tickets(&parse_tickets(original), &options());
        let twice = serialize_tickets(&parse_tickets(&once), &options());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_untrimmed_fields_are_normalized() {
        let mut ticket = Ticket::new(1, "  Padded title ", Priority::P0).with_description("   ");
        ticket.agents = Some(vec![" dev ".to_string(), String::new()]);
        assert_eq!(render_ticket_line(&ticket), "- [ ] #1 Padded title — @dev");

        let md = serialize_tickets(&[ticket], &options());
        let parsed = parse_tickets(&md);
        assert_eq!(parsed[0].title, "Padded title");
        assert_eq!(parsed[0].description, None);
        assert_eq!(parsed[0].agents, Some(vec!["dev".to_string()]));
        assert_eq!(serialize_tickets(&parsed, &options()), md);
    }

    #[test]
    fn test_document_last_updated() {
        let md = serialize_tickets(&[], &options());
        assert_eq!(
            document_last_updated(&md),
            NaiveDate::from_ymd_opt(2026, 2, 1)
        );
        assert_eq!(document_last_updated("**Last updated:** (date)"), None);
        assert_eq!(document_last_updated("nothing"), None);
    }
}
