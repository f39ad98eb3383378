//! Line scanner for the tickets checklist dialect.
//!
//! The document is read top to bottom carrying two pieces of state: the
//! current priority (from `### P0..P3` headers) and the current feature group
//! (from `#### Feature: <name>` headers). Every `- [ ] #N ...` / `- [x] #N ...`
//! line becomes one ticket stamped with that state. Anything else is skipped.

use crate::models::{DEFAULT_FEATURE, Priority, Ticket};
use regex::Regex;
use std::sync::LazyLock;

static PRIORITY_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^###\s+(P[0-3])(?:\s|$)").expect("valid priority regex"));

static FEATURE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^####\s*Feature:\s*(\S.*)$").expect("valid feature regex"));

// Lowercase `x` only; `[X]` is not a checkbox in this dialect.
static TICKET_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-\s*\[([ x])\]\s+#(\d+)\s+(.+)$").expect("valid ticket regex")
});

// A run of @mentions anchored at the end, introduced by an em-dash separator.
static AGENTS_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s+—\s+(@[^\s@]+(?:\s+@[^\s@]+)*)$").expect("valid agents regex")
});

/// Separator between title and description.
pub const EM_DASH_SEPARATOR: &str = " — ";

/// What a single line of the document means to the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    PriorityHeader(Priority),
    FeatureHeader(String),
    Item(TicketLine),
    Other,
}

/// Fields extracted from a checklist line, before scan state is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketLine {
    pub done: bool,
    pub number: u32,
    pub title: String,
    pub description: Option<String>,
    pub agents: Option<Vec<String>>,
}

/// Running state threaded through the scan.
#[derive(Debug, Clone)]
struct ScanState {
    priority: Priority,
    feature: String,
    tickets: Vec<Ticket>,
}

impl Default for ScanState {
    fn default() -> Self {
        Self {
            priority: Priority::P0,
            feature: DEFAULT_FEATURE.to_string(),
            tickets: Vec::new(),
        }
    }
}

/// Parse the tickets document into tickets, in document order.
///
/// Never fails: lines that match none of the recognised shapes are ignored.
pub fn parse_tickets(content: &str) -> Vec<Ticket> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    let state = content
        .lines()
        .fold(ScanState::default(), |mut state, line| {
            match classify_line(line) {
                LineKind::PriorityHeader(priority) => state.priority = priority,
                LineKind::FeatureHeader(name) => state.feature = name,
                LineKind::Item(item) => state.tickets.push(Ticket {
                    number: item.number,
                    title: item.title,
                    description: item.description,
                    priority: state.priority,
                    feature_name: state.feature.clone(),
                    done: item.done,
                    agents: item.agents,
                    milestone_id: None,
                    idea_id: None,
                }),
                LineKind::Other => {}
            }
            state
        });

    tracing::debug!(tickets = state.tickets.len(), "parsed tickets document");
    state.tickets
}

/// Classify one line. Headers win over checklist items.
pub fn classify_line(line: &str) -> LineKind {
    let line = line.trim_end();

    if let Some(caps) = PRIORITY_HEADER_RE.captures(line)
        && let Some(priority) = Priority::parse(&caps[1])
    {
        return LineKind::PriorityHeader(priority);
    }

    if let Some(caps) = FEATURE_HEADER_RE.captures(line) {
        return LineKind::FeatureHeader(caps[1].trim().to_string());
    }

    match parse_ticket_line(line) {
        Some(item) => LineKind::Item(item),
        None => LineKind::Other,
    }
}

/// Whether `text` ends in an em-dash followed only by `@mentions`, which
/// the parser would read as the agents of a ticket line.
pub(crate) fn ends_with_agent_mentions(text: &str) -> bool {
    AGENTS_SUFFIX_RE.is_match(text)
}

/// Extract the fields of a checklist line.
///
/// Agents are stripped first, then the remainder is split at the first
/// separator, so descriptions may themselves contain em-dashes.
pub fn parse_ticket_line(line: &str) -> Option<TicketLine> {
    let caps = TICKET_ITEM_RE.captures(line.trim_end())?;
    let done = &caps[1] == "x";
    let number = caps[2].parse::<u32>().ok().filter(|n| *n > 0)?;
    let rest = caps[3].trim();

    let (rest, agents) = match AGENTS_SUFFIX_RE.captures(rest) {
        Some(agent_caps) => {
            let agents = agent_caps[2]
                .split_whitespace()
                .map(|token| token.trim_start_matches('@').to_string())
                .collect();
            (agent_caps.get(1).map_or(rest, |m| m.as_str()), Some(agents))
        }
        None => (rest, None),
    };

    let (title, description) = match rest.split_once(EM_DASH_SEPARATOR) {
        Some((title, description)) => (title.trim(), Some(description.trim())),
        None => (rest.trim(), None),
    };

    if title.is_empty() {
        return None;
    }

    Some(TicketLine {
        done,
        number,
        title: title.to_string(),
        description: description
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        agents,
    })
}
