//! Features roadmap document: parsing, correlation with tickets, and
//! ticking a feature once its tickets are complete.
//!
//! A roadmap line looks like `- [ ] Core Foundation — #1, #2, #3`.

use crate::models::{ParsedFeature, Ticket};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

static FEATURE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s*\[([ x])\]\s+(.+)$").expect("valid feature line regex"));

static OPEN_FEATURE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-\s*)\[\s\]\s+(.+)$").expect("valid open line regex"));

static TICKET_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\d+)").expect("valid ticket ref regex"));

static DASHED_REFS_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*—\s*#[\d,\s#]+$").expect("valid refs suffix regex"));

static BARE_REFS_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*#\d+(\s*,\s*#\d+)*\s*$").expect("valid refs suffix regex"));

const FEATURE_ID_TITLE_CHARS: usize = 30;

/// Parse the features document into roadmap entries.
pub fn parse_features(content: &str) -> Vec<ParsedFeature> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    let mut features = Vec::new();
    for line in content.lines() {
        let Some(caps) = FEATURE_LINE_RE.captures(line.trim_end()) else {
            continue;
        };
        let done = &caps[1] == "x";
        let rest = caps[2].trim();
        let ticket_refs = ticket_refs_in(rest);

        let stripped = DASHED_REFS_SUFFIX_RE.replace(rest, "");
        let stripped = BARE_REFS_SUFFIX_RE.replace(&stripped, "");
        let title = match stripped.trim() {
            "" => rest.to_string(),
            t => t.to_string(),
        };

        let id = format!("feature-{}-{}", features.len() + 1, id_slug(&title));
        features.push(ParsedFeature {
            id,
            title,
            ticket_refs,
            done,
        });
    }

    tracing::debug!(features = features.len(), "parsed features document");
    features
}

/// Outcome of [`validate_correlation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationReport {
    pub ok: bool,
    pub message: String,
    /// Errors first, then informational notes
    pub details: Vec<String>,
    /// True when some feature references missing tickets or none at all
    pub has_invalid_features: bool,
}

/// Check that features and tickets reference each other consistently.
///
/// Errors: refs to tickets that do not exist, features without refs, and
/// ticket feature names with no matching feature. Tickets not referenced by
/// any feature are reported as information only.
pub fn validate_correlation(features: &[ParsedFeature], tickets: &[Ticket]) -> CorrelationReport {
    let mut details = Vec::new();
    let mut has_invalid_features = false;

    let ticket_numbers: BTreeSet<u32> = tickets.iter().map(|t| t.number).collect();
    let refs_in_features: BTreeSet<u32> = features
        .iter()
        .flat_map(|f| f.ticket_refs.iter().copied())
        .collect();

    let dangling: BTreeSet<u32> = refs_in_features
        .difference(&ticket_numbers)
        .copied()
        .collect();
    if !dangling.is_empty() {
        details.push(format!(
            "Ticket number(s) in features.md not found in tickets.md: {}.",
            join_refs(&dangling)
        ));
        has_invalid_features = true;
    }

    let without_refs: Vec<&str> = features
        .iter()
        .filter(|f| f.ticket_refs.is_empty())
        .map(|f| f.title.as_str())
        .collect();
    if !without_refs.is_empty() {
        details.push(format!(
            "features.md has checklist items without ticket refs (#N): {}. Each feature should reference at least one ticket.",
            without_refs.join("; ")
        ));
        has_invalid_features = true;
    }

    let feature_titles: Vec<String> = features
        .iter()
        .map(|f| f.title.trim().to_lowercase())
        .collect();
    let mut seen_names = HashSet::new();
    let unmatched: Vec<String> = tickets
        .iter()
        .map(|t| t.feature_name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .filter(|name| seen_names.insert(name.clone()))
        .filter(|name| {
            !feature_titles
                .iter()
                .any(|title| title.contains(name.as_str()) || name.contains(title.as_str()))
        })
        .collect();
    if !unmatched.is_empty() {
        details.push(format!(
            "Feature name(s) in tickets.md without matching feature in features.md: {}. Add a feature line for each.",
            unmatched.join(", ")
        ));
        has_invalid_features = true;
    }

    let error_count = details.len();
    let unreferenced: BTreeSet<u32> = ticket_numbers
        .difference(&refs_in_features)
        .copied()
        .collect();
    if !unreferenced.is_empty() {
        details.push(format!(
            "Ticket(s) in tickets.md not referenced in any feature: {}. Add to a feature for full correlation.",
            join_refs(&unreferenced)
        ));
    }

    let ok = error_count == 0;
    CorrelationReport {
        ok,
        message: if ok {
            "features.md and tickets.md are in sync (correlation and format check passed).".to_string()
        } else {
            "features.md and tickets.md need to be aligned.".to_string()
        },
        details,
        has_invalid_features,
    }
}

/// Tick the first open feature line whose ticket refs are exactly `refs`.
///
/// All other lines are returned byte-for-byte. Returns the input unchanged
/// when `refs` is empty or no line matches.
pub fn mark_feature_done_by_ticket_refs(content: &str, refs: &[u32]) -> String {
    if refs.is_empty() {
        return content.to_string();
    }
    let wanted: HashSet<u32> = refs.iter().copied().collect();

    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    let target = lines.iter().position(|line| {
        OPEN_FEATURE_LINE_RE
            .captures(line)
            .is_some_and(|caps| ticket_refs_in(&caps[2]).into_iter().collect::<HashSet<_>>() == wanted)
    });
    let Some(index) = target else {
        return content.to_string();
    };

    let line = &lines[index];
    let open = line.find('[').unwrap_or(0);
    let close = line[open..].find(']').map_or(open, |i| open + i + 1);
    let ticked = format!("{}[x]{}", &line[..open], &line[close..]);
    lines[index] = ticked;
    lines.join("\n")
}

fn ticket_refs_in(text: &str) -> Vec<u32> {
    TICKET_REF_RE
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .collect()
}

fn id_slug(title: &str) -> String {
    let head: String = title.chars().take(FEATURE_ID_TITLE_CHARS).collect();
    head.split_whitespace().collect::<Vec<_>>().join("-")
}

fn join_refs(numbers: &BTreeSet<u32>) -> String {
    numbers
        .iter()
        .map(|n| format!("#{}", n))
        .collect::<Vec<_>>()
        .join(", ")
}
