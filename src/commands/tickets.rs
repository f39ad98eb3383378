//! Ticket commands: read the board and move tickets between columns.

use serde::Serialize;

use super::{Output, Workspace, one_line, parse_ids, resolve_ids, to_json_string};
use crate::models::{Board, ColumnKey, Priority, Ticket, ticket_id};
use crate::tickets::{
    NewTicket, ValidationReport, append_ticket, build_board, mark_done, mark_feature_done_by_ticket_refs,
    mark_not_done, parse_features, validate_board,
};
use crate::{Error, Result};

// === board ===

#[derive(Debug, Serialize)]
pub struct BoardResult {
    #[serde(flatten)]
    pub board: Board,
}

impl Output for BoardResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for (_, column) in self.board.columns.iter() {
            lines.push(format!("{} ({})", column.name, column.items.len()));
            for ticket in &column.items {
                lines.push(format!("  {}", one_line(ticket)));
            }
        }
        lines.join("\n")
    }
}

/// Build the Kanban board from the document and the in-progress sidecar.
pub fn board(ws: &Workspace) -> Result<BoardResult> {
    let content = ws.tickets.read()?;
    let in_progress = ws.in_progress.load()?;
    Ok(BoardResult {
        board: build_board(&content, &in_progress),
    })
}

// === list ===

/// Filters for `tb list`.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub priority: Option<Priority>,
    /// Case-insensitive feature name
    pub feature: Option<String>,
    /// `Some(true)` for done only, `Some(false)` for open only
    pub done: Option<bool>,
}

impl ListFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        if let Some(p) = self.priority
            && ticket.priority != p
        {
            return false;
        }
        if let Some(ref f) = self.feature
            && !ticket.feature_name.trim().eq_ignore_ascii_case(f.trim())
        {
            return false;
        }
        if let Some(done) = self.done
            && ticket.done != done
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Serialize)]
pub struct TicketList {
    pub tickets: Vec<Ticket>,
    pub count: usize,
}

impl Output for TicketList {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        if self.tickets.is_empty() {
            return "No tickets found.".to_string();
        }
        let mut lines = vec![format!("{} ticket(s):", self.count)];
        lines.extend(self.tickets.iter().map(|t| format!("  {}", one_line(t))));
        lines.join("\n")
    }
}

pub fn list(ws: &Workspace, filter: &ListFilter) -> Result<TicketList> {
    let tickets: Vec<Ticket> = ws
        .load_tickets()?
        .into_iter()
        .filter(|t| filter.matches(t))
        .collect();
    Ok(TicketList {
        count: tickets.len(),
        tickets,
    })
}

// === show ===

#[derive(Debug, Serialize)]
pub struct TicketDetail {
    pub ticket: Ticket,
    pub column: ColumnKey,
}

impl Output for TicketDetail {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let t = &self.ticket;
        let mut lines = vec![
            format!("#{} {}", t.number, t.title),
            format!("  ID:       {}", t.id()),
            format!("  Priority: {} ({})", t.priority, t.priority.label()),
            format!("  Feature:  {}", t.feature_name),
            format!("  Status:   {}", t.status()),
            format!("  Column:   {}", self.column.display_name()),
        ];
        if let Some(ref agents) = t.agents {
            let mentions: Vec<String> = agents.iter().map(|a| format!("@{}", a)).collect();
            lines.push(format!("  Agents:   {}", mentions.join(" ")));
        }
        if let Some(ref description) = t.description {
            lines.push(String::new());
            lines.push(format!("  {}", description));
        }
        lines.join("\n")
    }
}

pub fn show(ws: &Workspace, id: &str) -> Result<TicketDetail> {
    let board = board(ws)?.board;
    let ids = resolve_ids(&[id], &board.tickets)?;
    let number = parse_ids(&ids)?[0];

    let ticket = board
        .tickets
        .iter()
        .find(|t| t.number == number)
        .cloned()
        .ok_or_else(|| Error::NotFound(ticket_id(number)))?;
    let column = board.columns.column_of(number).unwrap_or(ColumnKey::Backlog);
    Ok(TicketDetail { ticket, column })
}

// === add ===

#[derive(Debug, Serialize)]
pub struct TicketAdded {
    pub ticket: Ticket,
    pub path: String,
}

impl Output for TicketAdded {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Added {} \"{}\" ({}, {}) to {}",
            self.ticket.id(),
            self.ticket.title,
            self.ticket.priority,
            self.ticket.feature_name,
            self.path
        )
    }
}

/// Append a ticket with the next free number and rewrite the document.
pub fn add(ws: &mut Workspace, new: NewTicket) -> Result<TicketAdded> {
    new.validate().map_err(Error::InvalidInput)?;

    let mut tickets = ws.load_tickets()?;
    let ticket = append_ticket(&mut tickets, new);
    ws.save_tickets(&tickets)?;
    tracing::info!(id = %ticket.id(), "added ticket");

    Ok(TicketAdded {
        ticket,
        path: ws.tickets.location(),
    })
}

// === done / undo ===

#[derive(Debug, Serialize)]
pub struct DoneResult {
    pub ids: Vec<String>,
    /// Whether any checkbox flipped (and the document was rewritten)
    pub changed: bool,
    /// Ids taken off the in-progress sidecar
    pub removed_from_in_progress: Vec<String>,
    /// Roadmap features ticked because all their tickets are now done
    pub features_completed: Vec<String>,
}

impl Output for DoneResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if self.changed {
            lines.push(format!("Marked done: {}", self.ids.join(", ")));
        } else {
            lines.push(format!("Already done: {}", self.ids.join(", ")));
        }
        for feature in &self.features_completed {
            lines.push(format!("Feature completed: {}", feature));
        }
        lines.join("\n")
    }
}

/// Mark tickets done.
///
/// The document is only rewritten when a checkbox actually flips. The ids
/// also leave the in-progress sidecar, and a roadmap feature whose tickets
/// are now all done gets ticked in the features document.
pub fn done<S: AsRef<str>>(ws: &mut Workspace, raw_ids: &[S]) -> Result<DoneResult> {
    let tickets = ws.load_tickets()?;
    let ids = resolve_ids(raw_ids, &tickets)?;

    let mutation = mark_done(tickets, &ids);
    if mutation.changed {
        ws.save_tickets(&mutation.tickets)?;
    }

    let removed_from_in_progress = remove_in_progress(ws, &ids)?;
    let features_completed = if mutation.changed {
        complete_features(ws, &mutation.tickets, &ids)?
    } else {
        Vec::new()
    };

    Ok(DoneResult {
        ids,
        changed: mutation.changed,
        removed_from_in_progress,
        features_completed,
    })
}

#[derive(Debug, Serialize)]
pub struct UndoResult {
    pub ids: Vec<String>,
    pub changed: bool,
}

impl Output for UndoResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        if self.changed {
            format!("Reopened: {}", self.ids.join(", "))
        } else {
            format!("Already open: {}", self.ids.join(", "))
        }
    }
}

/// Clear the done checkbox, rewriting only when something flipped.
pub fn undo<S: AsRef<str>>(ws: &mut Workspace, raw_ids: &[S]) -> Result<UndoResult> {
    let tickets = ws.load_tickets()?;
    let ids = resolve_ids(raw_ids, &tickets)?;

    let mutation = mark_not_done(tickets, &ids);
    if mutation.changed {
        ws.save_tickets(&mutation.tickets)?;
    }
    Ok(UndoResult {
        ids,
        changed: mutation.changed,
    })
}

fn remove_in_progress(ws: &mut Workspace, ids: &[String]) -> Result<Vec<String>> {
    let current = ws.in_progress.load()?;
    let (removed, kept): (Vec<String>, Vec<String>) =
        current.into_iter().partition(|id| ids.contains(id));
    if !removed.is_empty() {
        ws.in_progress.save(&kept)?;
    }
    Ok(removed)
}

fn complete_features(ws: &mut Workspace, tickets: &[Ticket], ids: &[String]) -> Result<Vec<String>> {
    let mut content = ws.features.read()?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let done_numbers: Vec<u32> = tickets.iter().filter(|t| t.done).map(|t| t.number).collect();
    let marked = parse_ids(ids)?;
    let mut completed = Vec::new();

    for feature in parse_features(&content) {
        if feature.done
            || feature.ticket_refs.is_empty()
            || !feature.ticket_refs.iter().any(|n| marked.contains(n))
            || !feature.ticket_refs.iter().all(|n| done_numbers.contains(n))
        {
            continue;
        }
        let updated = mark_feature_done_by_ticket_refs(&content, &feature.ticket_refs);
        if updated != content {
            content = updated;
            completed.push(feature.id);
        }
    }

    if !completed.is_empty() {
        ws.features.write(&content)?;
        tracing::info!(features = ?completed, "ticked completed features");
    }
    Ok(completed)
}

// === start / stop ===

#[derive(Debug, Serialize)]
pub struct InProgressResult {
    /// Ids this call added or removed
    pub ids: Vec<String>,
    /// Sidecar contents after the call
    pub in_progress: Vec<String>,
}

impl Output for InProgressResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        if self.in_progress.is_empty() {
            "Nothing in progress.".to_string()
        } else {
            format!("In progress: {}", self.in_progress.join(", "))
        }
    }
}

/// Put open tickets into the in-progress column.
pub fn start<S: AsRef<str>>(ws: &mut Workspace, raw_ids: &[S]) -> Result<InProgressResult> {
    let tickets = ws.load_tickets()?;
    let ids = resolve_ids(raw_ids, &tickets)?;

    if let Some(done) = tickets.iter().find(|t| t.done && ids.contains(&t.id())) {
        return Err(Error::InvalidInput(format!(
            "{} is done; reopen it with `tb undo` before starting it",
            done.id()
        )));
    }

    let mut current = ws.in_progress.load()?;
    let added: Vec<String> = ids.into_iter().filter(|id| !current.contains(id)).collect();
    if !added.is_empty() {
        current.extend(added.iter().cloned());
        ws.in_progress.save(&current)?;
    }

    Ok(InProgressResult {
        ids: added,
        in_progress: ws.in_progress.load()?,
    })
}

/// Take tickets off the in-progress sidecar. Ids need not exist in the
/// document, so stale entries can be cleared.
pub fn stop<S: AsRef<str>>(ws: &mut Workspace, raw_ids: &[S]) -> Result<InProgressResult> {
    let ids: Vec<String> = parse_ids(raw_ids)?.into_iter().map(ticket_id).collect();
    let removed = remove_in_progress(ws, &ids)?;
    Ok(InProgressResult {
        ids: removed,
        in_progress: ws.in_progress.load()?,
    })
}

// === validate ===

#[derive(Debug, Serialize)]
pub struct ValidateResult {
    #[serde(flatten)]
    pub report: ValidationReport,
}

impl Output for ValidateResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![self.report.message.clone()];
        lines.extend(self.report.details.iter().map(|d| format!("  - {}", d)));
        lines.join("\n")
    }

    fn is_failure(&self) -> bool {
        !self.report.ok
    }
}

pub fn validate(ws: &Workspace) -> Result<ValidateResult> {
    let board = board(ws)?.board;
    Ok(ValidateResult {
        report: validate_board(&board),
    })
}
