//! Board construction: partition tickets into Kanban columns.

use super::parser::parse_tickets;
use crate::models::{Board, ColumnKey, Columns, Ticket};
use chrono::Utc;
use std::collections::HashSet;

/// Parse the tickets document and lay the tickets out on a board.
pub fn build_board<S: AsRef<str>>(content: &str, in_progress_ids: &[S]) -> Board {
    let tickets = parse_tickets(content);
    let columns = partition(&tickets, in_progress_ids);
    Board {
        tickets,
        parsed_at: Utc::now(),
        columns,
    }
}

/// Recompute columns for an already parsed board.
///
/// Used when only the in-progress overlay changed; the tickets and
/// `parsed_at` are carried over untouched.
pub fn rebuild_board<S: AsRef<str>>(board: &Board, in_progress_ids: &[S]) -> Board {
    Board {
        tickets: board.tickets.clone(),
        parsed_at: board.parsed_at,
        columns: partition(&board.tickets, in_progress_ids),
    }
}

/// Column a ticket belongs in. Done wins over the in-progress overlay.
pub fn column_for(ticket: &Ticket, in_progress: &HashSet<&str>) -> ColumnKey {
    if ticket.done {
        ColumnKey::Done
    } else if in_progress.contains(ticket.id().as_str()) {
        ColumnKey::InProgress
    } else {
        ColumnKey::Backlog
    }
}

fn partition<S: AsRef<str>>(tickets: &[Ticket], in_progress_ids: &[S]) -> Columns {
    let in_progress: HashSet<&str> = in_progress_ids.iter().map(AsRef::as_ref).collect();
    let mut columns = Columns::default();
    for ticket in tickets {
        columns
            .get_mut(column_for(ticket, &in_progress))
            .items
            .push(ticket.clone());
    }
    columns
}
