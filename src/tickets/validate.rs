//! Structural checks over board data.
//!
//! Only shape is checked: unique positive numbers, non-empty titles,
//! well-formed agent mentions, and that the columns partition the ticket list
//! consistently with each ticket's `done` flag. Priority membership is
//! enforced by the `Priority` type itself.

use crate::models::{Board, ColumnKey};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Outcome of [`validate_board`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub message: String,
    /// One entry per problem found
    pub details: Vec<String>,
}

/// Check the board for structural problems.
pub fn validate_board(board: &Board) -> ValidationReport {
    let mut details = Vec::new();

    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for ticket in &board.tickets {
        if ticket.number == 0 {
            details.push("Ticket number 0 is not allowed; numbers start at 1.".to_string());
        }
        if !seen.insert(ticket.number) {
            duplicates.insert(ticket.number);
        }
        if ticket.title.trim().is_empty() {
            details.push(format!("Ticket #{} has an empty title.", ticket.number));
        }
        if let Some(ref agents) = ticket.agents {
            if agents.is_empty() {
                details.push(format!(
                    "Ticket #{} has an empty agents list.",
                    ticket.number
                ));
            }
            for agent in agents {
                if !is_well_formed_agent(agent) {
                    details.push(format!(
                        "Ticket #{} has a malformed agent name {:?}.",
                        ticket.number, agent
                    ));
                }
            }
        }
    }
    if !duplicates.is_empty() {
        details.push(format!(
            "Duplicate ticket number(s): {}.",
            join_numbers(&duplicates)
        ));
    }

    check_columns(board, &mut details);

    let ok = details.is_empty();
    let message = if ok {
        format!(
            "Tickets parsed successfully ({} ticket(s)).",
            board.tickets.len()
        )
    } else {
        format!("Found {} problem(s) in the tickets board.", details.len())
    };

    ValidationReport {
        ok,
        message,
        details,
    }
}

fn check_columns(board: &Board, details: &mut Vec<String>) {
    let mut placements: BTreeMap<u32, Vec<ColumnKey>> = BTreeMap::new();
    for (key, column) in board.columns.iter() {
        for item in &column.items {
            placements.entry(item.number).or_default().push(key);
        }
    }

    // Tickets sharing a number are checked as a group; the duplicate itself
    // is reported by `validate_board`.
    let mut expected: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for ticket in &board.tickets {
        let entry = expected.entry(ticket.number).or_default();
        entry.0 += 1;
        if ticket.done {
            entry.1 += 1;
        }
    }

    let mut missing = BTreeSet::new();
    let mut doubled = BTreeSet::new();
    for (&number, &(count, done_count)) in &expected {
        let placed = placements.get(&number).map(Vec::as_slice).unwrap_or(&[]);
        if placed.len() < count {
            missing.insert(number);
            continue;
        }
        if placed.len() > count {
            doubled.insert(number);
            continue;
        }
        let in_done = placed.iter().filter(|k| **k == ColumnKey::Done).count();
        if in_done == done_count {
            continue;
        }
        match placed {
            [key] if done_count == 1 => details.push(format!(
                "Ticket #{} is done but sits in the {} column.",
                number, key
            )),
            [_] => details.push(format!(
                "Ticket #{} is not done but sits in the done column.",
                number
            )),
            _ => details.push(format!(
                "Tickets numbered #{} have {} done ticket(s) but {} item(s) in the done column.",
                number, done_count, in_done
            )),
        }
    }
    let strays: BTreeSet<u32> = placements
        .keys()
        .filter(|n| !expected.contains_key(*n))
        .copied()
        .collect();

    if !missing.is_empty() {
        details.push(format!(
            "Ticket(s) missing from every column: {}.",
            join_numbers(&missing)
        ));
    }
    if !doubled.is_empty() {
        details.push(format!(
            "Ticket(s) placed in more than one column: {}.",
            join_numbers(&doubled)
        ));
    }
    if !strays.is_empty() {
        details.push(format!(
            "Column item(s) not in the ticket list: {}.",
            join_numbers(&strays)
        ));
    }
}

fn is_well_formed_agent(agent: &str) -> bool {
    !agent.is_empty() && !agent.starts_with('@') && !agent.chars().any(char::is_whitespace)
}

fn join_numbers(numbers: &BTreeSet<u32>) -> String {
    numbers
        .iter()
        .map(|n| format!("#{}", n))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, Ticket};
    use crate::tickets::board::build_board;

    #[test]
    fn test_empty_board_is_ok() {
        let board = build_board("", &[] as &[&str]);
        let report = validate_board(&board);
        assert!(report.ok);
        assert!(report.message.contains("parsed successfully"));
        assert!(report.details.is_empty());
    }

    #[test]
    fn test_built_board_is_ok() {
        let content = "### P1\n- [ ] #1 A — @dev\n- [x] #2 B\n- [ ] #3 C";
        let board = build_board(content, &["ticket-3"]);
        assert!(validate_board(&board).ok);
    }

    #[test]
    fn test_duplicate_numbers() {
        let board = build_board("- [ ] #1 A\n- [ ] #1 B", &[] as &[&str]);
        let report = validate_board(&board);
        assert!(!report.ok);
        assert_eq!(report.details, vec!["Duplicate ticket number(s): #1.".to_string()]);
    }

    #[test]
    fn test_duplicate_numbers_split_across_columns() {
        let board = build_board("- [ ] #1 A\n- [x] #1 B\n- [ ] #2 C", &["ticket-1"]);
        let report = validate_board(&board);
        assert_eq!(report.details, vec!["Duplicate ticket number(s): #1.".to_string()]);
    }

    #[test]
    fn test_duplicate_numbers_with_wrong_done_count() {
        let mut board = build_board("- [ ] #1 A\n- [x] #1 B", &[] as &[&str]);
        let item = board.columns.done.items.remove(0);
        board.columns.backlog.items.push(item);
        let report = validate_board(&board);
        assert_eq!(
            report.details,
            vec![
                "Duplicate ticket number(s): #1.".to_string(),
                "Tickets numbered #1 have 1 done ticket(s) but 0 item(s) in the done column."
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_malformed_agents() {
        let mut board = build_board("- [ ] #1 A", &[] as &[&str]);
        board.tickets[0].agents = Some(vec!["@dev".to_string(), "two words".to_string()]);
        board.columns.backlog.items[0] = board.tickets[0].clone();
        let report = validate_board(&board);
        assert_eq!(report.details.len(), 2);

        board.tickets[0].agents = Some(vec![]);
        let report = validate_board(&board);
        assert!(report.details.iter().any(|d| d.contains("empty agents list")));
    }

    #[test]
    fn test_missing_and_stray_column_items() {
        let mut board = build_board("- [ ] #1 A\n- [ ] #2 B", &[] as &[&str]);
        board.columns.backlog.items.remove(0);
        board
            .columns
            .testing
            .items
            .push(Ticket::new(7, "Ghost", Priority::P0));
        let report = validate_board(&board);
        assert!(!report.ok);
        assert!(report.details.iter().any(|d| d.contains("missing from every column: #1")));
        assert!(report.details.iter().any(|d| d.contains("not in the ticket list: #7")));
    }

    #[test]
    fn test_ticket_in_two_columns() {
        let mut board = build_board("- [ ] #1 A", &[] as &[&str]);
        let copy = board.columns.backlog.items[0].clone();
        board.columns.in_progress.items.push(copy);
        let report = validate_board(&board);
        assert!(report.details.iter().any(|d| d.contains("more than one column: #1")));
    }

    #[test]
    fn test_done_ticket_outside_done_column() {
        let mut board = build_board("- [x] #1 A", &[] as &[&str]);
        let item = board.columns.done.items.remove(0);
        board.columns.in_progress.items.push(item);
        let report = validate_board(&board);
        assert!(
            report
                .details
                .iter()
                .any(|d| d.contains("#1 is done but sits in the in_progress column"))
        );
    }
}
