//! Pure transforms over ticket lists.
//!
//! Mutators hand back a [`Mutation`] whose `changed` flag tells the caller
//! whether anything actually flipped, so redundant writes and re-renders can
//! be skipped.

use crate::models::{Priority, Ticket};
use crate::tickets::parser::{EM_DASH_SEPARATOR, ends_with_agent_mentions};
use std::collections::HashSet;

/// Result of a done/not-done mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub tickets: Vec<Ticket>,
    /// True iff at least one ticket's `done` value changed
    pub changed: bool,
}

impl Mutation {
    fn unchanged(tickets: Vec<Ticket>) -> Self {
        Self {
            tickets,
            changed: false,
        }
    }
}

/// Tick the checkbox of every ticket whose id is in `ids`.
///
/// An empty `ids` returns the input vector untouched.
pub fn mark_done<S: AsRef<str>>(tickets: Vec<Ticket>, ids: &[S]) -> Mutation {
    set_done(tickets, ids, true)
}

/// Clear the checkbox of every ticket whose id is in `ids`.
///
/// An empty `ids` returns the input vector untouched.
pub fn mark_not_done<S: AsRef<str>>(tickets: Vec<Ticket>, ids: &[S]) -> Mutation {
    set_done(tickets, ids, false)
}

fn set_done<S: AsRef<str>>(mut tickets: Vec<Ticket>, ids: &[S], done: bool) -> Mutation {
    if ids.is_empty() {
        return Mutation::unchanged(tickets);
    }

    let wanted: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();
    let mut changed = false;
    for ticket in tickets.iter_mut() {
        if ticket.done != done && wanted.contains(ticket.id().as_str()) {
            ticket.done = done;
            changed = true;
        }
    }

    tracing::debug!(done, changed, ids = ids.len(), "applied done mutation");
    Mutation { tickets, changed }
}

/// Fields for a ticket that does not have a number yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub feature_name: Option<String>,
    pub agents: Vec<String>,
}

impl NewTicket {
    /// Check that every field can be written as one checklist line and read
    /// back unchanged.
    ///
    /// Values are judged after the trimming [`append_ticket`] applies.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Ticket title must not be empty".to_string());
        }
        if has_line_break(title) {
            return Err("Ticket title must be a single line".to_string());
        }
        if title.split_whitespace().any(|word| word == "—") {
            return Err(format!(
                "Ticket title must not contain a spaced em-dash (\"{}\"); put details in the description",
                EM_DASH_SEPARATOR.trim()
            ));
        }

        if let Some(description) = self.description.as_deref().map(str::trim) {
            if has_line_break(description) {
                return Err("Ticket description must be a single line".to_string());
            }
            if !description.is_empty()
                && ends_with_agent_mentions(&format!("{}{}{}", title, EM_DASH_SEPARATOR, description))
            {
                return Err(
                    "Ticket description must not end with @mentions; pass agents separately"
                        .to_string(),
                );
            }
        }

        if let Some(feature) = self.feature_name.as_deref()
            && has_line_break(feature)
        {
            return Err("Feature name must be a single line".to_string());
        }

        for agent in &self.agents {
            let name = agent.trim().trim_start_matches('@');
            if name.contains('@') || name.chars().any(char::is_whitespace) {
                return Err(format!(
                    "Agent name {:?} must be a single word without '@'",
                    agent
                ));
            }
        }
        Ok(())
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\n', '\r'])
}

/// Next free ticket number: one past the highest in use.
pub fn next_ticket_number(tickets: &[Ticket]) -> u32 {
    tickets
        .iter()
        .map(|t| t.number)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Append a new open ticket with the next free number and return a copy of it.
///
/// Callers writing the result to a document check [`NewTicket::validate`]
/// first; fields that fail it do not survive a parse.
pub fn append_ticket(tickets: &mut Vec<Ticket>, new: NewTicket) -> Ticket {
    let mut ticket = Ticket::new(next_ticket_number(tickets), new.title.trim(), new.priority);
    if let Some(feature) = new.feature_name.filter(|f| !f.trim().is_empty()) {
        ticket.feature_name = feature.trim().to_string();
    }
    ticket.description = new
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    let agents: Vec<String> = new
        .agents
        .iter()
        .map(|a| a.trim().trim_start_matches('@').to_string())
        .filter(|a| !a.is_empty())
        .collect();
    if !agents.is_empty() {
        ticket.agents = Some(agents);
    }
    tickets.push(ticket.clone());
    ticket
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TicketStatus;

    const NO_IDS: &[&str] = &[];

    fn two_open() -> Vec<Ticket> {
        vec![
            Ticket::new(1, "A", Priority::P0),
            Ticket::new(2, "B", Priority::P0),
        ]
    }

    #[test]
    fn test_mark_done_only_matching() {
        let result = mark_done(two_open(), &["ticket-2"]);
        assert!(result.changed);
        assert!(!result.tickets[0].done);
        assert!(result.tickets[1].done);
        assert_eq!(result.tickets[1].status(), TicketStatus::Done);
    }

    #[test]
    fn test_mark_done_empty_ids_is_noop() {
        let tickets = two_open();
        let ptr = tickets.as_ptr();
        let result = mark_done(tickets, NO_IDS);
        assert!(!result.changed);
        // Same allocation handed back.
        assert_eq!(result.tickets.as_ptr(), ptr);
    }

    #[test]
    fn test_mark_done_already_done_reports_unchanged() {
        let tickets = vec![Ticket::new(1, "A", Priority::P0).with_done(true)];
        let result = mark_done(tickets, &["ticket-1"]);
        assert!(!result.changed);
        assert!(result.tickets[0].done);
    }

    #[test]
    fn test_mark_done_unknown_id_is_unchanged() {
        let result = mark_done(two_open(), &["ticket-9"]);
        assert!(!result.changed);
        assert_eq!(result.tickets, two_open());
    }

    #[test]
    fn test_mark_not_done_clears_done_and_status() {
        let tickets = vec![Ticket::new(1, "A", Priority::P0).with_done(true)];
        let result = mark_not_done(tickets, &["ticket-1".to_string()]);
        assert!(result.changed);
        assert!(!result.tickets[0].done);
        assert_eq!(result.tickets[0].status(), TicketStatus::Todo);
    }

    #[test]
    fn test_mark_not_done_empty_ids_is_noop() {
        let tickets = vec![Ticket::new(1, "A", Priority::P0).with_done(true)];
        let result = mark_not_done(tickets.clone(), NO_IDS);
        assert!(!result.changed);
        assert_eq!(result.tickets, tickets);
    }

    #[test]
    fn test_next_ticket_number() {
        assert_eq!(next_ticket_number(&[]), 1);
        let tickets = vec![
            Ticket::new(7, "A", Priority::P0),
            Ticket::new(3, "B", Priority::P0),
        ];
        assert_eq!(next_ticket_number(&tickets), 8);
    }

    #[test]
    fn test_append_ticket_normalizes_fields() {
        let mut tickets = two_open();
        let ticket = append_ticket(
            &mut tickets,
            NewTicket {
                title: "  Add login ".to_string(),
                description: Some("  ".to_string()),
                priority: Priority::P1,
                feature_name: Some("Auth".to_string()),
                agents: vec!["@backend-dev".to_string(), "".to_string()],
            },
        );
        assert_eq!(ticket.number, 3);
        assert_eq!(ticket.title, "Add login");
        assert_eq!(ticket.description, None);
        assert_eq!(ticket.feature_name, "Auth");
        assert_eq!(ticket.agents, Some(vec!["backend-dev".to_string()]));
        assert_eq!(tickets.len(), 3);
        assert_eq!(tickets[2], ticket);
    }

    #[test]
    fn test_append_ticket_defaults_to_general() {
        let mut tickets = Vec::new();
        let ticket = append_ticket(
            &mut tickets,
            NewTicket {
                title: "First".to_string(),
                ..Default::default()
            },
        );
        assert_eq!(ticket.number, 1);
        assert_eq!(ticket.feature_name, "General");
        assert_eq!(ticket.agents, None);
    }

    fn new_ticket(title: &str) -> NewTicket {
        NewTicket {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_accepts_representable_ticket() {
        let new = NewTicket {
            title: "Login—SSO".to_string(),
            description: Some("uses OIDC — see @auth docs".to_string()),
            feature_name: Some("Auth".to_string()),
            agents: vec!["@backend-dev".to_string(), "qa".to_string()],
            ..Default::default()
        };
        assert_eq!(new.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_line_breaks() {
        let mut new = new_ticket("Real");
        new.description = Some("line one\n- [x] #99 Injected".to_string());
        assert!(new.validate().unwrap_err().contains("description"));

        let mut new = new_ticket("Real");
        new.feature_name = Some("Auth\r\n### P0".to_string());
        assert!(new.validate().unwrap_err().contains("Feature name"));

        let mut new = new_ticket("Real");
        new.agents = vec!["dev\n- [ ] #5 Sneaky".to_string()];
        assert!(new.validate().unwrap_err().contains("Agent name"));

        assert!(new_ticket("one\ntwo").validate().unwrap_err().contains("single line"));
    }

    #[test]
    fn test_validate_rejects_unrepresentable_fields() {
        assert!(new_ticket("Login — SSO").validate().unwrap_err().contains("em-dash"));
        assert!(new_ticket("Trailing —").validate().is_err());

        let mut new = new_ticket("Login");
        new.agents = vec!["two words".to_string()];
        assert!(new.validate().is_err());
        new.agents = vec!["a@b".to_string()];
        assert!(new.validate().is_err());

        let mut new = new_ticket("Login");
        new.description = Some("hand off — @reviewer".to_string());
        assert!(new.validate().unwrap_err().contains("@mentions"));
        new.description = Some("@reviewer".to_string());
        assert!(new.validate().is_err());
    }

    #[test]
    fn test_validated_ticket_survives_a_parse() {
        use crate::tickets::parser::parse_tickets;
        use crate::tickets::serialize::{SerializeOptions, serialize_tickets};

        let new = NewTicket {
            title: "Login—SSO".to_string(),
            description: Some("first — second".to_string()),
            priority: Priority::P2,
            feature_name: Some("Auth".to_string()),
            agents: vec!["dev".to_string()],
        };
        new.validate().unwrap();
        let mut tickets = Vec::new();
        let ticket = append_ticket(&mut tickets, new);
        let md = serialize_tickets(&tickets, &SerializeOptions::default());
        assert_eq!(parse_tickets(&md), vec![ticket]);
    }
}
