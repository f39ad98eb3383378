//! Ticket markdown engine.
//!
//! Pure, synchronous transforms between the tickets document and structured
//! data. Nothing in here performs I/O; reading and writing documents is the
//! job of the [`crate::storage`] collaborators.
//!
//! - `parser` - document text to tickets
//! - `board` - tickets plus the in-progress overlay to Kanban columns
//! - `mutate` - done / not-done toggles and ticket creation
//! - `serialize` - tickets back to a canonical document
//! - `validate` - structural checks over a board
//! - `features` - the companion features roadmap document
//! - `export` - shareable markdown export

pub mod board;
pub mod export;
pub mod features;
pub mod mutate;
pub mod parser;
pub mod serialize;
pub mod validate;

pub use board::{build_board, rebuild_board};
pub use export::export_markdown;
pub use features::{
    CorrelationReport, mark_feature_done_by_ticket_refs, parse_features, validate_correlation,
};
pub use mutate::{Mutation, NewTicket, append_ticket, mark_done, mark_not_done, next_ticket_number};
pub use parser::parse_tickets;
pub use serialize::{SerializeOptions, canonical_order, serialize_tickets};
pub use validate::{ValidationReport, validate_board};
