//! CLI argument definitions for ticketboard.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::models::Priority;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("TB_GIT_COMMIT"),
    ", built ",
    env!("TB_BUILD_TIMESTAMP"),
    ")"
);

/// Ticketboard - a Kanban board over a markdown tickets checklist.
///
/// The tickets document is the source of truth; the board is derived from it
/// on every run. Start with `tb board`.
#[derive(Parser, Debug)]
#[command(name = "tb")]
#[command(author, version, long_version = LONG_VERSION, about = "Kanban board sync for a markdown tickets checklist", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Run as if tb was started in <path> instead of the current directory.
    /// The path must exist. Bypasses git root detection - uses the path literally.
    /// Can also be set via TB_REPO environment variable.
    #[arg(short = 'C', long = "repo", global = true, env = "TB_REPO")]
    pub repo_path: Option<PathBuf>,

    /// Tickets document to use instead of the configured one
    #[arg(long = "tickets", global = true, value_name = "PATH")]
    pub tickets_path: Option<String>,

    /// Increase log verbosity (-v info, -vv debug). TB_LOG overrides.
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the Kanban board (default when no command is given)
    Board,

    /// List tickets from the document
    List(ListArgs),

    /// Show one ticket and the column it is in
    Show {
        /// Ticket ID (ticket-N, #N or N)
        id: String,
    },

    /// Append a new ticket and rewrite the document
    Add(AddArgs),

    /// Mark tickets done
    ///
    /// Also clears them from the in-progress column and ticks any roadmap
    /// feature whose tickets are now all done.
    Done {
        /// Ticket IDs (ticket-N, #N or N)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Reopen done tickets
    Undo {
        /// Ticket IDs (ticket-N, #N or N)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Move open tickets to the in-progress column
    Start {
        /// Ticket IDs (ticket-N, #N or N)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Take tickets off the in-progress column
    Stop {
        /// Ticket IDs (ticket-N, #N or N)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Rewrite the tickets document in canonical form
    Fmt {
        /// Only report whether the document is canonical (exit 1 if not)
        #[arg(long)]
        check: bool,
    },

    /// Check the board for structural problems (exit 1 if any)
    Validate,

    /// Show the features roadmap
    Features {
        /// Check features and tickets reference each other (exit 1 on errors)
        #[arg(long)]
        validate: bool,

        /// Complete a feature by id or 1-based position: mark its tickets done and tick it
        #[arg(long, value_name = "FEATURE", conflicts_with = "validate")]
        done: Option<String>,
    },

    /// Export tickets as a shareable markdown document
    Export {
        /// Write to this file instead of printing
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Move the tickets document to legacy/ and start a fresh one
    Archive,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Arguments for `tb list`.
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only tickets of this priority (P0-P3)
    #[arg(short = 'p', long, value_parser = parse_priority)]
    pub priority: Option<Priority>,

    /// Only tickets in this feature group (case-insensitive)
    #[arg(short = 'f', long)]
    pub feature: Option<String>,

    /// Only done tickets
    #[arg(long, conflicts_with = "open")]
    pub done: bool,

    /// Only open tickets
    #[arg(long)]
    pub open: bool,
}

/// Arguments for `tb add`.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Ticket title
    pub title: String,

    /// Description written after the title
    #[arg(short = 'd', long)]
    pub description: Option<String>,

    /// Priority (P0-P3)
    #[arg(short = 'p', long, default_value = "P1", value_parser = parse_priority)]
    pub priority: Priority,

    /// Feature group (defaults to "General")
    #[arg(short = 'f', long)]
    pub feature: Option<String>,

    /// Agent to mention (repeatable, with or without @)
    #[arg(short = 'a', long = "agent")]
    pub agents: Vec<String>,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration and where each value comes from
    Show,

    /// Set a value in the project's ticketboard.kdl
    Set {
        /// Configuration key (project-name, tickets-path, features-path, output-format)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| format!("invalid priority '{}' (expected P0, P1, P2 or P3)", s))
}
