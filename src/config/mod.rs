//! Configuration for ticketboard.
//!
//! One KDL schema, read from two places:
//! - System: `~/.config/ticketboard/config.kdl` (`TB_CONFIG_DIR` overrides the directory)
//! - Project: `<repo>/ticketboard.kdl`
//!
//! Contains:
//! - `project-name` - name written into the document header
//! - `tickets-path` - tickets document, relative to the repository
//! - `features-path` - features roadmap, relative to the repository
//! - `output-format` - "json" or "human"
//!
//! ## Precedence
//!
//! CLI flag > project config > system config > defaults
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_DIR_ENV, ConfigOverrides, DEFAULT_FEATURES_PATH, DEFAULT_TICKETS_PATH,
    PROJECT_CONFIG_FILE, Resolved, ResolvedConfig, ValueSource, project_config_path,
    resolve_config, set_project_value, system_config_path,
};
pub use schema::{CONFIG_KEYS, OutputFormat, TicketboardConfig};
