//! Ticketboard CLI - a Kanban board over a markdown tickets checklist.

use chrono::{Local, Utc};
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use ticketboard::cli::{Cli, Commands, ConfigCommands};
use ticketboard::commands::{self, ListFilter, Output, Workspace};
use ticketboard::config::{ConfigOverrides, OutputFormat, ResolvedConfig, resolve_config};
use ticketboard::storage::{FileDocumentStore, FileInProgressStore, find_git_root};
use ticketboard::tickets::{NewTicket, SerializeOptions};
use ticketboard::{action_log, telemetry};

fn main() {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    // Determine repo path: --repo flag > TB_REPO env > auto-detect git root > cwd
    let repo_path = resolve_repo_path(cli.repo_path, cli.human_readable);

    let overrides = ConfigOverrides {
        tickets_path: cli.tickets_path,
        output_format: cli.human_readable.then_some(OutputFormat::Human),
        ..ConfigOverrides::default()
    };
    let command = cli.command.unwrap_or(Commands::Board);

    let (cmd_name, args_json) = serialize_command(&command);
    let start = Instant::now();

    let result = resolve_config(&repo_path, &overrides).and_then(|config| {
        let human = config.output_format() == OutputFormat::Human;
        run_command(command, &repo_path, config, human).map(|failed| (failed, human))
    });

    let duration = start.elapsed().as_millis() as u64;
    let (success, error) = match &result {
        Ok((failed, _)) => (!failed, None),
        Err(e) => (false, Some(e.to_string())),
    };
    action_log::log_action(&repo_path, &cmd_name, args_json, success, error, duration);

    match result {
        Ok((false, _)) => {}
        Ok((true, _)) => process::exit(1),
        Err(e) => {
            // Config may not have resolved, so fall back to the flag.
            if cli.human_readable {
                eprintln!("Error: {}", e);
            } else {
                eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
            }
            process::exit(1);
        }
    }
}

/// Resolve the repository path based on explicit flag, environment variable, or auto-detection.
///
/// An explicit path (via -C/--repo or TB_REPO) is used literally. Otherwise
/// the git root of the current directory is used, falling back to the
/// current directory itself.
fn resolve_repo_path(explicit_path: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit_path {
        Some(path) => {
            if !path.is_dir() {
                let message = format!("Specified repo path does not exist: {}", path.display());
                if human {
                    eprintln!("Error: {}", message);
                } else {
                    eprintln!("{}", serde_json::json!({ "error": message }));
                }
                process::exit(1);
            }
            path
        }
        None => {
            let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            find_git_root(&cwd).unwrap_or(cwd)
        }
    }
}

fn open_workspace(repo_path: &Path, config: &ResolvedConfig) -> Result<Workspace, ticketboard::Error> {
    Ok(Workspace::new(
        Box::new(FileDocumentStore::new(config.tickets_file(repo_path))),
        Box::new(FileDocumentStore::new(config.features_file(repo_path))),
        Box::new(FileInProgressStore::open(repo_path)?),
        SerializeOptions::new(config.project_name()),
    ))
}

/// Run a command and print its output. Returns whether the command reported
/// a failure (for example `validate` finding problems).
fn run_command(
    command: Commands,
    repo_path: &Path,
    config: ResolvedConfig,
    human: bool,
) -> Result<bool, ticketboard::Error> {
    let mut ws = open_workspace(repo_path, &config)?;
    let failed = match command {
        Commands::Board => output(&commands::board(&ws)?, human),
        Commands::List(args) => {
            let filter = ListFilter {
                priority: args.priority,
                feature: args.feature,
                done: match (args.done, args.open) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
            };
            output(&commands::list(&ws, &filter)?, human)
        }
        Commands::Show { id } => output(&commands::show(&ws, &id)?, human),
        Commands::Add(args) => {
            let new = NewTicket {
                title: args.title,
                description: args.description,
                priority: args.priority,
                feature_name: args.feature,
                agents: args.agents,
            };
            output(&commands::add(&mut ws, new)?, human)
        }
        Commands::Done { ids } => output(&commands::done(&mut ws, &ids)?, human),
        Commands::Undo { ids } => output(&commands::undo(&mut ws, &ids)?, human),
        Commands::Start { ids } => output(&commands::start(&mut ws, &ids)?, human),
        Commands::Stop { ids } => output(&commands::stop(&mut ws, &ids)?, human),
        Commands::Fmt { check } => output(&commands::fmt(&mut ws, check)?, human),
        Commands::Validate => output(&commands::validate(&ws)?, human),
        Commands::Features { validate, done } => match done {
            Some(feature) => output(&commands::feature_done(&mut ws, &feature)?, human),
            None => output(&commands::features(&ws, validate)?, human),
        },
        Commands::Export { output: path } => {
            output(&commands::export(&ws, path.as_deref(), Utc::now())?, human)
        }
        Commands::Archive => {
            let file = FileDocumentStore::new(config.tickets_file(repo_path));
            let today = Local::now().date_naive();
            output(&commands::archive(&mut ws, &file, today)?, human)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => output(&commands::config_show(repo_path, config), human),
            ConfigCommands::Set { key, value } => {
                output(&commands::config_set(repo_path, &key, &value)?, human)
            }
        },
    };
    Ok(failed)
}

fn output<T: Output>(result: &T, human: bool) -> bool {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
    result.is_failure()
}

/// Name and arguments of a command, for the action log.
fn serialize_command(command: &Commands) -> (String, serde_json::Value) {
    use serde_json::json;

    match command {
        Commands::Board => ("board".to_string(), json!({})),
        Commands::List(args) => (
            "list".to_string(),
            json!({
                "priority": args.priority.map(|p| p.as_str()),
                "feature": args.feature,
                "done": args.done,
                "open": args.open,
            }),
        ),
        Commands::Show { id } => ("show".to_string(), json!({ "id": id })),
        Commands::Add(args) => (
            "add".to_string(),
            json!({
                "title": args.title,
                "description": args.description,
                "priority": args.priority.as_str(),
                "feature": args.feature,
                "agents": args.agents,
            }),
        ),
        Commands::Done { ids } => ("done".to_string(), json!({ "ids": ids })),
        Commands::Undo { ids } => ("undo".to_string(), json!({ "ids": ids })),
        Commands::Start { ids } => ("start".to_string(), json!({ "ids": ids })),
        Commands::Stop { ids } => ("stop".to_string(), json!({ "ids": ids })),
        Commands::Fmt { check } => ("fmt".to_string(), json!({ "check": check })),
        Commands::Validate => ("validate".to_string(), json!({})),
        Commands::Features { validate, done } => (
            "features".to_string(),
            json!({ "validate": validate, "done": done }),
        ),
        Commands::Export { output } => ("export".to_string(), json!({ "output": output })),
        Commands::Archive => ("archive".to_string(), json!({})),
        Commands::Config { command } => match command {
            ConfigCommands::Show => ("config show".to_string(), json!({})),
            ConfigCommands::Set { key, value } => (
                "config set".to_string(),
                json!({ "key": key, "value": value }),
            ),
        },
    }
}
