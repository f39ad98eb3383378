//! Integration tests for action logging.
//!
//! These tests verify that:
//! - Commands are logged to action.log under the data directory
//! - Failures are logged with their error
//! - Logging can be disabled via TB_ACTION_LOG

mod common;

use common::TestEnv;
use std::fs;

fn read_action_log(env: &TestEnv) -> Vec<serde_json::Value> {
    let log_path = env.data_path().join("ticketboard/action.log");
    if !log_path.exists() {
        return Vec::new();
    }
    fs::read_to_string(&log_path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_commands_are_logged() {
    let env = TestEnv::with_sample();
    env.json(&["board"]);
    env.json(&["done", "1"]);

    let entries = read_action_log(&env);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["command"], "board");
    assert_eq!(entries[1]["command"], "done");
    assert_eq!(entries[1]["args"]["ids"], serde_json::json!(["1"]));
    assert_eq!(entries[1]["success"], true);
    assert!(entries[1]["duration_ms"].is_u64());
}

#[test]
fn test_failures_are_logged() {
    let env = TestEnv::with_sample();
    env.tb().args(["show", "77"]).assert().failure();

    let entries = read_action_log(&env);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["success"], false);
    assert!(entries[0]["error"].as_str().unwrap().contains("ticket-77"));
}

#[test]
fn test_logging_can_be_disabled() {
    let env = TestEnv::with_sample();
    env.tb()
        .env("TB_ACTION_LOG", "0")
        .arg("board")
        .assert()
        .success();
    assert!(read_action_log(&env).is_empty());
}
