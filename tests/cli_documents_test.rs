//! Integration tests for whole-document commands: fmt, validate, features,
//! export and archive.

mod common;

use common::{SAMPLE_TICKETS, TestEnv};
use predicates::prelude::*;
use std::fs;

// === fmt ===

#[test]
fn test_fmt_check_then_rewrite() {
    let env = TestEnv::with_sample();

    let check = env.tb().args(["fmt", "--check"]).assert().failure().get_output().stdout.clone();
    let check: serde_json::Value = serde_json::from_slice(&check).unwrap();
    assert_eq!(check["canonical"], false);
    assert_eq!(env.read_tickets(), SAMPLE_TICKETS);

    let rewrite = env.json(&["fmt"]);
    assert_eq!(rewrite["written"], true);
    let content = env.read_tickets();
    assert!(content.contains("**Last updated:** "));
    assert!(content.contains("## Next steps"));

    let again = env.json(&["fmt", "--check"]);
    assert_eq!(again["canonical"], true);
}

#[test]
fn test_fmt_preserves_tickets() {
    let env = TestEnv::with_sample();
    let before = env.json(&["list"]);
    env.json(&["fmt"]);
    assert_eq!(env.json(&["list"]), before);
}

// === validate ===

#[test]
fn test_validate_ok() {
    let env = TestEnv::with_sample();
    let report = env.json(&["validate"]);
    assert_eq!(report["ok"], true);
    assert!(report["message"].as_str().unwrap().contains("parsed successfully"));
}

#[test]
fn test_validate_reports_duplicates() {
    let env = TestEnv::new();
    env.write_tickets("### P0\n\n- [ ] #1 One\n- [ ] #1 Again\n");
    env.tb()
        .args(["-H", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Duplicate ticket number(s): #1"));
}

// === features ===

#[test]
fn test_features_list_and_validate() {
    let env = TestEnv::with_sample();
    env.write_features("# Roadmap\n\n- [ ] Core platform — #1, #2\n- [x] Documentation — #3\n");

    let result = env.json(&["features"]);
    let features = result["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["id"], "feature-1-Core-platform");
    assert_eq!(features[0]["ticketRefs"], serde_json::json!([1, 2]));
    assert_eq!(features[1]["done"], true);
    assert!(result.get("correlation").is_none());

    let validated = env.tb().args(["features", "--validate"]).assert().failure().get_output().stdout.clone();
    let validated: serde_json::Value = serde_json::from_slice(&validated).unwrap();
    // The "Docs" ticket feature matches no feature title.
    assert_eq!(validated["correlation"]["ok"], false);
}

#[test]
fn test_features_validate_passes_when_consistent() {
    let env = TestEnv::with_sample();
    env.write_features("- [ ] Core — #1, #2\n- [ ] Docs — #3\n");
    let validated = env.json(&["features", "--validate"]);
    assert_eq!(validated["correlation"]["ok"], true);
}

#[test]
fn test_done_ticks_completed_feature() {
    let env = TestEnv::with_sample();
    env.write_features("- [ ] Core — #1, #2\n- [ ] Docs — #3\n");

    let done = env.json(&["done", "1"]);
    assert_eq!(done["features_completed"], serde_json::json!(["feature-1-Core"]));
    assert_eq!(env.read_features(), "- [x] Core — #1, #2\n- [ ] Docs — #3\n");
}

#[test]
fn test_features_done_closes_tickets() {
    let env = TestEnv::with_sample();
    env.write_features("- [ ] Core — #1, #2\n- [ ] Docs — #3\n");

    let result = env.json(&["features", "--done", "feature-2-Docs"]);
    assert_eq!(result["completed"], "feature-2-Docs");
    assert_eq!(result["ticketsMarkedDone"], serde_json::json!(["ticket-3"]));
    assert!(env.read_tickets().contains("- [x] #3 Write guide"));
    assert_eq!(env.read_features(), "- [ ] Core — #1, #2\n- [x] Docs — #3\n");
}

#[test]
fn test_features_without_document() {
    let env = TestEnv::with_sample();
    let result = env.json(&["features"]);
    assert_eq!(result["features"], serde_json::json!([]));
}

// === export ===

#[test]
fn test_export_to_stdout_and_file() {
    let env = TestEnv::with_sample();
    env.tb()
        .args(["-H", "export"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# Project tickets"))
        .stdout(predicate::str::contains("## #3 — Write guide"));

    let out = env.path().join("share/tickets-export.md");
    let result = env.json(&["export", "-o", out.to_str().unwrap()]);
    assert_eq!(result["count"], 3);
    let exported = fs::read_to_string(&out).unwrap();
    assert!(exported.contains("**Status:** Done"));
}

// === archive ===

#[test]
fn test_archive_moves_document_to_legacy() {
    let env = TestEnv::with_sample();
    let result = env.json(&["archive"]);

    let archived = result["archived_to"].as_str().unwrap();
    assert!(archived.contains("/legacy/tickets-"));
    assert_eq!(fs::read_to_string(archived).unwrap(), SAMPLE_TICKETS);

    assert_eq!(env.json(&["list"])["count"], 0);
    assert!(env.read_tickets().contains("## Prioritized work items (tickets)"));
}

#[test]
fn test_archive_twice_same_day() {
    let env = TestEnv::with_sample();
    let first = env.json(&["archive"]);
    let second = env.json(&["archive"]);
    assert_ne!(first["archived_to"], second["archived_to"]);
    let legacy = env.tickets_path().parent().unwrap().join("legacy");
    assert_eq!(fs::read_dir(legacy).unwrap().count(), 2);
}
