// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;

// Port 9 (discard) on loopback refuses connections on test machines.
const UNREACHABLE: &str = "http://127.0.0.1:9/items";

#[test]
fn empty_log_syncs_cleanly() {
    let temp = init_temp();

    offsync()
        .arg("sync")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Replayed 0, skipped 0, dropped 0"));
}

#[test]
fn json_report() {
    let temp = init_temp();

    let output = offsync()
        .args(["sync", "-o", "json"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["replayed"], 0);
    assert_eq!(report["stopped"], false);
}

#[test]
fn unreachable_preflight_fails_and_keeps_entries() {
    let temp = init_temp();
    let id = queue(&temp, "POST", UNREACHABLE);

    offsync()
        .args(["sync", "--preflight-timeout-ms", "2000"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("preflight"));

    assert_eq!(log_ids(&temp), vec![id]);
}

#[test]
fn unreachable_replay_fails_and_counts_attempt() {
    let temp = init_temp();
    let id = queue(&temp, "POST", UNREACHABLE);

    offsync()
        .args(["sync", "--no-preflight"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains(format!("replay of request {}", id)));

    let output = offsync()
        .args(["log", "-o", "json"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries[0]["id"], id.as_str());
    assert_eq!(entries[0]["attempts"], 1);
}

#[test]
fn cache_list_and_clear_on_empty_cache() {
    let temp = init_temp();

    offsync()
        .args(["cache", "list"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("is empty"));

    offsync()
        .args(["cache", "clear"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 0 entries"));
}

#[test]
fn cache_add_unreachable_fails() {
    let temp = init_temp();

    offsync()
        .args(["cache", "add", UNREACHABLE])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("network error"));
}
