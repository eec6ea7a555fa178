// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn offsync() -> Command {
    let mut cmd = cargo_bin_cmd!("offsync");
    cmd.env_remove("OFFSYNC_LOG");
    cmd
}

/// Helper to create an initialized temp directory
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    offsync()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Helper to queue a request and return its id
pub fn queue(temp: &TempDir, method: &str, url: &str) -> String {
    let output = offsync()
        .args(["queue", method, url])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    String::from_utf8_lossy(&output.stdout)
        .trim()
        .strip_prefix("Queued ")
        .unwrap()
        .to_string()
}

/// Ids listed by `offsync log -o json`, in order
pub fn log_ids(temp: &TempDir) -> Vec<String> {
    let output = offsync()
        .args(["log", "-o", "json"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap().to_string())
        .collect()
}
