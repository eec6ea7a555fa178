// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::TestContext;
use offsync_core::Method;

#[test]
fn empty_log() {
    let t = TestContext::new();
    assert!(run_impl(&t.ctx).unwrap().is_empty());
}

#[test]
fn entries_in_creation_order() {
    let t = TestContext::new();
    let ids: Vec<String> = (0..5)
        .map(|i| t.queue(Method::Post, &format!("https://h/items/{i}")))
        .collect();

    let entries = run_impl(&t.ctx).unwrap();
    let listed: Vec<String> = entries.iter().map(|e| e.request_id().to_string()).collect();
    assert_eq!(listed, ids);
}

#[test]
fn json_view_carries_request_fields() {
    let t = TestContext::new();
    let id = t.queue(Method::Delete, "https://h/items/1");

    let entries = run_impl(&t.ctx).unwrap();
    let view = serde_json::to_value(EntryView::from(&entries[0])).unwrap();

    assert_eq!(view["id"], id.as_str());
    assert_eq!(view["method"], "DELETE");
    assert_eq!(view["url"], "https://h/items/1");
    assert_eq!(view["attempts"], 0);
    assert!(view["body"].is_null());
}

#[test]
fn text_line_names_method_and_url() {
    let t = TestContext::new();
    let id = t.queue(Method::Put, "https://h/items/2");

    let line = format_entry(&run_impl(&t.ctx).unwrap()[0]);
    assert!(line.starts_with(&id));
    assert!(line.ends_with("PUT https://h/items/2"));
}
