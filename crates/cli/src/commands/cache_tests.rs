// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::{refused, TestContext};
use crate::error::Error;
use offsync_core::Response;

#[test]
fn add_then_list() {
    let t = TestContext::new();
    t.network.reply(Ok(Response::new(200, "<html>")));

    add(&t.ctx, "pages", "https://h/index.html").unwrap();

    let requests = list(&t.ctx, "pages").unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url(), "https://h/index.html");
    assert!(list(&t.ctx, "other").unwrap().is_empty());
}

#[test]
fn add_rejects_error_status() {
    let t = TestContext::new();
    t.network.reply(Ok(Response::new(404, "")));

    assert!(matches!(
        add(&t.ctx, "pages", "https://h/missing"),
        Err(Error::Core(_))
    ));
    assert!(list(&t.ctx, "pages").unwrap().is_empty());
}

#[test]
fn add_propagates_network_errors() {
    let t = TestContext::new();
    t.network.reply(refused());

    assert!(add(&t.ctx, "pages", "https://h/x").is_err());
}

#[test]
fn clear_reports_removed_count() {
    let t = TestContext::new();
    add(&t.ctx, "pages", "https://h/a").unwrap();
    add(&t.ctx, "pages", "https://h/b").unwrap();

    assert_eq!(clear(&t.ctx, "pages").unwrap(), 2);
    assert!(list(&t.ctx, "pages").unwrap().is_empty());
    assert_eq!(clear(&t.ctx, "pages").unwrap(), 0);
}
