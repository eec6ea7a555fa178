// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use offsync_core::{Request, SyncEvent, SyncLogEntry, SyncReport};
use serde::Serialize;

/// Longest body preview shown in text output.
const BODY_PREVIEW_WIDTH: usize = 60;

/// Serializable view of a sync log entry.
#[derive(Debug, Serialize)]
pub struct EntryView<'a> {
    pub id: &'a str,
    pub created_at: String,
    pub method: &'static str,
    pub url: &'a str,
    pub attempts: u32,
    pub headers: Vec<(&'a str, &'a str)>,
    pub body: Option<String>,
    pub undo_redo: usize,
}

impl<'a> From<&'a SyncLogEntry> for EntryView<'a> {
    fn from(entry: &'a SyncLogEntry) -> Self {
        let request = entry.request();
        EntryView {
            id: entry.request_id(),
            created_at: entry.created_at().to_rfc3339(),
            method: request.method().as_str(),
            url: request.url(),
            attempts: entry.attempts(),
            headers: request.headers().iter().collect(),
            body: request.has_body().then(|| body_text(request)),
            undo_redo: entry.undo_redo_data().len(),
        }
    }
}

fn body_text(request: &Request) -> String {
    request
        .text()
        .unwrap_or_else(|_| format!("<{} bytes>", request.bytes().len()))
}

/// Truncate to `width` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// One line per entry: `id  created  METHOD url`, with attempts and body when present.
pub fn format_entry(entry: &SyncLogEntry) -> String {
    let request = entry.request();
    let mut line = format!(
        "{}  {}  {} {}",
        entry.request_id(),
        entry.created_at().format("%Y-%m-%d %H:%M:%S"),
        request.method(),
        request.url()
    );
    if entry.attempts() > 0 {
        line.push_str(&format!("  (attempts: {})", entry.attempts()));
    }
    if request.has_body() {
        let body = body_text(request).replace('\n', " ");
        line.push_str(&format!("\n    {}", truncate(&body, BODY_PREVIEW_WIDTH)));
    }
    line
}

pub fn format_request(request: &Request) -> String {
    format!("{} {}", request.method(), request.url())
}

/// Summary line for a finished sync.
pub fn format_report(report: &SyncReport) -> String {
    let mut line = format!(
        "Replayed {}, skipped {}, dropped {}",
        report.replayed, report.skipped, report.dropped
    );
    if report.stopped {
        line.push_str(" (stopped early)");
    }
    line
}

/// Progress line for one replayed entry.
pub fn format_sync_event(event: &SyncEvent) -> String {
    match (&event.response, &event.error) {
        (_, Some(error)) => format!(
            "  failed {} {}: {}",
            event.request_id,
            format_request(&event.request),
            error
        ),
        (Some(response), None) => format!(
            "  sent {} {} -> {}",
            event.request_id,
            format_request(&event.request),
            response.status()
        ),
        (None, None) => format!("  done {} {}", event.request_id, format_request(&event.request)),
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
