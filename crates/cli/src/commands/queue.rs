// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use offsync_core::http::{CONTENT_TYPE, JSON_CONTENT_TYPE};
use offsync_core::{Headers, InsertOptions, Method, Request};

use crate::cli::OutputFormat;
use crate::error::Result;

use super::{open_context, Context};

pub fn run(
    method: String,
    url: String,
    headers: Vec<String>,
    data: Option<String>,
    output: OutputFormat,
) -> Result<()> {
    let ctx = open_context()?;
    let request = build_request(&method, &url, &headers, data)?;
    let id = run_impl(&ctx, request)?;

    match output {
        OutputFormat::Text => println!("Queued {}", id),
        OutputFormat::Json => println!("{}", serde_json::json!({ "id": id })),
    }
    Ok(())
}

pub(crate) fn run_impl(ctx: &Context, request: Request) -> Result<String> {
    Ok(ctx
        .sync_manager()?
        .insert_request(request, InsertOptions::default())?)
}

/// Builds a request from command line parts.
///
/// A body that parses as JSON gets a JSON content type unless one is given.
pub(crate) fn build_request(
    method: &str,
    url: &str,
    headers: &[String],
    data: Option<String>,
) -> Result<Request> {
    let method: Method = method.parse()?;
    let mut parsed = Headers::new();
    for line in headers {
        let (name, value) = Headers::parse_line(line)?;
        parsed.append(name, value);
    }

    if let Some(body) = &data {
        if !parsed.contains(CONTENT_TYPE)
            && serde_json::from_str::<serde_json::Value>(body).is_ok()
        {
            parsed.set(CONTENT_TYPE, JSON_CONTENT_TYPE);
        }
    }

    let mut request = Request::new(method, url)?.with_headers(parsed);
    if let Some(body) = data {
        request = request.with_body(body);
    }
    Ok(request)
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
