// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use offsync_core::{MatchOptions, Request};
use tracing::warn;

use crate::cli::{CacheCommand, OutputFormat};
use crate::display::format_request;
use crate::error::Result;

use super::{block_on, open_context, Context};

/// Execute a cache subcommand.
pub fn run(cmd: CacheCommand) -> Result<()> {
    let ctx = open_context()?;
    match cmd {
        CacheCommand::List { name, output } => {
            let requests = list(&ctx, &name)?;
            match output {
                OutputFormat::Text => {
                    if requests.is_empty() {
                        println!("Cache '{}' is empty", name);
                    }
                    for request in &requests {
                        println!("{}", format_request(request));
                    }
                }
                OutputFormat::Json => {
                    let urls: Vec<serde_json::Value> = requests
                        .iter()
                        .map(|r| serde_json::json!({ "method": r.method(), "url": r.url() }))
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&urls)?);
                }
            }
        }
        CacheCommand::Add { url, name } => {
            add(&ctx, &name, &url)?;
            println!("Cached {}", url);
        }
        CacheCommand::Clear { name } => {
            let removed = clear(&ctx, &name)?;
            println!("Cleared {} entries from cache '{}'", removed, name);
        }
    }
    Ok(())
}

pub(crate) fn list(ctx: &Context, name: &str) -> Result<Vec<Request>> {
    Ok(ctx.cache(name)?.keys(None, MatchOptions::default())?)
}

/// Fetches `url` and stores the response; non-2xx responses are errors.
pub(crate) fn add(ctx: &Context, name: &str, url: &str) -> Result<()> {
    let cache = ctx.cache(name)?;
    let request = Request::get(url)?;
    block_on(cache.add(request))??;
    Ok(())
}

/// Empties the cache, returning how many entries it held.
pub(crate) fn clear(ctx: &Context, name: &str) -> Result<usize> {
    let cache = ctx.cache(name)?;
    let count = cache.keys(None, MatchOptions::default())?.len();
    if !cache.clear()? {
        warn!(cache = %name, "some cache entries were not removed");
    }
    Ok(count)
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
