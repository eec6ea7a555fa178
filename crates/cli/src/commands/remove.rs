// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use offsync_core::SyncLogEntry;

use crate::display::format_request;
use crate::error::Result;

use super::{open_context, Context};

pub fn run(id: String) -> Result<()> {
    let ctx = open_context()?;
    match run_impl(&ctx, &id)? {
        Some(entry) => println!("Removed {} ({})", id, format_request(entry.request())),
        None => println!("not found: {}", id),
    }
    Ok(())
}

pub(crate) fn run_impl(ctx: &Context, id: &str) -> Result<Option<SyncLogEntry>> {
    Ok(ctx.sync_manager()?.remove_request(id)?)
}

#[cfg(test)]
#[path = "remove_tests.rs"]
mod tests;
