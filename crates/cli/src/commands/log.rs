// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use offsync_core::SyncLogEntry;

use crate::cli::OutputFormat;
use crate::display::{format_entry, EntryView};
use crate::error::Result;

use super::{open_context, Context};

pub fn run(output: OutputFormat) -> Result<()> {
    let ctx = open_context()?;
    let entries = run_impl(&ctx)?;

    match output {
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("Sync log is empty");
            } else {
                for entry in &entries {
                    println!("{}", format_entry(entry));
                }
            }
        }
        OutputFormat::Json => {
            let views: Vec<EntryView> = entries.iter().map(EntryView::from).collect();
            println!("{}", serde_json::to_string_pretty(&views)?);
        }
    }
    Ok(())
}

pub(crate) fn run_impl(ctx: &Context) -> Result<Vec<SyncLogEntry>> {
    Ok(ctx.sync_manager()?.get_sync_log()?)
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
