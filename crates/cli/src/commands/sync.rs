// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use offsync_core::{
    sync_listener, PreflightMode, SyncAction, SyncEventType, SyncOptions, SyncReport,
};

use crate::cli::OutputFormat;
use crate::display::{format_report, format_sync_event};
use crate::error::Result;

use super::{block_on, open_context, Context};

pub fn run(
    no_preflight: bool,
    preflight_timeout_ms: Option<u64>,
    output: OutputFormat,
) -> Result<()> {
    let ctx = open_context()?;
    let options = sync_options(&ctx, no_preflight, preflight_timeout_ms)?;
    let report = run_impl(&ctx, options, output == OutputFormat::Text)?;

    match output {
        OutputFormat::Text => println!("{}", format_report(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Configured options with command line overrides applied.
pub(crate) fn sync_options(
    ctx: &Context,
    no_preflight: bool,
    preflight_timeout_ms: Option<u64>,
) -> Result<SyncOptions> {
    let mut options = ctx.config.sync.options()?;
    if no_preflight {
        options.preflight = PreflightMode::Disabled;
    }
    if let Some(timeout) = preflight_timeout_ms {
        options.preflight_timeout_ms = timeout;
    }
    Ok(options)
}

/// Replays the log. With `progress`, prints a line per finished entry.
pub(crate) fn run_impl(ctx: &Context, options: SyncOptions, progress: bool) -> Result<SyncReport> {
    let manager = ctx.sync_manager()?;

    if progress {
        manager.add_event_listener(
            SyncEventType::AfterSyncRequest,
            None,
            sync_listener(|event| async move {
                println!("{}", format_sync_event(&event));
                Ok(SyncAction::Continue)
            }),
        );
    }

    Ok(block_on(manager.sync(options))??)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
