// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `undo` and `redo`: replay the local store changes recorded with an entry.

use crate::error::Result;

use super::{open_context, Context};

/// Which direction to apply the recorded changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Undo,
    Redo,
}

/// What happened to the entry.
#[derive(Debug, PartialEq, Eq)]
pub enum Applied {
    NotFound,
    /// The entry records no local changes.
    Nothing,
    Done,
}

pub fn run(id: String, direction: Direction) -> Result<()> {
    let ctx = open_context()?;
    let verb = match direction {
        Direction::Undo => "undo",
        Direction::Redo => "redo",
    };
    match run_impl(&ctx, &id, direction)? {
        Applied::NotFound => println!("not found: {}", id),
        Applied::Nothing => println!("Nothing to {} for {}", verb, id),
        Applied::Done => println!("Applied {} for {}", verb, id),
    }
    Ok(())
}

pub(crate) fn run_impl(ctx: &Context, id: &str, direction: Direction) -> Result<Applied> {
    let Some(entry) = ctx.sync_manager()?.get_request(id)? else {
        return Ok(Applied::NotFound);
    };
    let applied = match direction {
        Direction::Undo => entry.undo()?,
        Direction::Redo => entry.redo()?,
    };
    Ok(if applied {
        Applied::Done
    } else {
        Applied::Nothing
    })
}

#[cfg(test)]
#[path = "undo_tests.rs"]
mod tests;
