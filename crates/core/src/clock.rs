// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Hybrid logical clock stamps for sync log ordering.
//!
//! Every queued request is identified by a [`Stamp`]: wall clock milliseconds
//! plus a logical counter. Stamps are unique per log and sort in creation
//! order, even when several requests are queued within the same millisecond
//! or the wall clock steps backwards.
//!
//! Format: `{wall_ms}-{counter}`

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// A creation stamp for a sync log entry.
///
/// Ordering: higher `wall_ms` wins, then higher `counter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Stamp {
    /// Wall clock time in milliseconds since Unix epoch.
    pub wall_ms: u64,
    /// Logical counter for stamps issued at the same wall time.
    pub counter: u32,
}

impl Stamp {
    pub fn new(wall_ms: u64, counter: u32) -> Self {
        Stamp { wall_ms, counter }
    }

    /// The wall time of this stamp as a UTC timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        let millis = i64::try_from(self.wall_ms).unwrap_or(i64::MAX);
        Utc.timestamp_millis_opt(millis).single().unwrap_or_default()
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wall_ms, self.counter)
    }
}

impl FromStr for Stamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (wall, counter) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidRequestId(s.to_string()))?;

        let wall_ms = wall
            .parse::<u64>()
            .map_err(|_| Error::InvalidRequestId(s.to_string()))?;
        let counter = counter
            .parse::<u32>()
            .map_err(|_| Error::InvalidRequestId(s.to_string()))?;

        Ok(Stamp::new(wall_ms, counter))
    }
}

/// Trait for getting the current wall clock time.
///
/// This allows injecting a mock clock for testing.
pub trait ClockSource: Send + Sync {
    /// Returns the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using `std::time::SystemTime`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}

/// Issues monotonically increasing stamps for the sync log.
pub struct LogClock {
    clock: Box<dyn ClockSource>,
    last: Mutex<Stamp>,
}

impl LogClock {
    /// Creates a clock reading the system time.
    pub fn system() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates a clock over a custom time source.
    pub fn with_clock(clock: impl ClockSource + 'static) -> Self {
        LogClock {
            clock: Box::new(clock),
            last: Mutex::new(Stamp::new(0, 0)),
        }
    }

    /// Issues a new stamp strictly greater than every stamp issued or observed so far.
    pub fn now(&self) -> Stamp {
        let physical = self.clock.now_ms();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        let next = if physical > last.wall_ms {
            Stamp::new(physical, 0)
        } else {
            // Clock stalled or went backwards
            Stamp::new(last.wall_ms, last.counter.saturating_add(1))
        };

        *last = next;
        next
    }

    /// Records a stamp loaded from durable storage so later stamps sort after it.
    pub fn observe(&self, stamp: Stamp) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if stamp > *last {
            *last = stamp;
        }
    }
}

impl Default for LogClock {
    fn default() -> Self {
        Self::system()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
