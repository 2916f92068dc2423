//! Adaptive refresh interval for the countdown timer.
//!
//! While the next event is more than an hour away the countdown only shows
//! whole hours, so the timer can sleep in larger steps. From the one hour
//! mark on it ticks every minute.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::CalendarEvent;

/// Delay before the countdown is recomputed, in whole seconds.
///
/// Never shorter than [`PollInterval::MIN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u64", try_from = "u64")]
pub struct PollInterval(u64);

impl PollInterval {
    /// One minute, the finest granularity the countdown displays.
    pub const MIN: Self = Self(60);

    /// Creates an interval, clamping anything shorter than a minute.
    pub fn from_secs(secs: u64) -> Self {
        Self(secs.max(Self::MIN.0))
    }

    /// The interval in seconds.
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// The interval as a std duration, for arming timers.
    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for PollInterval {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for PollInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl From<PollInterval> for u64 {
    fn from(interval: PollInterval) -> Self {
        interval.0
    }
}

impl TryFrom<u64> for PollInterval {
    type Error = String;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        if secs < Self::MIN.0 {
            return Err(format!(
                "poll interval must be at least {} seconds, got {}",
                Self::MIN.0,
                secs
            ));
        }
        Ok(Self(secs))
    }
}

/// Computes how long to wait before recomputing the countdown for `event`.
///
/// `hours` is the whole number of hours until the event starts, truncated
/// toward zero. Up to one hour away the timer ticks every minute; beyond
/// that it waits `(hours - 1) * 60` seconds.
pub fn compute_next_poll_interval(event: &CalendarEvent, now: DateTime<Utc>) -> PollInterval {
    let hours = (event.start_utc() - now).num_hours();
    if hours > 1 {
        // hours >= 2 here, so the product is at least a minute
        PollInterval::from_secs((hours as u64 - 1) * 60)
    } else {
        PollInterval::MIN
    }
}
