//! Text shown in the status bar and in menu entries.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use nextup_core::format::countdown_label;
//!
//! let now = Utc.with_ymd_and_hms(2025, 2, 5, 9, 0, 0).unwrap();
//! assert_eq!(countdown_label(now + Duration::minutes(90), now), " in 1 hour");
//! assert_eq!(countdown_label(now + Duration::minutes(5), now), " in 5 min");
//! ```

use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::event::CalendarEvent;

/// Status text used when there is nothing left today.
pub const DEFAULT_NO_MEETING_TEXT: &str = "No upcoming meetings";

/// Clock style for menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    /// `14:05`
    #[default]
    #[serde(rename = "24h")]
    H24,
    /// `2:05 PM`
    #[serde(rename = "12h")]
    H12,
}

impl TimeFormat {
    fn pattern(&self) -> &'static str {
        match self {
            Self::H24 => "%H:%M",
            Self::H12 => "%-I:%M %p",
        }
    }
}

/// Options for [`StatusFormatter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Text shown when no event is selected.
    pub no_meeting_text: String,
    /// Clock style for menu entries.
    pub time_format: TimeFormat,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            no_meeting_text: DEFAULT_NO_MEETING_TEXT.to_string(),
            time_format: TimeFormat::default(),
        }
    }
}

/// Formats status titles and menu lines with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct StatusFormatter {
    options: FormatOptions,
}

impl StatusFormatter {
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// The status bar title: `"<title> in 2 hours (Room 1)"`, or the
    /// no-meeting text when `event` is `None`.
    pub fn status_title(&self, event: Option<&CalendarEvent>, now: DateTime<Utc>) -> String {
        match event {
            Some(event) => {
                let mut title = event.title.clone();
                title.push_str(&countdown_label(event.start_utc(), now));
                if let Some(label) = location_label(event.location.as_deref()) {
                    title.push_str(&label);
                }
                title
            }
            None => self.options.no_meeting_text.clone(),
        }
    }

    /// A menu line for `event`: `"14:00 - Review (Room 1)"` in `tz`.
    pub fn event_line<Tz>(&self, event: &CalendarEvent, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let time = event
            .start_utc()
            .with_timezone(tz)
            .format(self.options.time_format.pattern());
        let location = location_label(event.location.as_deref()).unwrap_or_default();
        format!("{} - {}{}", time, event.title, location)
    }
}

/// Relative time until `start`, built from the whole hour and minute
/// components of the remaining time.
///
/// - at least one hour: `" in 2 hours"`, `" in 1 hour"`
/// - at least one minute: `" in 12 min"`
/// - otherwise, including events already underway: `" now"`
pub fn countdown_label(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = start - now;
    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() % 60;

    if hours > 0 {
        format!(" in {} {}", hours, pluralize(hours, "hour"))
    } else if minutes > 0 {
        format!(" in {} min", minutes)
    } else {
        " now".to_string()
    }
}

/// `" (Room 4)"` for a location of `"Room 4, Building B"`.
///
/// Only the part before the first `", "` is kept. Missing or blank
/// locations produce no label rather than an empty `" ()"`.
pub fn location_label(location: Option<&str>) -> Option<String> {
    let first = location?.split(", ").next()?.trim();
    if first.is_empty() {
        return None;
    }
    Some(format!(" ({})", first))
}

fn pluralize(amount: i64, word: &str) -> String {
    if amount > 1 {
        format!("{}s", word)
    } else {
        word.to_string()
    }
}
