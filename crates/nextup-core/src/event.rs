//! Calendar event types.
//!
//! [`CalendarEvent`] is the read-only snapshot handed to the selector by the
//! calendar source. It is never mutated after being fetched.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::links::{MeetingLink, find_meeting_link};
use crate::time::EventTime;

/// A calendar the user can watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    /// Stable identifier, used in the selection preference.
    pub id: String,
    /// Display name.
    pub title: String,
}

impl Calendar {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// A calendar event as fetched from a calendar source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// The event title.
    pub title: String,
    /// When the event starts.
    pub start: EventTime,
    /// When the event ends.
    pub end: EventTime,
    /// Free-form location, e.g. `"Room 4, Building B, HQ"`.
    #[serde(default)]
    pub location: Option<String>,
    /// Free-form notes; meeting links are looked up here.
    #[serde(default)]
    pub notes: Option<String>,
    /// The calendar this event belongs to.
    #[serde(default)]
    pub calendar_id: String,
}

impl CalendarEvent {
    /// Creates a new event with required fields.
    pub fn new(title: impl Into<String>, start: EventTime, end: EventTime) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            location: None,
            notes: None,
            calendar_id: String::new(),
        }
    }

    /// Returns true if this is an all-day event.
    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    /// Start instant in UTC.
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.instant()
    }

    /// End instant in UTC.
    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.instant()
    }

    /// Event length. Negative when the source reports an end before the start.
    pub fn duration(&self) -> Duration {
        self.end_utc() - self.start_utc()
    }

    /// Returns the duration of the event in whole minutes, truncated.
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// The first Google Meet / Hangouts link in the notes, if any.
    pub fn meeting_link(&self) -> Option<MeetingLink> {
        self.notes.as_deref().and_then(find_meeting_link)
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Builder method to set the calendar.
    pub fn with_calendar(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }
}
