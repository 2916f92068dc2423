//! Calendar sources.
//!
//! A source lists the available calendars and returns the events of a set of
//! calendars that overlap a time window, sorted by start time. The selector
//! relies on that ordering.

use std::path::{Path, PathBuf};

use nextup_core::{Calendar, CalendarEvent, TimeWindow};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ServerError, ServerResult};

/// Access to calendars and their events.
pub trait EventSource: Send + Sync {
    /// All calendars the user could select.
    fn calendars(&self) -> ServerResult<Vec<Calendar>>;

    /// The calendar new events go to, used when nothing has been selected yet.
    fn default_calendar_id(&self) -> ServerResult<Option<String>>;

    /// Events of `calendar_ids` overlapping `window`, ascending by start.
    ///
    /// An empty `calendar_ids` yields no events.
    fn events(
        &self,
        calendar_ids: &[String],
        window: &TimeWindow,
    ) -> ServerResult<Vec<CalendarEvent>>;
}

/// On-disk layout read by [`JsonFileSource`].
///
/// ```json
/// {
///   "default_calendar": "work",
///   "calendars": [{ "id": "work", "title": "Work" }],
///   "events": [{
///     "title": "Standup",
///     "calendar_id": "work",
///     "start": { "type": "timed", "value": "2025-02-05T10:00:00Z" },
///     "end": { "type": "timed", "value": "2025-02-05T10:15:00Z" }
///   }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFile {
    pub default_calendar: Option<String>,
    pub calendars: Vec<Calendar>,
    pub events: Vec<CalendarEvent>,
}

impl EventFile {
    fn calendars(&self) -> Vec<Calendar> {
        self.calendars.clone()
    }

    fn default_calendar_id(&self) -> Option<String> {
        self.default_calendar.clone()
    }

    fn events(&self, calendar_ids: &[String], window: &TimeWindow) -> Vec<CalendarEvent> {
        events_in_window(self.events.iter(), calendar_ids, window)
    }
}

/// Keeps events of `calendar_ids` overlapping `window`, sorted by start.
///
/// The sort is stable, so events sharing a start time keep their order.
pub fn events_in_window<'a>(
    events: impl IntoIterator<Item = &'a CalendarEvent>,
    calendar_ids: &[String],
    window: &TimeWindow,
) -> Vec<CalendarEvent> {
    if calendar_ids.is_empty() {
        return Vec::new();
    }

    let mut selected: Vec<CalendarEvent> = events
        .into_iter()
        .filter(|event| calendar_ids.contains(&event.calendar_id))
        .filter(|event| window.overlaps_event(&event.start, &event.end))
        .cloned()
        .collect();
    selected.sort_by_key(|event| event.start);

    trace!(count = selected.len(), "events in window");
    selected
}

/// Reads calendars and events from a JSON file.
///
/// The file is read again on every call so edits show up on the next
/// refresh.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> ServerResult<EventFile> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| ServerError::io(&self.path, e))?;
        let file: EventFile =
            serde_json::from_str(&content).map_err(|e| ServerError::event_file(&self.path, e))?;
        debug!(
            path = %self.path.display(),
            calendars = file.calendars.len(),
            events = file.events.len(),
            "read event file"
        );
        Ok(file)
    }
}

impl EventSource for JsonFileSource {
    fn calendars(&self) -> ServerResult<Vec<Calendar>> {
        Ok(self.read()?.calendars())
    }

    fn default_calendar_id(&self) -> ServerResult<Option<String>> {
        Ok(self.read()?.default_calendar_id())
    }

    fn events(
        &self,
        calendar_ids: &[String],
        window: &TimeWindow,
    ) -> ServerResult<Vec<CalendarEvent>> {
        if calendar_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.read()?.events(calendar_ids, window))
    }
}

/// An in-memory source.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    file: EventFile,
}

impl StaticSource {
    pub fn new(file: EventFile) -> Self {
        Self { file }
    }
}

impl EventSource for StaticSource {
    fn calendars(&self) -> ServerResult<Vec<Calendar>> {
        Ok(self.file.calendars())
    }

    fn default_calendar_id(&self) -> ServerResult<Option<String>> {
        Ok(self.file.default_calendar_id())
    }

    fn events(
        &self,
        calendar_ids: &[String],
        window: &TimeWindow,
    ) -> ServerResult<Vec<CalendarEvent>> {
        Ok(self.file.events(calendar_ids, window))
    }
}
