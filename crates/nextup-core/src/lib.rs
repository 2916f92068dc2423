//! Core types: time, events, selection, poll intervals, links, menu, formatting

pub mod event;
pub mod format;
pub mod interval;
pub mod links;
pub mod menu;
pub mod select;
pub mod time;
pub mod tracing;

pub use event::{Calendar, CalendarEvent};
pub use format::{DEFAULT_NO_MEETING_TEXT, FormatOptions, StatusFormatter, TimeFormat};
pub use interval::{PollInterval, compute_next_poll_interval};
pub use links::{LinkKind, MeetingLink, find_meeting_link};
pub use menu::{CalendarToggle, EventAction, EventEntry, Menu, MenuAction, MenuEntry};
pub use select::{Selected, select_relevant_event};
pub use time::{EventTime, TimeWindow};
pub use crate::tracing::{LogFormat, TracingConfig, TracingError, init_tracing};
