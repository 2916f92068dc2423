//! Menu model behind the status item.
//!
//! Every entry kind is its own variant with a typed payload, so the shell
//! that renders the menu never has to inspect loosely typed tags to find
//! out what an entry is or what clicking it does.

use std::fmt::Display;
use std::fmt::Write as _;

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::event::{Calendar, CalendarEvent};
use crate::format::StatusFormatter;
use crate::links::MeetingLink;
use crate::select::Selected;

/// Title of the section listing today's events.
pub const EVENTS_HEADER: &str = "Next Up";
/// Title of the join action.
pub const JOIN_TITLE: &str = "Join via Google Meet...";
/// Keyboard shortcut of the join action.
pub const JOIN_KEY: char = 'j';

/// What happens when an event entry is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "link", rename_all = "snake_case")]
pub enum EventAction {
    /// Open the event's meeting link.
    Join(MeetingLink),
    /// The event has no link; open the calendar web view instead.
    OpenCalendar,
}

/// One of today's events as listed in the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    /// Index of the event in the list the menu was built from.
    pub index: usize,
    /// `"14:00 - Review (Room 1)"`.
    pub label: String,
    /// Click action.
    pub action: EventAction,
    /// Whether this is the event shown in the status bar.
    pub is_selected: bool,
}

/// A calendar in the calendars submenu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarToggle {
    pub id: String,
    pub title: String,
    /// Checked state.
    pub selected: bool,
}

impl CalendarToggle {
    /// Clicking a calendar flips its checked state.
    pub fn action(&self) -> MenuAction {
        MenuAction::ToggleCalendar(self.id.clone())
    }
}

/// A single menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuEntry {
    /// Join the selected event's call. Disabled when `link` is `None`.
    Join { link: Option<MeetingLink> },
    Separator,
    Header { title: String },
    Event(EventEntry),
    Calendars { calendars: Vec<CalendarToggle> },
    About,
    Quit,
}

/// Action produced by activating an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    OpenLink(String),
    OpenCalendar,
    ToggleCalendar(String),
    About,
    Quit,
}

impl MenuEntry {
    /// Returns true if the entry can be activated.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Join { link } => link.is_some(),
            Self::Separator | Self::Header { .. } | Self::Calendars { .. } => false,
            Self::Event(_) | Self::About | Self::Quit => true,
        }
    }

    /// The action for activating this entry, if it is enabled.
    pub fn action(&self) -> Option<MenuAction> {
        match self {
            Self::Join { link } => link.as_ref().map(|l| MenuAction::OpenLink(l.url.clone())),
            Self::Event(entry) => Some(match &entry.action {
                EventAction::Join(link) => MenuAction::OpenLink(link.url.clone()),
                EventAction::OpenCalendar => MenuAction::OpenCalendar,
            }),
            Self::About => Some(MenuAction::About),
            Self::Quit => Some(MenuAction::Quit),
            Self::Separator | Self::Header { .. } | Self::Calendars { .. } => None,
        }
    }
}

/// The full status item menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub entries: Vec<MenuEntry>,
}

impl Menu {
    /// Builds the menu for the current state.
    ///
    /// All-day events are left out of the event list. `selected_ids` marks
    /// which calendars are checked.
    pub fn build<Tz>(
        events: &[CalendarEvent],
        selection: Option<&Selected<'_>>,
        calendars: &[Calendar],
        selected_ids: &[String],
        formatter: &StatusFormatter,
        tz: &Tz,
    ) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut entries = vec![
            MenuEntry::Join {
                link: selection.and_then(|s| s.event.meeting_link()),
            },
            MenuEntry::Separator,
            MenuEntry::Header {
                title: EVENTS_HEADER.to_string(),
            },
        ];

        entries.extend(
            events
                .iter()
                .enumerate()
                .filter(|(_, event)| !event.is_all_day())
                .map(|(index, event)| {
                    MenuEntry::Event(EventEntry {
                        index,
                        label: formatter.event_line(event, tz),
                        action: event
                            .meeting_link()
                            .map_or(EventAction::OpenCalendar, EventAction::Join),
                        is_selected: selection.is_some_and(|s| s.index == index),
                    })
                }),
        );

        entries.push(MenuEntry::Separator);
        entries.push(MenuEntry::Calendars {
            calendars: calendars
                .iter()
                .map(|calendar| CalendarToggle {
                    id: calendar.id.clone(),
                    title: calendar.title.clone(),
                    selected: selected_ids.contains(&calendar.id),
                })
                .collect(),
        });
        entries.push(MenuEntry::Separator);
        entries.push(MenuEntry::About);
        entries.push(MenuEntry::Quit);

        Self { entries }
    }

    /// The event entries, in menu order.
    pub fn event_entries(&self) -> impl Iterator<Item = &EventEntry> {
        self.entries.iter().filter_map(|entry| match entry {
            MenuEntry::Event(e) => Some(e),
            _ => None,
        })
    }

    /// The link behind the join entry, when it is enabled.
    pub fn join_link(&self) -> Option<&MeetingLink> {
        self.entries.iter().find_map(|entry| match entry {
            MenuEntry::Join { link } => link.as_ref(),
            _ => None,
        })
    }

    /// Plain text rendering for terminals and logs.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            // writing to a String cannot fail
            let _ = match entry {
                MenuEntry::Join { link } => match link {
                    Some(_) => writeln!(out, "{} [{}]", JOIN_TITLE, JOIN_KEY),
                    None => writeln!(out, "{} (unavailable)", JOIN_TITLE),
                },
                MenuEntry::Separator => writeln!(out, "---"),
                MenuEntry::Header { title } => writeln!(out, "{}", title),
                MenuEntry::Event(e) => {
                    let marker = if e.is_selected { ">" } else { " " };
                    writeln!(out, "{} {}", marker, e.label)
                }
                MenuEntry::Calendars { calendars } => {
                    let _ = writeln!(out, "Calendars");
                    calendars.iter().try_for_each(|c| {
                        let mark = if c.selected { "x" } else { " " };
                        writeln!(out, "  [{}] {}", mark, c.title)
                    })
                }
                MenuEntry::About => writeln!(out, "About {}", EVENTS_HEADER),
                MenuEntry::Quit => writeln!(out, "Quit"),
            };
        }
        out
    }
}
