//! Command implementations.

pub mod calendars;
pub mod config;
pub mod open;
pub mod status;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use nextup_core::{CalendarEvent, Menu, MenuAction, StatusFormatter, select_relevant_event};
use nextup_server::{DayBoundary, EventSource, JsonFileSource, Preferences, today_events};
use tracing::debug;

use crate::actions;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Everything a command needs: configuration, the calendar source and the
/// stored calendar selection.
pub struct Context {
    config: ClientConfig,
    source: Arc<dyn EventSource>,
    events_file: Option<PathBuf>,
    preferences: Preferences,
    boundary: DayBoundary,
}

impl Context {
    /// Reads events from the configured JSON file and loads preferences.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let events_file = config.events_file();
        let preferences = Preferences::load(config.preferences_file())?;
        debug!(events = %events_file.display(), "using event file");
        Ok(Self {
            source: Arc::new(JsonFileSource::new(&events_file)),
            events_file: Some(events_file),
            config,
            preferences,
            boundary: DayBoundary::Local,
        })
    }

    /// Uses an explicit source.
    pub fn with_source(
        config: ClientConfig,
        source: Arc<dyn EventSource>,
        preferences: Preferences,
    ) -> Self {
        Self {
            config,
            source,
            events_file: None,
            preferences,
            boundary: DayBoundary::Local,
        }
    }

    /// Builder: set where the day ends.
    pub fn with_day_boundary(mut self, boundary: DayBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn source(&self) -> Arc<dyn EventSource> {
        self.source.clone()
    }

    /// The JSON file events are read from, when the source is a file.
    pub fn events_file(&self) -> Option<&PathBuf> {
        self.events_file.as_ref()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn boundary(&self) -> DayBoundary {
        self.boundary
    }

    pub fn formatter(&self) -> StatusFormatter {
        StatusFormatter::new(self.config.display.format_options())
    }

    /// Calendars currently watched.
    pub fn selected_calendars(&self) -> ClientResult<Vec<String>> {
        let calendars = self.source.calendars()?;
        let default_id = self.source.default_calendar_id()?;
        Ok(self.preferences.resolve(&calendars, default_id.as_deref()))
    }

    /// Calendars to watch for a long-running session. The selection is
    /// written to the preferences file the first time.
    pub fn watched_calendars(&mut self) -> ClientResult<Vec<String>> {
        let calendars = self.source.calendars()?;
        let default_id = self.source.default_calendar_id()?;
        Ok(self
            .preferences
            .resolve_and_store(&calendars, default_id.as_deref())?)
    }

    /// The rest of today's events of the watched calendars.
    pub fn today(&self, now: DateTime<Utc>) -> ClientResult<Vec<CalendarEvent>> {
        let calendars = self.selected_calendars()?;
        Ok(today_events(
            self.source.as_ref(),
            &calendars,
            self.boundary,
            now,
        )?)
    }

    /// Builds the menu for `events`.
    pub fn menu(&self, events: &[CalendarEvent], now: DateTime<Utc>) -> ClientResult<Menu> {
        let calendars = self.source.calendars()?;
        let selected = self.selected_calendars()?;
        let selection = select_relevant_event(events, now);
        let formatter = self.formatter();
        let menu = match self.boundary {
            DayBoundary::Local => Menu::build(
                events,
                selection.as_ref(),
                &calendars,
                &selected,
                &formatter,
                &chrono::Local,
            ),
            DayBoundary::Fixed(offset) => Menu::build(
                events,
                selection.as_ref(),
                &calendars,
                &selected,
                &formatter,
                &offset,
            ),
        };
        Ok(menu)
    }

    /// Performs a menu action.
    pub fn activate(&mut self, action: &MenuAction) -> ClientResult<()> {
        match action {
            MenuAction::ToggleCalendar(id) => {
                calendars::toggle_calendar(self, id)?;
            }
            MenuAction::Quit => {}
            other => {
                actions::open_action(other, &self.config.display)?;
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn default_calendar_is_watched_first() {
        let (_dir, ctx) = context();
        assert_eq!(ctx.selected_calendars().unwrap(), vec!["work"]);

        let titles: Vec<_> = ctx
            .today(at(9, 0))
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Standup", "Review"]);
    }

    #[test]
    fn watching_stores_the_default_selection() {
        let (dir, mut ctx) = context();
        assert!(ctx.preferences().stored_selection().is_none());

        assert_eq!(ctx.watched_calendars().unwrap(), vec!["work"]);
        let stored = Preferences::load(dir.path().join("preferences.toml")).unwrap();
        assert_eq!(stored.stored_selection(), Some(&["work".to_string()][..]));
    }

    #[test]
    fn activating_a_toggle_changes_selection() {
        let (_dir, mut ctx) = context();
        ctx.activate(&MenuAction::ToggleCalendar("home".to_string()))
            .unwrap();
        assert_eq!(ctx.selected_calendars().unwrap(), vec!["work", "home"]);
        assert_eq!(ctx.today(at(9, 0)).unwrap().len(), 3);
    }

    #[test]
    fn from_config_reads_the_events_file() {
        let dir = tempfile::tempdir().unwrap();
        let events = dir.path().join("events.json");
        std::fs::write(&events, serde_json::to_string(&event_file()).unwrap()).unwrap();

        let mut config = ClientConfig::default();
        config.source.events_file = Some(events.clone());
        config.source.preferences_file = Some(dir.path().join("preferences.toml"));

        let ctx = Context::from_config(config).unwrap();
        assert_eq!(ctx.events_file(), Some(&events));
        assert_eq!(ctx.selected_calendars().unwrap(), vec!["work"]);
    }
}
