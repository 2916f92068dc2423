//! Re-evaluation of the selected event on every timer tick.
//!
//! [`RefreshState`] holds what the status item currently shows and which
//! interval the timer is armed with. Each call returns a [`RefreshOutcome`]
//! telling the driver what to display and what to do with the timer.

use chrono::{DateTime, Utc};
use nextup_core::{
    CalendarEvent, PollInterval, StatusFormatter, compute_next_poll_interval,
    select_relevant_event,
};
use tracing::debug;

/// What the driver must do with its timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    /// Replace any pending timer with one repeating at this interval.
    Arm(PollInterval),
    /// Leave the pending timer as it is.
    Keep,
    /// Cancel the pending timer; nothing needs refreshing.
    Cancel,
}

/// How much of the displayed state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A different event (or none) is selected; the menu must be rebuilt.
    Switched,
    /// Same event; only the countdown text moved on.
    Refreshed,
}

/// Result of a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub change: Change,
    /// Status bar title.
    pub status: String,
    pub timer: TimerCommand,
    /// Index of the selected event in the list that was evaluated.
    pub selected_index: Option<usize>,
}

/// State carried between ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshState {
    tracked_title: Option<String>,
    scheduled: Option<PollInterval>,
}

impl RefreshState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title of the event currently shown, if any.
    pub fn tracked_title(&self) -> Option<&str> {
        self.tracked_title.as_deref()
    }

    /// Interval the timer is armed with, if a timer is pending.
    pub fn scheduled(&self) -> Option<PollInterval> {
        self.scheduled
    }

    /// Full switch: select from scratch and always re-arm or cancel.
    ///
    /// Used on startup, when the calendar data changes and when the selected
    /// calendars change.
    pub fn switch_to(
        &mut self,
        events: &[CalendarEvent],
        now: DateTime<Utc>,
        formatter: &StatusFormatter,
    ) -> RefreshOutcome {
        let selection = select_relevant_event(events, now);
        let status = formatter.status_title(selection.map(|s| s.event), now);

        let Some(selected) = selection else {
            debug!("no relevant event, cancelling timer");
            self.tracked_title = None;
            self.scheduled = None;
            return RefreshOutcome {
                change: Change::Switched,
                status,
                timer: TimerCommand::Cancel,
                selected_index: None,
            };
        };

        let interval = compute_next_poll_interval(selected.event, now);
        debug!(
            title = %selected.event.title,
            advanced = selected.advanced,
            interval_secs = interval.as_secs(),
            "switched to event"
        );
        self.tracked_title = Some(selected.event.title.clone());
        self.scheduled = Some(interval);

        RefreshOutcome {
            change: Change::Switched,
            status,
            timer: TimerCommand::Arm(interval),
            selected_index: Some(selected.index),
        }
    }

    /// Timer tick: re-run the selector on the latest events.
    ///
    /// A different title (or no event at all) is handled as a full switch.
    /// Otherwise the countdown is refreshed and the timer is re-armed only
    /// when the interval for the same event changed.
    pub fn on_tick(
        &mut self,
        events: &[CalendarEvent],
        now: DateTime<Utc>,
        formatter: &StatusFormatter,
    ) -> RefreshOutcome {
        let selection = select_relevant_event(events, now);

        let Some(selected) = selection.filter(|s| {
            self.tracked_title
                .as_deref()
                .is_some_and(|title| title == s.event.title)
        }) else {
            return self.switch_to(events, now, formatter);
        };

        let status = formatter.status_title(Some(selected.event), now);
        let interval = compute_next_poll_interval(selected.event, now);
        let timer = if self.scheduled == Some(interval) {
            TimerCommand::Keep
        } else {
            debug!(
                from_secs = self.scheduled.map(|i| i.as_secs()),
                to_secs = interval.as_secs(),
                "rescheduling timer"
            );
            self.scheduled = Some(interval);
            TimerCommand::Arm(interval)
        };

        RefreshOutcome {
            change: Change::Refreshed,
            status,
            timer,
            selected_index: Some(selected.index),
        }
    }
}
