//! Picking the event to show in the status bar.
//!
//! The first timed event of the day is the candidate. Once more than a third
//! of it has elapsed, attention moves on to the following timed event, if
//! there is one.

use chrono::{DateTime, Duration, Utc};
use tracing::trace;

use crate::event::CalendarEvent;

/// The event chosen by [`select_relevant_event`].
///
/// Borrows from the input list and records the event's position in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selected<'a> {
    /// Index of the event in the slice passed to the selector.
    pub index: usize,
    /// The selected event.
    pub event: &'a CalendarEvent,
    /// True when the candidate was mostly over and the next event was taken.
    pub advanced: bool,
}

/// Selects the current or next relevant event from `events`.
///
/// `events` must be ascending by start time. All-day events are never
/// selected. Returns `None` when no timed event is present.
pub fn select_relevant_event(
    events: &[CalendarEvent],
    now: DateTime<Utc>,
) -> Option<Selected<'_>> {
    let mut timed = events
        .iter()
        .enumerate()
        .filter(|(_, event)| !event.is_all_day());

    let (index, candidate) = timed.next()?;

    if now > grace_threshold(candidate)
        && let Some((next_index, next)) = timed.next()
    {
        trace!(
            skipped = %candidate.title,
            selected = %next.title,
            "candidate mostly over, advancing"
        );
        return Some(Selected {
            index: next_index,
            event: next,
            advanced: true,
        });
    }

    Some(Selected {
        index,
        event: candidate,
        advanced: false,
    })
}

/// Start of the event plus a third of its length, in whole minutes rounded
/// down. Events with zero or negative length get no grace at all, so the
/// threshold never falls before the start.
pub fn grace_threshold(event: &CalendarEvent) -> DateTime<Utc> {
    let grace_minutes = event.duration_minutes().max(0) / 3;
    event.start_utc() + Duration::minutes(grace_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::EventTime;
    use chrono::{NaiveDate, TimeZone};

    fn at(h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 5, h, min, 0).unwrap()
    }

    fn timed(title: &str, start: DateTime<Utc>, minutes: i64) -> CalendarEvent {
        CalendarEvent::new(
            title,
            EventTime::from_utc(start),
            EventTime::from_utc(start + Duration::minutes(minutes)),
        )
    }

    fn all_day(title: &str) -> CalendarEvent {
        let day = NaiveDate::from_ymd_opt(2025, 2, 5).unwrap();
        CalendarEvent::new(
            title,
            EventTime::from_date(day),
            EventTime::from_date(day.succ_opt().unwrap()),
        )
    }

    fn selected_title(events: &[CalendarEvent], now: DateTime<Utc>) -> Option<&str> {
        select_relevant_event(events, now).map(|s| s.event.title.as_str())
    }

    mod empty_inputs {
        use super::*;

        #[test]
        fn empty_list() {
            assert!(select_relevant_event(&[], at(9, 0)).is_none());
        }

        #[test]
        fn only_all_day_events() {
            let events = vec![all_day("Holiday"), all_day("Birthday")];
            assert!(select_relevant_event(&events, at(9, 0)).is_none());
        }
    }

    mod candidate {
        use super::*;

        #[test]
        fn single_upcoming_event() {
            let events = vec![timed("Standup", at(10, 0), 30)];
            let selected = select_relevant_event(&events, at(9, 0)).unwrap();
            assert_eq!(selected.index, 0);
            assert!(!selected.advanced);
            assert!(std::ptr::eq(selected.event, &events[0]));
        }

        #[test]
        fn all_day_events_are_skipped() {
            let events = vec![
                all_day("Holiday"),
                timed("Standup", at(10, 0), 30),
                all_day("Birthday"),
            ];
            let selected = select_relevant_event(&events, at(9, 0)).unwrap();
            assert_eq!(selected.index, 1);
            assert_eq!(selected.event.title, "Standup");
        }

        #[test]
        fn keeps_event_under_a_third_elapsed() {
            // 30 minute event, 5 minutes in: 5 < 10.
            let events = vec![
                timed("Standup", at(10, 0), 30),
                timed("Review", at(11, 0), 60),
            ];
            assert_eq!(selected_title(&events, at(10, 5)), Some("Standup"));
        }

        #[test]
        fn stays_at_exact_threshold() {
            let events = vec![
                timed("Standup", at(10, 0), 30),
                timed("Review", at(11, 0), 60),
            ];
            assert_eq!(selected_title(&events, at(10, 10)), Some("Standup"));
        }
    }

    mod advancing {
        use super::*;

        #[test]
        fn advances_past_a_third() {
            // 30 minute event, 12 minutes in: 12 > 10.
            let events = vec![
                timed("Standup", at(10, 0), 30),
                timed("Review", at(11, 0), 60),
            ];
            let selected = select_relevant_event(&events, at(10, 12)).unwrap();
            assert_eq!(selected.event.title, "Review");
            assert_eq!(selected.index, 1);
            assert!(selected.advanced);
        }

        #[test]
        fn advances_over_interleaved_all_day_event() {
            let events = vec![
                timed("Standup", at(10, 0), 30),
                all_day("Holiday"),
                timed("Review", at(11, 0), 60),
            ];
            let selected = select_relevant_event(&events, at(10, 20)).unwrap();
            assert_eq!(selected.index, 2);
        }

        #[test]
        fn falls_back_to_only_event() {
            let events = vec![timed("Standup", at(10, 0), 30), all_day("Holiday")];
            let selected = select_relevant_event(&events, at(10, 25)).unwrap();
            assert_eq!(selected.event.title, "Standup");
            assert!(!selected.advanced);
        }

        #[test]
        fn skips_at_most_one_event() {
            let events = vec![
                timed("Standup", at(10, 0), 30),
                timed("Sync", at(10, 30), 15),
                timed("Review", at(11, 0), 60),
            ];
            // Standup is long over, Sync is the pick even though it also started.
            assert_eq!(selected_title(&events, at(10, 40)), Some("Sync"));
        }

        #[test]
        fn grace_uses_floor_of_whole_minutes() {
            // 20 minutes: grace is 6 minutes, not 6m40s.
            let events = vec![
                timed("Short", at(10, 0), 20),
                timed("Next", at(11, 0), 30),
            ];
            let just_after = at(10, 6) + Duration::seconds(1);
            assert_eq!(selected_title(&events, at(10, 6)), Some("Short"));
            assert_eq!(selected_title(&events, just_after), Some("Next"));
        }
    }

    mod degenerate_durations {
        use super::*;

        #[test]
        fn zero_duration_current_until_its_start_passes() {
            let events = vec![
                timed("Reminder", at(10, 0), 0),
                timed("Review", at(11, 0), 60),
            ];
            assert_eq!(selected_title(&events, at(9, 59)), Some("Reminder"));
            assert_eq!(selected_title(&events, at(10, 0)), Some("Reminder"));
            assert_eq!(
                selected_title(&events, at(10, 0) + Duration::seconds(1)),
                Some("Review")
            );
        }

        #[test]
        fn negative_duration_never_skipped_before_start() {
            let events = vec![
                timed("Broken", at(10, 0), -30),
                timed("Review", at(11, 0), 60),
            ];
            assert_eq!(selected_title(&events, at(9, 50)), Some("Broken"));
            assert_eq!(grace_threshold(&events[0]), at(10, 0));
        }

        #[test]
        fn zero_duration_without_successor_is_kept() {
            let events = vec![timed("Reminder", at(10, 0), 0)];
            assert_eq!(selected_title(&events, at(10, 30)), Some("Reminder"));
        }
    }
}
