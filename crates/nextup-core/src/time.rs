//! Event boundaries and the window events are fetched for.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Start or end of a calendar event.
///
/// Serialized as `{"type": "timed", "value": "2025-02-05T10:00:00Z"}` or
/// `{"type": "all_day", "value": "2025-02-05"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EventTime {
    /// A clock time, in UTC.
    Timed(DateTime<Utc>),
    /// A calendar date with no clock time.
    AllDay(NaiveDate),
}

impl EventTime {
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self::Timed(dt)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::AllDay(date)
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// The boundary as an instant. Dates count from midnight UTC.
    pub fn instant(&self) -> DateTime<Utc> {
        match *self {
            Self::Timed(dt) => dt,
            Self::AllDay(date) => date.and_time(NaiveTime::MIN).and_utc(),
        }
    }
}

impl Ord for EventTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant().cmp(&other.instant())
    }
}

impl PartialOrd for EventTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `[start, end)` in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// # Panics
    ///
    /// If `end` is before `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        assert!(start <= end, "window end {} is before its start {}", end, start);
        Self { start, end }
    }

    /// From `now` until the next midnight in `tz`.
    ///
    /// Should midnight be skipped by a DST change, the day is assumed to be
    /// 24 hours long.
    pub fn today_remaining<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Self {
        let today = now.with_timezone(tz).date_naive();
        let midnight = today
            .succ_opt()
            .and_then(|tomorrow| {
                tz.from_local_datetime(&tomorrow.and_time(NaiveTime::MIN))
                    .earliest()
            })
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| today.and_time(NaiveTime::MIN).and_utc() + Duration::days(1));

        Self {
            start: now,
            end: midnight.max(now),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        (self.start..self.end).contains(&instant)
    }

    /// Whether an event from `start` to `end` should be listed for this
    /// window. Events already running when the window opens are included,
    /// as are zero-length events inside it.
    pub fn overlaps_event(&self, start: &EventTime, end: &EventTime) -> bool {
        let (start, end) = (start.instant(), end.instant());
        if start == end {
            return self.contains(start);
        }
        start < self.end && end > self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 5, h, min, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, d).unwrap()
    }

    mod event_time {
        use super::*;

        #[test]
        fn all_day_starts_at_utc_midnight() {
            let all_day = EventTime::from_date(day(5));
            assert!(all_day.is_all_day());
            assert_eq!(all_day.instant(), at(0, 0));
            assert!(!EventTime::from_utc(at(10, 30)).is_all_day());
        }

        #[test]
        fn orders_by_instant() {
            let mut times = vec![
                EventTime::from_utc(at(11, 0)),
                EventTime::from_date(day(5)),
                EventTime::from_utc(at(10, 0)),
            ];
            times.sort();
            assert_eq!(
                times,
                vec![
                    EventTime::from_date(day(5)),
                    EventTime::from_utc(at(10, 0)),
                    EventTime::from_utc(at(11, 0)),
                ]
            );
        }

        #[test]
        fn json_shape() {
            assert_eq!(
                serde_json::to_string(&EventTime::from_date(day(5))).unwrap(),
                r#"{"type":"all_day","value":"2025-02-05"}"#
            );
            let timed: EventTime =
                serde_json::from_str(r#"{"type":"timed","value":"2025-02-05T10:00:00Z"}"#)
                    .unwrap();
            assert_eq!(timed, EventTime::from_utc(at(10, 0)));
        }
    }

    mod time_window {
        use super::*;

        #[test]
        #[should_panic(expected = "is before its start")]
        fn rejects_reversed_bounds() {
            TimeWindow::new(at(17, 0), at(9, 0));
        }

        #[test]
        fn rest_of_day_in_utc() {
            let window = TimeWindow::today_remaining(at(14, 15), &Utc);
            assert_eq!(window.start, at(14, 15));
            assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 2, 6, 0, 0, 0).unwrap());
        }

        #[test]
        fn rest_of_day_ahead_of_utc() {
            // 23:00 UTC is already 01:00 on the 6th at UTC+2.
            let tz = FixedOffset::east_opt(2 * 3600).unwrap();
            let window = TimeWindow::today_remaining(at(23, 0), &tz);
            assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 2, 6, 22, 0, 0).unwrap());
        }

        #[test]
        fn rest_of_day_behind_utc() {
            // 03:00 UTC is still the 4th at UTC-5; that day ends at 05:00 UTC.
            let tz = FixedOffset::west_opt(5 * 3600).unwrap();
            let window = TimeWindow::today_remaining(at(3, 0), &tz);
            assert_eq!(window.end, at(5, 0));
        }

        #[test]
        fn overlap_rules() {
            let window = TimeWindow::new(at(9, 0), at(17, 0));
            let t = |h, m| EventTime::from_utc(at(h, m));

            assert!(window.overlaps_event(&t(8, 30), &t(9, 30)), "running at open");
            assert!(window.overlaps_event(&t(10, 0), &t(11, 0)), "inside");
            assert!(window.overlaps_event(&t(16, 30), &t(18, 0)), "running at close");
            assert!(!window.overlaps_event(&t(8, 0), &t(9, 0)), "ended at open");
            assert!(!window.overlaps_event(&t(17, 0), &t(18, 0)), "starts at close");
            assert!(window.overlaps_event(&t(12, 0), &t(12, 0)), "zero length");
            assert!(!window.overlaps_event(&t(17, 0), &t(17, 0)), "zero length at close");
        }
    }
}
