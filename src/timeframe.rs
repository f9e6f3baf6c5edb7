//! Named timeframes and the intervals they resolve to.
//!
//! Every interval is half-open: `start` is included, `end` is not. A record
//! at exactly midnight therefore belongs to the day (week, month) that starts
//! at that midnight and never to the one before it.

use chrono::{Datelike, Days, Local, Months, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;

/// A date window relative to the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    /// The current calendar day.
    Today,
    /// The ISO week (Monday through Sunday) containing today.
    ThisWeek,
    /// The calendar month containing today.
    ThisMonth,
}

/// Returned by [`Timeframe::from_str`] for names outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown timeframe `{0}`")]
pub struct UnknownTimeframe(pub String);

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Today, Timeframe::ThisWeek, Timeframe::ThisMonth];

    /// Canonical name: `today`, `this_week` or `this_month`.
    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::Today => "today",
            Timeframe::ThisWeek => "this_week",
            Timeframe::ThisMonth => "this_month",
        }
    }

    /// Resolve this timeframe against `now`.
    ///
    /// `None` when the interval end falls outside chrono's supported date
    /// range (around year 262 000); queries treat that as no matches.
    pub fn interval(self, now: NaiveDateTime) -> Option<Interval> {
        let today = now.date();
        let (start, end) = match self {
            Timeframe::Today => (today, today.succ_opt()?),
            Timeframe::ThisWeek => {
                let back = u64::from(today.weekday().num_days_from_monday());
                let monday = today.checked_sub_days(Days::new(back))?;
                (monday, monday.checked_add_days(Days::new(7))?)
            }
            Timeframe::ThisMonth => {
                let first = today.with_day(1)?;
                (first, first.checked_add_months(Months::new(1))?)
            }
        };
        Some(Interval {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(NaiveTime::MIN),
        })
    }
}

impl FromStr for Timeframe {
    type Err = UnknownTimeframe;

    /// Accepts `today`, `this_week`, `this_month` and the spaced spellings
    /// `this week` / `this month`, in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(' ', "_").as_str() {
            "today" => Ok(Timeframe::Today),
            "this_week" => Ok(Timeframe::ThisWeek),
            "this_month" => Ok(Timeframe::ThisMonth),
            _ => Err(UnknownTimeframe(s.to_string())),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A half-open `[start, end)` range of local date-times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Source of "now" for interval resolution.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_today_is_one_day_from_midnight() {
        let iv = Timeframe::Today.interval(at(2024, 11, 22, 12, 0)).unwrap();
        assert_eq!(iv.start, at(2024, 11, 22, 0, 0));
        assert_eq!(iv.end, at(2024, 11, 23, 0, 0));
    }

    #[test]
    fn test_week_starts_on_monday() {
        // 2024-11-22 is a Friday.
        let iv = Timeframe::ThisWeek.interval(at(2024, 11, 22, 12, 0)).unwrap();
        assert_eq!(iv.start, at(2024, 11, 18, 0, 0));
        assert_eq!(iv.end, at(2024, 11, 25, 0, 0));
    }

    #[test]
    fn test_week_on_a_monday_starts_that_day() {
        let iv = Timeframe::ThisWeek.interval(at(2024, 11, 25, 0, 0)).unwrap();
        assert_eq!(iv.start, at(2024, 11, 25, 0, 0));
    }

    #[test]
    fn test_week_on_a_sunday_reaches_back_six_days() {
        let iv = Timeframe::ThisWeek.interval(at(2024, 11, 24, 23, 59)).unwrap();
        assert_eq!(iv.start, at(2024, 11, 18, 0, 0));
        assert_eq!(iv.end, at(2024, 11, 25, 0, 0));
    }

    #[test]
    fn test_month_bounds() {
        let iv = Timeframe::ThisMonth.interval(at(2024, 2, 29, 8, 30)).unwrap();
        assert_eq!(iv.start, at(2024, 2, 1, 0, 0));
        assert_eq!(iv.end, at(2024, 3, 1, 0, 0));
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let iv = Timeframe::ThisMonth.interval(at(2024, 12, 31, 23, 59)).unwrap();
        assert_eq!(iv.start, at(2024, 12, 1, 0, 0));
        assert_eq!(iv.end, at(2025, 1, 1, 0, 0));

        let iv = Timeframe::Today.interval(at(2024, 12, 31, 23, 59)).unwrap();
        assert_eq!(iv.end, at(2025, 1, 1, 0, 0));
    }

    #[test]
    fn test_interval_is_half_open() {
        let iv = Timeframe::Today.interval(at(2024, 11, 22, 12, 0)).unwrap();
        assert!(iv.contains(at(2024, 11, 22, 0, 0)));
        assert!(iv.contains(at(2024, 11, 22, 23, 59)));
        assert!(!iv.contains(at(2024, 11, 23, 0, 0)));
        assert!(!iv.contains(at(2024, 11, 21, 23, 59)));
    }

    #[test]
    fn test_interval_past_supported_range_is_none() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.interval(NaiveDateTime::MAX), None);
        }
        let last_day = NaiveDateTime::MAX.date().and_time(NaiveTime::MIN);
        assert_eq!(Timeframe::Today.interval(last_day), None);
        assert!(Timeframe::Today.interval(NaiveDateTime::MIN).is_some());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("today".parse::<Timeframe>(), Ok(Timeframe::Today));
        assert_eq!("this_week".parse::<Timeframe>(), Ok(Timeframe::ThisWeek));
        assert_eq!("This Month".parse::<Timeframe>(), Ok(Timeframe::ThisMonth));
        assert_eq!(" this week ".parse::<Timeframe>(), Ok(Timeframe::ThisWeek));
        assert_eq!(
            "tomorrow".parse::<Timeframe>(),
            Err(UnknownTimeframe("tomorrow".to_string()))
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.to_string().parse::<Timeframe>(), Ok(tf));
        }
    }

    #[test]
    fn test_fixed_clock() {
        let now = at(2024, 11, 22, 12, 0);
        assert_eq!(FixedClock(now).now(), now);
    }
}
