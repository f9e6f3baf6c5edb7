use crate::record::{Dated, Record, Timed};
use crate::task::WeekdayTask;
use crate::timeframe::{Clock, Interval, SystemClock, Timeframe};
use log::debug;
use std::collections::BTreeMap;

/// How a category argument is compared against a record's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryMatch {
    /// Case-sensitive equality.
    #[default]
    Exact,
    /// The record's category contains the argument, ignoring case.
    ContainsIgnoreCase,
}

impl CategoryMatch {
    fn matches(self, wanted: &str, actual: &str) -> bool {
        match self {
            CategoryMatch::Exact => actual == wanted,
            CategoryMatch::ContainsIgnoreCase => {
                actual.to_lowercase().contains(&wanted.to_lowercase())
            }
        }
    }
}

/// Filters and aggregates records against named timeframes.
///
/// The engine never mutates or copies the records it is given: filters
/// return borrowed records in their original order. "Now" is read from the
/// engine's [`Clock`] on every call.
///
/// Methods come in two shapes. The typed ones take a [`Timeframe`]; the
/// `_named` ones take the raw name and answer an unknown name with an empty
/// result rather than an error. A "now" whose interval cannot be represented
/// also yields an empty result.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use eventbook::{Event, FixedClock, QueryEngine, Timeframe};
///
/// let noon = NaiveDate::from_ymd_opt(2024, 11, 22).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let events = vec![
///     Event::new("Standup", noon).with_category("Work"),
///     Event::new("Gym", noon).with_category("Personal"),
/// ];
///
/// let engine = QueryEngine::with_clock(FixedClock(noon));
/// assert_eq!(engine.filter(&events, Timeframe::Today, Some("Work")).len(), 1);
/// assert_eq!(engine.summarize_named(&events, "today")["Personal"], 1);
/// assert!(engine.filter_named(&events, "yesterday", None).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryEngine<C = SystemClock> {
    clock: C,
    category_match: CategoryMatch,
}

impl QueryEngine<SystemClock> {
    /// An engine on local wall-clock time with exact category matching.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> QueryEngine<C> {
    pub fn with_clock(clock: C) -> Self {
        QueryEngine {
            clock,
            category_match: CategoryMatch::default(),
        }
    }

    /// Set the category comparison used by [`filter`](Self::filter).
    pub fn category_match(mut self, category_match: CategoryMatch) -> Self {
        self.category_match = category_match;
        self
    }

    /// Resolve `timeframe` against the engine's clock.
    pub fn interval(&self, timeframe: Timeframe) -> Option<Interval> {
        timeframe.interval(self.clock.now())
    }

    /// Records dated inside `timeframe`, optionally restricted to a category.
    ///
    /// `None` and `Some("")` both mean "any category".
    pub fn filter<'a, R: Dated>(
        &self,
        records: &'a [R],
        timeframe: Timeframe,
        category: Option<&str>,
    ) -> Vec<&'a R> {
        let Some(interval) = self.interval(timeframe) else {
            debug!("eventbook: {timeframe} is out of range at {}", self.clock.now());
            return Vec::new();
        };
        records
            .iter()
            .filter(|r| interval.contains(r.when()))
            .filter(|r| self.category_matches(category, *r))
            .collect()
    }

    /// Like [`filter`](Self::filter), with the timeframe given by name.
    pub fn filter_named<'a, R: Dated>(
        &self,
        records: &'a [R],
        timeframe: &str,
        category: Option<&str>,
    ) -> Vec<&'a R> {
        match parse_timeframe(timeframe) {
            Some(tf) => self.filter(records, tf, category),
            None => Vec::new(),
        }
    }

    /// Number of records per category inside `timeframe`.
    ///
    /// Categories with no matching record are absent, not zero.
    pub fn summarize<R: Dated>(
        &self,
        records: &[R],
        timeframe: Timeframe,
    ) -> BTreeMap<String, usize> {
        self.fold_by_category(records, timeframe, |_| 1)
    }

    pub fn summarize_named<R: Dated>(
        &self,
        records: &[R],
        timeframe: &str,
    ) -> BTreeMap<String, usize> {
        match parse_timeframe(timeframe) {
            Some(tf) => self.summarize(records, tf),
            None => BTreeMap::new(),
        }
    }

    /// Total minutes per category inside `timeframe`.
    pub fn summarize_duration<R: Timed>(
        &self,
        records: &[R],
        timeframe: Timeframe,
    ) -> BTreeMap<String, u64> {
        self.fold_by_category(records, timeframe, |r| r.duration_minutes())
    }

    pub fn summarize_duration_named<R: Timed>(
        &self,
        records: &[R],
        timeframe: &str,
    ) -> BTreeMap<String, u64> {
        match parse_timeframe(timeframe) {
            Some(tf) => self.summarize_duration(records, tf),
            None => BTreeMap::new(),
        }
    }

    /// Weekday-deadline tasks that are due, with a deadline inside
    /// `timeframe` as resolved from the engine's clock, optionally restricted
    /// to a category.
    ///
    /// See [`WeekdayTask::due_within`] for the forward-looking windows.
    pub fn filter_due<'a>(
        &self,
        tasks: &'a [WeekdayTask],
        timeframe: Timeframe,
        category: Option<&str>,
    ) -> Vec<&'a WeekdayTask> {
        let now = self.clock.now();
        tasks
            .iter()
            .filter(|task| task.due_within(timeframe, now))
            .filter(|task| self.category_matches(category, *task))
            .collect()
    }

    pub fn filter_due_named<'a>(
        &self,
        tasks: &'a [WeekdayTask],
        timeframe: &str,
        category: Option<&str>,
    ) -> Vec<&'a WeekdayTask> {
        match parse_timeframe(timeframe) {
            Some(tf) => self.filter_due(tasks, tf, category),
            None => Vec::new(),
        }
    }

    /// `None` and `Some("")` place no restriction.
    fn category_matches<R: Record>(&self, category: Option<&str>, record: &R) -> bool {
        match category.filter(|c| !c.is_empty()) {
            Some(wanted) => self.category_match.matches(wanted, record.category()),
            None => true,
        }
    }

    fn fold_by_category<R, T, F>(
        &self,
        records: &[R],
        timeframe: Timeframe,
        weight: F,
    ) -> BTreeMap<String, T>
    where
        R: Dated,
        T: Default + std::ops::AddAssign,
        F: Fn(&R) -> T,
    {
        let mut summary = BTreeMap::new();
        for record in self.filter(records, timeframe, None) {
            *summary.entry(record.category().to_string()).or_default() += weight(record);
        }
        summary
    }
}

fn parse_timeframe(name: &str) -> Option<Timeframe> {
    match name.parse() {
        Ok(tf) => Some(tf),
        Err(e) => {
            debug!("eventbook: {e}, treating as no matches");
            None
        }
    }
}
