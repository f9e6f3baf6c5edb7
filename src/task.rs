//! Task schemas, separate from [`Event`](crate::Event).
//!
//! Two layouts share the category and status vocabularies:
//!
//! - [`Task`]: a dated, duration-tracked task under
//!   `Name,Date,Duration,Comments,Category,Status`, with a `YYYY-MM-DD` date
//!   column. Opened as a [`TaskStore`].
//! - [`WeekdayTask`]: a task due on the next occurrence of a weekday, under
//!   `Description,Severity,Deadline (Weekday),Time Frame,Category,Status`.
//!   It stores no date; its deadline is resolved against "now" at query
//!   time. Opened as a [`WeekdayTaskStore`].

use crate::record::{Dated, Record, Timed};
use crate::store::Store;
use crate::timeframe::Timeframe;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Date layout of the `Date` column, e.g. `2024-11-22`.
pub const TASK_DATE_FORMAT: &str = "%Y-%m-%d";

/// A store over the dated task schema.
pub type TaskStore = Store<Task>;

/// A store over the weekday-deadline task schema.
pub type WeekdayTaskStore = Store<WeekdayTask>;

/// Fixed category vocabulary of the task schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskCategory {
    Work,
    Personal,
    Social,
    Other,
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
}

/// Urgency of a [`WeekdayTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// Returned when a vocabulary string (category, status, severity, weekday)
/// is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`, expected one of: {expected}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::Work,
        TaskCategory::Personal,
        TaskCategory::Social,
        TaskCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskCategory::Work => "work",
            TaskCategory::Personal => "personal",
            TaskCategory::Social => "social",
            TaskCategory::Other => "other",
        }
    }
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Done,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Done => "done",
        }
    }
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl FromStr for TaskCategory {
    type Err = UnknownVariant;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(TaskCategory::Work),
            "personal" => Ok(TaskCategory::Personal),
            "social" => Ok(TaskCategory::Social),
            "other" => Ok(TaskCategory::Other),
            _ => Err(UnknownVariant {
                kind: "category",
                value: s.to_string(),
                expected: "work|personal|social|other",
            }),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    /// Case-insensitive; `in progress` and `in_progress` are both accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in progress" | "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(UnknownVariant {
                kind: "status",
                value: s.to_string(),
                expected: "pending|in progress|done",
            }),
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(UnknownVariant {
                kind: "severity",
                value: s.to_string(),
                expected: "high|medium|low",
            }),
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! serde_via_str {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

serde_via_str!(TaskCategory);
serde_via_str!(TaskStatus);
serde_via_str!(Severity);

/// One row of the task file.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use eventbook::{Task, TaskCategory, TaskStatus};
///
/// let task = Task::new("Report", NaiveDate::from_ymd_opt(2024, 11, 22).unwrap(), 90)
///     .with_category(TaskCategory::Work)
///     .with_status(TaskStatus::InProgress);
/// assert_eq!(task.duration, 90);
/// assert_eq!(task.status.as_str(), "in progress");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Task {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Date", with = "task_date")]
    pub date: NaiveDate,

    /// Whole minutes.
    #[serde(rename = "Duration", with = "task_duration")]
    pub duration: u64,

    #[serde(rename = "Comments", default)]
    pub comments: String,

    #[serde(rename = "Category")]
    pub category: TaskCategory,

    #[serde(rename = "Status")]
    pub status: TaskStatus,
}

impl Task {
    /// Create a pending task in the `other` category.
    pub fn new(name: impl Into<String>, date: NaiveDate, duration: u64) -> Self {
        Task {
            name: name.into(),
            date,
            duration,
            comments: String::new(),
            category: TaskCategory::Other,
            status: TaskStatus::Pending,
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}

impl Record for Task {
    const HEADERS: &'static [&'static str] =
        &["Name", "Date", "Duration", "Comments", "Category", "Status"];

    fn category(&self) -> &str {
        self.category.as_str()
    }
}

impl Dated for Task {
    /// Tasks are placed at midnight of their date.
    fn when(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN)
    }
}

impl Timed for Task {
    fn duration_minutes(&self) -> u64 {
        self.duration
    }
}

/// One row of the weekday-deadline task file.
///
/// The deadline is a weekday, not a date: it means the next occurrence of
/// that weekday, counting today. [`deadline_date`](Self::deadline_date)
/// resolves it against a given "now", and the
/// [`QueryEngine`](crate::QueryEngine) filters these tasks with
/// [`filter_due`](crate::QueryEngine::filter_due).
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use eventbook::task::{Severity, WeekdayTask};
///
/// // Friday noon; a Monday deadline lands three days later.
/// let now = NaiveDate::from_ymd_opt(2024, 11, 22).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let task = WeekdayTask::new("Send invoice", Severity::High, Weekday::Mon);
/// let due = task.deadline_date(now).unwrap();
/// assert_eq!(due.date(), NaiveDate::from_ymd_opt(2024, 11, 25).unwrap());
/// assert!(task.is_due(now));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct WeekdayTask {
    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Severity")]
    pub severity: Severity,

    #[serde(rename = "Deadline (Weekday)", with = "weekday_name")]
    pub deadline: Weekday,

    /// The window the task was planned for, kept as entered. Filtering goes
    /// by the resolved deadline, not by this field.
    #[serde(rename = "Time Frame", with = "timeframe_label")]
    pub time_frame: Timeframe,

    #[serde(rename = "Category")]
    pub category: TaskCategory,

    #[serde(rename = "Status")]
    pub status: TaskStatus,
}

impl WeekdayTask {
    /// Create a pending task in the `other` category, planned for this week.
    pub fn new(description: impl Into<String>, severity: Severity, deadline: Weekday) -> Self {
        WeekdayTask {
            description: description.into(),
            severity,
            deadline,
            time_frame: Timeframe::ThisWeek,
            category: TaskCategory::Other,
            status: TaskStatus::Pending,
        }
    }

    pub fn with_time_frame(mut self, time_frame: Timeframe) -> Self {
        self.time_frame = time_frame;
        self
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// The next occurrence of the deadline weekday on or after `now`'s date,
    /// at `now`'s time of day. Always within `[now, now + 6 days]`.
    ///
    /// `None` past the end of chrono's supported date range.
    pub fn deadline_date(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let target = self.deadline.num_days_from_monday();
        let current = now.weekday().num_days_from_monday();
        let ahead = (target + 7 - current) % 7;
        now.checked_add_days(Days::new(u64::from(ahead)))
    }

    /// Whether the deadline has not passed at `now`.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.deadline_date(now).is_some_and(|deadline| deadline >= now)
    }

    /// Whether the task is due and its deadline falls in `timeframe`.
    ///
    /// These windows look forward from `now`: `today` is the deadline's date
    /// equal to today, `this_week` is `today <= deadline < today + 7 days`,
    /// and `this_month` is the deadline in the current calendar month.
    pub fn due_within(&self, timeframe: Timeframe, now: NaiveDateTime) -> bool {
        let Some(deadline) = self.deadline_date(now).filter(|d| *d >= now) else {
            return false;
        };
        let (today, due) = (now.date(), deadline.date());
        match timeframe {
            Timeframe::Today => due == today,
            Timeframe::ThisWeek => today
                .checked_add_days(Days::new(7))
                .is_some_and(|week_end| today <= due && due < week_end),
            Timeframe::ThisMonth => due.year() == today.year() && due.month() == today.month(),
        }
    }
}

impl Record for WeekdayTask {
    const HEADERS: &'static [&'static str] = &[
        "Description",
        "Severity",
        "Deadline (Weekday)",
        "Time Frame",
        "Category",
        "Status",
    ];

    fn category(&self) -> &str {
        self.category.as_str()
    }
}

/// A task that carries a lifecycle status.
pub trait Tracked {
    fn status(&self) -> TaskStatus;
}

impl Tracked for Task {
    fn status(&self) -> TaskStatus {
        self.status
    }
}

impl Tracked for WeekdayTask {
    fn status(&self) -> TaskStatus {
        self.status
    }
}

/// Count tasks per status over the whole collection.
///
/// Unlike the category summaries, every status is present in the result,
/// with zero for statuses no task has.
pub fn status_summary<T: Tracked>(tasks: &[T]) -> BTreeMap<TaskStatus, usize> {
    let mut summary: BTreeMap<TaskStatus, usize> =
        TaskStatus::ALL.iter().map(|status| (*status, 0)).collect();
    for task in tasks {
        *summary.entry(task.status()).or_insert(0) += 1;
    }
    summary
}

mod task_date {
    use super::TASK_DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(TASK_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(raw.trim(), TASK_DATE_FORMAT).map_err(|e| {
            serde::de::Error::custom(format!("date `{raw}` does not match YYYY-MM-DD: {e}"))
        })
    }
}

/// Whole minutes; surrounding whitespace is tolerated on read.
mod task_duration {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(minutes: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(*minutes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.trim().parse().map_err(|e| {
            serde::de::Error::custom(format!(
                "duration `{raw}` is not a whole number of minutes: {e}"
            ))
        })
    }
}

/// Lower-case full weekday names: `monday` through `sunday`.
mod weekday_name {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    const NAMES: [(&str, Weekday); 7] = [
        ("monday", Weekday::Mon),
        ("tuesday", Weekday::Tue),
        ("wednesday", Weekday::Wed),
        ("thursday", Weekday::Thu),
        ("friday", Weekday::Fri),
        ("saturday", Weekday::Sat),
        ("sunday", Weekday::Sun),
    ];

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(NAMES[day.num_days_from_monday() as usize].0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let wanted = raw.trim().to_ascii_lowercase();
        NAMES
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, day)| *day)
            .ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "unknown weekday `{raw}`, expected monday through sunday"
                ))
            })
    }
}

/// Time frames as entered in the weekday task file: `today`, `this week`,
/// `this month`.
mod timeframe_label {
    use crate::timeframe::Timeframe;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(tf: &Timeframe, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&tf.as_str().replace('_', " "))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timeframe, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
