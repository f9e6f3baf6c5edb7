use crate::record::{Dated, Record};
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Date layout of the `date` column, e.g. `22-11-2024 15:00`.
pub const EVENT_DATE_FORMAT: &str = "%d-%m-%Y %H:%M";

/// One scheduled item in the event file.
///
/// Rows are stored under the header `name,date,comments,category,notifications`.
/// Only `date` is typed; the other fields are free text and are not
/// validated (an empty `name` is accepted).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use eventbook::Event;
///
/// let date = NaiveDate::from_ymd_opt(2024, 11, 22)
///     .unwrap()
///     .and_hms_opt(15, 0, 0)
///     .unwrap();
/// let event = Event::new("Meeting", date)
///     .with_comments("Discuss project")
///     .with_category("Work")
///     .with_notifications("Email");
/// assert_eq!(event.category, "Work");
/// assert_eq!(event.date_string(), "22-11-2024 15:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Event {
    /// Free-text label.
    pub name: String,

    /// Scheduled instant, minute precision.
    #[serde(with = "event_date")]
    pub date: NaiveDateTime,

    #[serde(default)]
    pub comments: String,

    /// Grouping label. Compared case-sensitively unless the query engine is
    /// configured otherwise.
    #[serde(default)]
    pub category: String,

    /// Free-text notification preference, not interpreted.
    #[serde(default)]
    pub notifications: String,
}

impl Event {
    /// Create an event with empty comments, category and notifications.
    ///
    /// Seconds and sub-second parts of `date` are dropped, since the file
    /// stores minutes only; this keeps a persisted event equal to its
    /// reloaded copy.
    pub fn new(name: impl Into<String>, date: NaiveDateTime) -> Self {
        Event {
            name: name.into(),
            date: truncate_to_minute(date),
            comments: String::new(),
            category: String::new(),
            notifications: String::new(),
        }
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_notifications(mut self, notifications: impl Into<String>) -> Self {
        self.notifications = notifications.into();
        self
    }

    /// The `date` field as it appears in the file.
    pub fn date_string(&self) -> String {
        self.date.format(EVENT_DATE_FORMAT).to_string()
    }
}

impl Record for Event {
    const HEADERS: &'static [&'static str] =
        &["name", "date", "comments", "category", "notifications"];

    fn category(&self) -> &str {
        &self.category
    }

    /// The file keeps minutes only; a `date` assigned directly with seconds
    /// is truncated here.
    fn canonical(mut self) -> Self {
        self.date = truncate_to_minute(self.date);
        self
    }
}

impl Dated for Event {
    fn when(&self) -> NaiveDateTime {
        self.date
    }
}

fn truncate_to_minute(date: NaiveDateTime) -> NaiveDateTime {
    date.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(date)
}

mod event_date {
    use super::EVENT_DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(EVENT_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(raw.trim(), EVENT_DATE_FORMAT).map_err(|e| {
            serde::de::Error::custom(format!(
                "date `{raw}` does not match DD-MM-YYYY HH:MM: {e}"
            ))
        })
    }
}
