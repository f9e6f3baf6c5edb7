//! Core of a personal event and task tracker.
//!
//! Records live in a flat CSV file owned by a [`Store`], which keeps them in
//! memory in insertion order and rewrites the whole file on every mutation.
//! A [`QueryEngine`] resolves named timeframes (`today`, `this_week`,
//! `this_month`) into half-open intervals and filters or summarizes records
//! against them. Tasks with a weekday deadline are resolved against the
//! engine's clock instead (see [`task`]). Rendering and user interaction are
//! left to the caller.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use eventbook::{EventStore, QueryEngine, Timeframe};
//!
//! let mut store = EventStore::open("events.csv")?;
//! let at = NaiveDate::from_ymd_opt(2024, 11, 22).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! store.add("Standup", at, "", "Work", "")?;
//!
//! let engine = QueryEngine::new();
//! for event in engine.filter(store.list(), Timeframe::ThisWeek, Some("Work")) {
//!     println!("{} {}", event.date_string(), event.name);
//! }
//! # Ok::<(), eventbook::StoreError>(())
//! ```

mod error;
mod event;
mod query;
mod record;
mod store;
pub mod task;
pub mod timeframe;

pub use error::{Result, StoreError};
pub use event::{EVENT_DATE_FORMAT, Event};
pub use query::{CategoryMatch, QueryEngine};
pub use record::{Dated, Record, Timed};
pub use store::{EventStore, LockMode, MalformedPolicy, RecordId, Store, StoreBuilder};
pub use task::{Task, TaskCategory, TaskStatus, TaskStore, WeekdayTask, WeekdayTaskStore};
pub use timeframe::{Clock, FixedClock, Interval, SystemClock, Timeframe};
