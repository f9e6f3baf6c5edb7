#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use eventbook::{Event, EventStore, LockMode};
use std::path::Path;

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Friday 2024-11-22 12:00, the reference "now" of most query tests.
pub fn friday_noon() -> NaiveDateTime {
    at(2024, 11, 22, 12, 0)
}

pub fn event(name: &str, date: NaiveDateTime, category: &str) -> Event {
    Event::new(name, date).with_category(category)
}

pub fn meeting() -> Event {
    Event::new("Meeting", at(2024, 11, 22, 15, 0))
        .with_comments("Discuss project")
        .with_category("Work")
        .with_notifications("Email")
}

/// Open without the lock so a test can reopen the same file freely.
pub fn open_unlocked(path: &Path) -> EventStore {
    EventStore::builder(path)
        .lock_mode(LockMode::None)
        .open()
        .unwrap()
}

pub const EVENT_HEADER: &str = "name,date,comments,category,notifications\n";
