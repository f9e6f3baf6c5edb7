//! Minimal agenda: add events, drop one, then list, filter and summarize.
//!
//! The store lives in a temporary directory; run it twice and you start
//! fresh each time.

use chrono::{Datelike, Duration, Local};
use eventbook::{EventStore, QueryEngine, Timeframe};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut store = EventStore::open(dir.path().join("events.csv"))?;

    let now = Local::now().naive_local();
    let morning = now.date().and_hms_opt(9, 0, 0).unwrap_or(now);

    store.add("Standup", morning, "", "Work", "")?;
    store.add("Gym", morning + Duration::hours(9), "leg day", "Personal", "Push")?;
    let dentist = store.add("Dentist", morning + Duration::days(3), "", "Personal", "Email")?;
    store.add("Review", morning + Duration::days(1), "Q4 plan", "Work", "")?;
    println!("Added {} events", store.len());

    store.remove(dentist)?;
    println!("Removed the dentist appointment");

    println!("\nAll events:");
    for (idx, event) in store.list().iter().enumerate() {
        println!("  {idx}: {} - {} - {}", event.name, event.date_string(), event.category);
    }

    let engine = QueryEngine::new();
    for tf in Timeframe::ALL {
        let work = engine.filter(store.list(), tf, Some("Work"));
        println!("\nWork events {tf}: {}", work.len());
        for event in work {
            println!("  {} - {}", event.name, event.date_string());
        }

        let summary = engine.summarize(store.list(), tf);
        if summary.is_empty() {
            println!("  No events found for {tf}.");
        }
        for (category, count) in &summary {
            println!("  {category}: {count} event(s)");
        }
    }

    if let Some(week) = engine.interval(Timeframe::ThisWeek) {
        println!("\nWeek starts {}", week.start.weekday());
    }
    Ok(())
}
