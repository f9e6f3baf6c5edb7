mod common;

use chrono::{NaiveDate, NaiveDateTime};
use common::open_unlocked;
use eventbook::{Event, FixedClock, QueryEngine, Timeframe};
use proptest::prelude::*;
use tempfile::tempdir;

fn arb_datetime() -> impl Strategy<Value = NaiveDateTime> {
    // Every day of 2023-2025, any minute.
    (0u64..(3 * 366), 0u32..24, 0u32..60).prop_map(|(offset, h, m)| {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .checked_add_days(chrono::Days::new(offset))
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    })
}

fn arb_category() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Work".to_string()),
        Just("Personal".to_string()),
        Just("work".to_string()),
        Just(String::new()),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    (
        "[a-zA-Z ,\"]{0,12}",
        arb_datetime(),
        "[a-z \n]{0,8}",
        arb_category(),
        "[A-Za-z]{0,6}",
    )
        .prop_map(|(name, date, comments, category, notifications)| {
            Event::new(name, date)
                .with_comments(comments)
                .with_category(category)
                .with_notifications(notifications)
        })
}

fn arb_events() -> impl Strategy<Value = Vec<Event>> {
    proptest::collection::vec(arb_event(), 0..30)
}

fn arb_timeframe() -> impl Strategy<Value = Timeframe> {
    prop_oneof![
        Just(Timeframe::Today),
        Just(Timeframe::ThisWeek),
        Just(Timeframe::ThisMonth),
    ]
}

// Persisting then loading yields field-wise equal events in the same order.
proptest! {
    #[test]
    fn prop_persist_load_round_trip(events in arb_events()) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.csv");

        let mut store = open_unlocked(&path);
        for event in &events {
            store.insert(event.clone()).unwrap();
        }
        store.persist().unwrap();

        let reloaded = open_unlocked(&path);
        prop_assert_eq!(reloaded.list(), events.as_slice());
    }
}

// Every resolved interval is non-empty and contains "now".
proptest! {
    #[test]
    fn prop_interval_contains_now(now in arb_datetime(), tf in arb_timeframe()) {
        let iv = tf.interval(now).unwrap();
        prop_assert!(iv.start < iv.end);
        prop_assert!(iv.contains(now));
    }
}

// Filter results are a subset of the input and lie inside the interval.
proptest! {
    #[test]
    fn prop_filter_is_subset_within_interval(
        events in arb_events(),
        now in arb_datetime(),
        tf in arb_timeframe(),
        category in proptest::option::of(arb_category()),
    ) {
        let engine = QueryEngine::with_clock(FixedClock(now));
        let iv = engine.interval(tf).unwrap();
        let found = engine.filter(&events, tf, category.as_deref());

        for event in &found {
            prop_assert!(events.iter().any(|e| std::ptr::eq(e, *event)));
            prop_assert!(iv.contains(event.date));
            if let Some(c) = category.as_deref().filter(|c| !c.is_empty()) {
                prop_assert_eq!(event.category.as_str(), c);
            }
        }

        // Order preserved: positions in the input strictly increase.
        let positions: Vec<usize> = found
            .iter()
            .map(|f| events.iter().position(|e| std::ptr::eq(e, *f)).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}

// Summary counts add up to the unrestricted filter size.
proptest! {
    #[test]
    fn prop_summary_counts_match_filter(
        events in arb_events(),
        now in arb_datetime(),
        tf in arb_timeframe(),
    ) {
        let engine = QueryEngine::with_clock(FixedClock(now));
        let total: usize = engine.summarize(&events, tf).values().sum();
        prop_assert_eq!(total, engine.filter(&events, tf, None).len());
    }
}

// After remove_at and a reload, the file holds exactly the remaining events.
proptest! {
    #[test]
    fn prop_remove_at_never_resurrects(
        events in arb_events(),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!events.is_empty());
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.csv");

        let mut store = open_unlocked(&path);
        for event in &events {
            store.insert(event.clone()).unwrap();
        }
        let index = pick.index(events.len());
        store.remove_at(index).unwrap();

        let mut expected = events.clone();
        expected.remove(index);

        let reloaded = open_unlocked(&path);
        prop_assert_eq!(reloaded.list(), expected.as_slice());
    }
}
