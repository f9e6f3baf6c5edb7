//! Duration report over dated tasks, then a due list of weekday tasks.

use chrono::{Datelike, Duration, Local};
use eventbook::task::{Severity, status_summary};
use eventbook::{
    QueryEngine, Task, TaskCategory, TaskStatus, TaskStore, Timeframe, WeekdayTask,
    WeekdayTaskStore,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut store = TaskStore::open(dir.path().join("Mytask.csv"))?;

    let today = Local::now().date_naive();
    store.insert(
        Task::new("Write report", today, 90)
            .with_category(TaskCategory::Work)
            .with_status(TaskStatus::InProgress),
    )?;
    store.insert(Task::new("Call mum", today, 20).with_category(TaskCategory::Personal))?;
    store.insert(
        Task::new("Board games", today + Duration::days(2), 180)
            .with_category(TaskCategory::Social)
            .with_status(TaskStatus::Done),
    )?;

    let engine = QueryEngine::new();
    for name in ["today", "this week", "this month"] {
        println!("Category duration summary for {name}:");
        for (category, minutes) in engine.summarize_duration_named(store.list(), name) {
            println!("  {category}: {minutes} min");
        }
    }

    println!("Status summary:");
    for (status, count) in status_summary(store.list()) {
        println!("  {status}: {count}");
    }

    let mut weekly = WeekdayTaskStore::open(dir.path().join("Weekly.csv"))?;
    weekly.insert(
        WeekdayTask::new("Pay rent", Severity::High, today.weekday())
            .with_time_frame(Timeframe::Today)
            .with_category(TaskCategory::Personal),
    )?;
    weekly.insert(
        WeekdayTask::new("Team retro", Severity::Medium, today.weekday().succ())
            .with_category(TaskCategory::Work),
    )?;

    for tf in Timeframe::ALL {
        println!("Due {tf}:");
        for task in engine.filter_due(weekly.list(), tf, None) {
            println!("  [{}] {} ({})", task.severity.as_str(), task.description, task.deadline);
        }
    }
    Ok(())
}
