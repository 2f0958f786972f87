//! # Features Layer
//!
//! The scheduling and notification engine, one feature per module.

pub mod notifications;
pub mod prayer_times;
pub mod replan;
pub mod scheduler;
pub mod verdicts;

// Re-export the items the binary and the update handler wire together
pub use notifications::NotificationDispatcher;
pub use prayer_times::{DailyTimes, FetchError, Prayer, PrayerTimesApi, ScheduleSource};
pub use replan::{CycleReport, ReplanEngine};
pub use scheduler::JobScheduler;
pub use verdicts::{ResponseResolver, Verdict, VerdictEvent};
