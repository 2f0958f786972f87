// Core layer - configuration
pub mod core;

// Features layer - the scheduling and notification engine
pub mod features;

// Infrastructure - persistence and the Telegram transport
pub mod database;
pub mod telegram;

// Application layer - inbound update routing
pub mod update_handler;

// Re-export core config for convenience
pub use core::Config;

// Re-export feature items
pub use features::{
    // Prayer times
    DailyTimes, FetchError, Prayer, PrayerTimesApi, ScheduleSource,
    // Scheduling
    CycleReport, JobScheduler, ReplanEngine,
    // Notifications
    NotificationDispatcher,
    // Verdicts
    ResponseResolver, Verdict, VerdictEvent,
};

pub use database::Database;
pub use update_handler::UpdateHandler;
