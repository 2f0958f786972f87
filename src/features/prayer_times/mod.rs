//! # Feature: Prayer Times
//!
//! The five daily prayers, the per-region daily schedule fetched from the
//! external API, and the pure planner that turns a schedule into timed jobs.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: ScheduleSource trait seam for testability
//! - 1.0.0: Initial release

pub mod fetcher;
pub mod planner;

pub use fetcher::{FetchError, PrayerTimesApi, ScheduleSource};
pub use planner::{plan_jobs, JobKind, PlannedJob};

use chrono::{NaiveDate, NaiveTime};

/// One of the five fixed daily prayers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prayer {
    Bomdod,
    Peshin,
    Asr,
    Shom,
    Xufton,
}

impl Prayer {
    /// All five prayers in daily order.
    pub const ALL: [Prayer; 5] = [
        Prayer::Bomdod,
        Prayer::Peshin,
        Prayer::Asr,
        Prayer::Shom,
        Prayer::Xufton,
    ];

    /// Emoji used in user-facing messages.
    pub fn emoji(&self) -> &'static str {
        match self {
            Prayer::Bomdod => "🌅",
            Prayer::Peshin => "🕌",
            Prayer::Asr => "🌇",
            Prayer::Shom => "🌆",
            Prayer::Xufton => "🌙",
        }
    }
}

impl std::fmt::Display for Prayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prayer::Bomdod => write!(f, "Bomdod"),
            Prayer::Peshin => write!(f, "Peshin"),
            Prayer::Asr => write!(f, "Asr"),
            Prayer::Shom => write!(f, "Shom"),
            Prayer::Xufton => write!(f, "Xufton"),
        }
    }
}

impl std::str::FromStr for Prayer {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "bomdod" => Ok(Prayer::Bomdod),
            "peshin" => Ok(Prayer::Peshin),
            "asr" => Ok(Prayer::Asr),
            "shom" => Ok(Prayer::Shom),
            "xufton" => Ok(Prayer::Xufton),
            _ => Err(anyhow::anyhow!("Unknown prayer: {}", s)),
        }
    }
}

/// Today's prayer schedule for one region, as fetched from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTimes {
    /// Region name echoed back by the API
    pub region: String,

    /// The date this schedule is for
    pub date: NaiveDate,

    pub bomdod: NaiveTime,
    pub peshin: NaiveTime,
    pub asr: NaiveTime,
    pub shom: NaiveTime,
    pub xufton: NaiveTime,
}

impl DailyTimes {
    /// Wall-clock time of the given prayer on `self.date`.
    pub fn time_of(&self, prayer: Prayer) -> NaiveTime {
        match prayer {
            Prayer::Bomdod => self.bomdod,
            Prayer::Peshin => self.peshin,
            Prayer::Asr => self.asr,
            Prayer::Shom => self.shom,
            Prayer::Xufton => self.xufton,
        }
    }
}
