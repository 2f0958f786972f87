//! # Event Planner
//!
//! Pure computation from a user's fetched schedule to the jobs that should be
//! registered for the rest of the day. No clocks, no I/O: `now` is an input,
//! which is what makes the planner trivially testable.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use chrono::{Duration, NaiveDateTime};

use super::{DailyTimes, Prayer};

/// Minutes before the prayer time at which the preparation alert fires.
pub const PRE_NOTIFY_MINUTES: i64 = 5;

/// Minutes after the prayer time at which the did-you-pray prompt fires.
pub const POST_CHECK_MINUTES: i64 = 5;

/// What a planned job does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Alert the user to prepare, shortly before the prayer
    PreNotify,
    /// Ask the user for a done/missed verdict, shortly after the prayer
    PostCheck,
}

/// One timed notification job for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedJob {
    pub user_id: i64,
    pub prayer: Prayer,
    pub kind: JobKind,
    /// Local wall-clock instant at which the job should fire
    pub fire_at: NaiveDateTime,
}

/// Plan the day's jobs for one user.
///
/// Emits up to two jobs per prayer: a pre-notify at `t - 5m` and a post-check
/// at `t + 5m`. Instants not strictly after `now` are dropped silently; there
/// is no catch-up for times already passed.
pub fn plan_jobs(user_id: i64, times: &DailyTimes, now: NaiveDateTime) -> Vec<PlannedJob> {
    let mut jobs = Vec::with_capacity(Prayer::ALL.len() * 2);

    for prayer in Prayer::ALL {
        let prayer_at = times.date.and_time(times.time_of(prayer));

        let pre_at = prayer_at - Duration::minutes(PRE_NOTIFY_MINUTES);
        if pre_at > now {
            jobs.push(PlannedJob {
                user_id,
                prayer,
                kind: JobKind::PreNotify,
                fire_at: pre_at,
            });
        }

        let post_at = prayer_at + Duration::minutes(POST_CHECK_MINUTES);
        if post_at > now {
            jobs.push(PlannedJob {
                user_id,
                prayer,
                kind: JobKind::PostCheck,
                fire_at: post_at,
            });
        }
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn sample_times() -> DailyTimes {
        DailyTimes {
            region: "Toshkent".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            bomdod: NaiveTime::from_hms_opt(5, 30, 0).unwrap(),
            peshin: NaiveTime::from_hms_opt(13, 5, 0).unwrap(),
            asr: NaiveTime::from_hms_opt(16, 40, 0).unwrap(),
            shom: NaiveTime::from_hms_opt(18, 25, 0).unwrap(),
            xufton: NaiveTime::from_hms_opt(19, 50, 0).unwrap(),
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_full_day_plans_ten_jobs() {
        let jobs = plan_jobs(42, &sample_times(), at(0, 0));
        assert_eq!(jobs.len(), 10);

        for prayer in Prayer::ALL {
            let per_prayer: Vec<_> = jobs.iter().filter(|j| j.prayer == prayer).collect();
            assert_eq!(per_prayer.len(), 2);
        }
    }

    #[test]
    fn test_offsets_are_exactly_five_minutes() {
        let jobs = plan_jobs(42, &sample_times(), at(0, 0));

        let pre = jobs
            .iter()
            .find(|j| j.prayer == Prayer::Peshin && j.kind == JobKind::PreNotify)
            .unwrap();
        let post = jobs
            .iter()
            .find(|j| j.prayer == Prayer::Peshin && j.kind == JobKind::PostCheck)
            .unwrap();

        assert_eq!(pre.fire_at, at(13, 0));
        assert_eq!(post.fire_at, at(13, 10));
    }

    #[test]
    fn test_past_instants_are_dropped() {
        // At noon, Bomdod (05:30) is fully in the past
        let jobs = plan_jobs(42, &sample_times(), at(12, 0));

        assert!(jobs.iter().all(|j| j.prayer != Prayer::Bomdod));
        assert_eq!(jobs.len(), 8);
    }

    #[test]
    fn test_boundary_instant_is_not_scheduled() {
        // Exactly at the pre-notify instant: "not strictly after now" is dropped
        let jobs = plan_jobs(42, &sample_times(), at(13, 0));

        assert!(!jobs
            .iter()
            .any(|j| j.prayer == Prayer::Peshin && j.kind == JobKind::PreNotify));
        // The post-check at 13:10 is still in the future
        assert!(jobs
            .iter()
            .any(|j| j.prayer == Prayer::Peshin && j.kind == JobKind::PostCheck));
    }

    #[test]
    fn test_mid_window_keeps_only_post_check() {
        // 13:07 is after pre-notify (13:00) but before post-check (13:10)
        let jobs = plan_jobs(42, &sample_times(), at(13, 7));
        let peshin: Vec<_> = jobs.iter().filter(|j| j.prayer == Prayer::Peshin).collect();

        assert_eq!(peshin.len(), 1);
        assert_eq!(peshin[0].kind, JobKind::PostCheck);
    }

    #[test]
    fn test_end_of_day_plans_nothing() {
        let jobs = plan_jobs(42, &sample_times(), at(23, 0));
        assert!(jobs.is_empty());
    }
}
