//! # Feature: Replanning Cycle
//!
//! Full recomputation of every user's notification jobs for the current day:
//! enumerate users, fetch each region's schedule, plan jobs, register them
//! with the scheduler under a fresh cycle generation. Users are processed
//! concurrently and a failure for one user never blocks the others; per-user
//! outcomes are collected into a [`CycleReport`] for the caller.
//!
//! Runs at startup, once a day from the recurring trigger, and after a user
//! changes region.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::Result;
use chrono::Local;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::database::Database;
use crate::features::notifications::NotificationDispatcher;
use crate::features::prayer_times::{plan_jobs, FetchError, JobKind, ScheduleSource};
use crate::features::scheduler::JobScheduler;

/// Outcome of one replanning cycle.
#[derive(Debug)]
pub struct CycleReport {
    /// Generation token this cycle's jobs were registered under
    pub generation: u64,
    /// (user_id, registered job count) for users that planned successfully
    pub planned: Vec<(i64, usize)>,
    /// Users whose fetch failed this cycle; they get no jobs until the next
    /// trigger
    pub failures: Vec<(i64, FetchError)>,
}

impl CycleReport {
    pub fn total_jobs(&self) -> usize {
        self.planned.iter().map(|(_, count)| count).sum()
    }

    pub fn log_summary(&self) {
        info!(
            "📋 Cycle {}: {} jobs registered for {} users, {} failures",
            self.generation,
            self.total_jobs(),
            self.planned.len(),
            self.failures.len()
        );
    }
}

/// Drives replanning cycles. Cheap to clone.
#[derive(Clone)]
pub struct ReplanEngine {
    database: Database,
    source: Arc<dyn ScheduleSource>,
    dispatcher: NotificationDispatcher,
    scheduler: JobScheduler,
}

impl ReplanEngine {
    pub fn new(
        database: Database,
        source: Arc<dyn ScheduleSource>,
        dispatcher: NotificationDispatcher,
        scheduler: JobScheduler,
    ) -> Self {
        ReplanEngine {
            database,
            source,
            dispatcher,
            scheduler,
        }
    }

    /// Run a full replanning cycle for every known user. A store failure on
    /// the user listing aborts the cycle; per-user fetch failures do not.
    pub async fn replan_all(&self) -> Result<CycleReport> {
        let users = self.database.all_users().await?;
        let generation = self.scheduler.begin_cycle();
        info!(
            "🔄 Starting replanning cycle {generation} for {} users",
            users.len()
        );

        let mut tasks = JoinSet::new();
        for (user_id, region) in users {
            let engine = self.clone();
            tasks.spawn(async move {
                let outcome = engine.plan_user(generation, user_id, &region).await;
                (user_id, outcome)
            });
        }

        let mut report = CycleReport {
            generation,
            planned: Vec::new(),
            failures: Vec::new(),
        };
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((user_id, Ok(count))) => report.planned.push((user_id, count)),
                Ok((user_id, Err(e))) => {
                    warn!("No jobs for user {user_id} this cycle: {e}");
                    report.failures.push((user_id, e));
                }
                Err(e) => warn!("Planning task panicked: {e}"),
            }
        }

        Ok(report)
    }

    /// Fetch one user's schedule and register their remaining jobs for today.
    async fn plan_user(
        &self,
        generation: u64,
        user_id: i64,
        region: &str,
    ) -> Result<usize, FetchError> {
        let today = Local::now().date_naive();
        let times = self.source.daily_times(region, today).await?;

        let now = Local::now().naive_local();
        let jobs = plan_jobs(user_id, &times, now);
        let count = jobs.len();

        for job in jobs {
            let dispatcher = self.dispatcher.clone();
            let prayer_time = times.time_of(job.prayer);
            let date = times.date;

            self.scheduler
                .schedule_at(generation, job.fire_at, move || async move {
                    let delivery = match job.kind {
                        JobKind::PreNotify => {
                            dispatcher
                                .send_pre_notify(job.user_id, job.prayer, prayer_time)
                                .await
                        }
                        JobKind::PostCheck => {
                            dispatcher
                                .send_post_check(job.user_id, job.prayer, date)
                                .await
                        }
                    };
                    if let Err(e) = delivery {
                        warn!(
                            "Failed to deliver {:?} ({}) to user {}: {e:#}",
                            job.kind, job.prayer, job.user_id
                        );
                    }
                });
        }

        debug!("Registered {count} jobs for user {user_id} in {region}");
        Ok(count)
    }
}
