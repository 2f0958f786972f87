use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

use muazzin::core::Config;
use muazzin::database::Database;
use muazzin::features::notifications::NotificationDispatcher;
use muazzin::features::prayer_times::{PrayerTimesApi, ScheduleSource};
use muazzin::features::replan::ReplanEngine;
use muazzin::features::scheduler::JobScheduler;
use muazzin::features::verdicts::ResponseResolver;
use muazzin::telegram::{Messenger, TelegramApi};
use muazzin::update_handler::UpdateHandler;

/// Verdicts buffered between the update router and the resolver.
const VERDICT_QUEUE_DEPTH: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Muazzin prayer-times bot...");

    let database = Database::new(&config.database_path).await?;
    info!("💾 Database ready at {}", config.database_path);

    let telegram = Arc::new(TelegramApi::new(&config.bot_token)?);
    let messenger: Arc<dyn Messenger> = telegram.clone();

    let source: Arc<dyn ScheduleSource> = Arc::new(PrayerTimesApi::new(
        &config.prayer_api_url,
        config.fetch_timeout_secs,
    )?);

    let scheduler = JobScheduler::new();
    let dispatcher = NotificationDispatcher::new(messenger.clone());
    let resolver = ResponseResolver::new(database.clone(), messenger.clone());

    // Verdict events are consumed single-threadedly by the resolver, so all
    // store writes caused by responses are serialized
    let (verdict_tx, verdict_rx) = mpsc::channel(VERDICT_QUEUE_DEPTH);
    tokio::spawn(resolver.clone().run(verdict_rx));

    let replan = ReplanEngine::new(
        database.clone(),
        source.clone(),
        dispatcher,
        scheduler.clone(),
    );

    // Re-arm today's remaining notifications after a restart
    match replan.replan_all().await {
        Ok(report) => report.log_summary(),
        Err(e) => error!("Startup replanning cycle failed: {e:#}"),
    }

    // The daily trigger replans everyone for the new day
    let daily_replan = replan.clone();
    scheduler.schedule_daily(config.replan_time, move || {
        let replan = daily_replan.clone();
        async move {
            match replan.replan_all().await {
                Ok(report) => report.log_summary(),
                Err(e) => error!("Daily replanning cycle failed: {e:#}"),
            }
        }
    });
    info!(
        "⏰ Daily replanning scheduled for {} local time",
        config.replan_time.format("%H:%M")
    );

    let handler = UpdateHandler::new(
        database,
        messenger,
        source,
        replan,
        resolver,
        verdict_tx,
    );

    info!("📡 Long polling for updates...");
    let mut offset = 0i64;
    loop {
        match telegram.get_updates(offset).await {
            Ok(updates) => {
                for update in updates {
                    offset = update.update_id + 1;
                    if let Err(e) = handler.handle_update(update).await {
                        error!("Error handling update: {e:#}");
                    }
                }
            }
            Err(e) => {
                warn!("getUpdates failed, retrying in 5s: {e:#}");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            }
        }
    }
}
