//! # Update Handler
//!
//! Routes inbound Telegram updates: the `/start` and `/qazo` commands and
//! every inline-button callback. Verdict button presses are not resolved
//! here; they are forwarded onto the verdict channel so the response
//! resolver applies them one at a time.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::Result;
use chrono::Local;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::database::Database;
use crate::features::prayer_times::{DailyTimes, Prayer, ScheduleSource};
use crate::features::replan::ReplanEngine;
use crate::features::verdicts::{parse_verdict_callback, ResponseResolver, VerdictEvent};
use crate::telegram::{keyboards, CallbackQuery, Message, Messenger, Update};

pub struct UpdateHandler {
    database: Database,
    messenger: Arc<dyn Messenger>,
    source: Arc<dyn ScheduleSource>,
    replan: ReplanEngine,
    resolver: ResponseResolver,
    verdicts: mpsc::Sender<VerdictEvent>,
}

impl UpdateHandler {
    pub fn new(
        database: Database,
        messenger: Arc<dyn Messenger>,
        source: Arc<dyn ScheduleSource>,
        replan: ReplanEngine,
        resolver: ResponseResolver,
        verdicts: mpsc::Sender<VerdictEvent>,
    ) -> Self {
        UpdateHandler {
            database,
            messenger,
            source,
            replan,
            resolver,
            verdicts,
        }
    }

    pub async fn handle_update(&self, update: Update) -> Result<()> {
        if let Some(message) = update.message {
            self.handle_message(message).await?;
        } else if let Some(callback) = update.callback_query {
            self.handle_callback(callback).await?;
        }
        Ok(())
    }

    async fn handle_message(&self, message: Message) -> Result<()> {
        let chat_id = message.chat.id;
        // Key per-user state on the sender, same as the callback path
        let user_id = message.from.as_ref().map_or(chat_id, |u| u.id);
        match message.text.as_deref() {
            Some("/start") => {
                self.messenger
                    .send_prompt(
                        chat_id,
                        "Assalomu alaykum! Viloyatingizni tanlang 👇",
                        keyboards::regions_keyboard(),
                    )
                    .await
            }
            Some("/qazo") => self.show_missed(user_id, chat_id).await,
            other => {
                debug!("Ignoring message {other:?} from chat {chat_id}");
                Ok(())
            }
        }
    }

    async fn handle_callback(&self, callback: CallbackQuery) -> Result<()> {
        let user_id = callback.from.id;
        let Some(message) = callback.message else {
            debug!("Callback {} without a message, ignoring", callback.id);
            return Ok(());
        };
        let chat_id = message.chat.id;
        let message_id = message.message_id;
        let data = callback.data.as_deref().unwrap_or("");

        // Stop the client-side spinner regardless of what happens next
        if let Err(e) = self.messenger.answer_callback(&callback.id).await {
            debug!("answerCallbackQuery failed: {e:#}");
        }

        if let Some(region) = data.strip_prefix("region:") {
            return self.select_region(user_id, chat_id, message_id, region).await;
        }

        match data {
            "change_region" => {
                self.messenger
                    .edit_prompt(
                        chat_id,
                        message_id,
                        "Yangi viloyatni tanlang 👇",
                        keyboards::regions_keyboard(),
                    )
                    .await
            }
            "clear_qazo" => {
                self.resolver.clear_all(user_id).await?;
                info!("Cleared missed-prayer log for user {user_id}");
                self.messenger
                    .edit_text(chat_id, message_id, "✅ Qazolar tozalandi.")
                    .await
            }
            _ => {
                if let Some((verdict, date, prayer)) = parse_verdict_callback(data) {
                    let event = VerdictEvent {
                        user_id,
                        chat_id,
                        message_id,
                        date,
                        prayer,
                        verdict,
                    };
                    if self.verdicts.send(event).await.is_err() {
                        warn!("Verdict channel closed, dropping verdict from user {user_id}");
                    }
                } else {
                    debug!("Unknown callback data '{data}' from user {user_id}");
                }
                Ok(())
            }
        }
    }

    /// Store the chosen region, echo today's times, and replan everyone so
    /// the user's jobs pick up the new region immediately.
    async fn select_region(
        &self,
        user_id: i64,
        chat_id: i64,
        message_id: i64,
        region: &str,
    ) -> Result<()> {
        self.database.set_user_region(user_id, region).await?;
        info!("User {user_id} selected region {region}");

        let today = Local::now().date_naive();
        match self.source.daily_times(region, today).await {
            Ok(times) => {
                self.messenger
                    .edit_prompt(
                        chat_id,
                        message_id,
                        &format_daily_times(&times),
                        keyboards::change_region_keyboard(),
                    )
                    .await?;
            }
            Err(e) => {
                warn!("Could not fetch times for {region} after selection: {e}");
                self.messenger
                    .edit_prompt(
                        chat_id,
                        message_id,
                        "📍 Viloyat saqlandi, lekin bugungi vaqtlarni olib bo'lmadi. Keyinroq urinib ko'ring.",
                        keyboards::change_region_keyboard(),
                    )
                    .await?;
            }
        }

        match self.replan.replan_all().await {
            Ok(report) => report.log_summary(),
            Err(e) => warn!("Replan after region change failed: {e:#}"),
        }
        Ok(())
    }

    async fn show_missed(&self, user_id: i64, chat_id: i64) -> Result<()> {
        let rows = self.resolver.list_missed(user_id).await?;
        if rows.is_empty() {
            self.messenger
                .send_text(chat_id, "🎉 Sizda qazo namoz yo'q!")
                .await
        } else {
            self.messenger
                .send_prompt(
                    chat_id,
                    &format_missed_list(&rows),
                    keyboards::clear_missed_keyboard(),
                )
                .await
        }
    }
}

/// Render the region's schedule the way the region-selection reply shows it.
fn format_daily_times(times: &DailyTimes) -> String {
    let mut text = format!("📍 {} uchun bugungi namoz vaqtlari:\n\n", times.region);
    for prayer in Prayer::ALL {
        text.push_str(&format!(
            "{} {prayer}: {}\n",
            prayer.emoji(),
            times.time_of(prayer).format("%H:%M:%S")
        ));
    }
    text.push_str(&format!("\n📅 Sana: {}", times.date.format("%Y-%m-%d")));
    text
}

fn format_missed_list(rows: &[(chrono::NaiveDate, Prayer)]) -> String {
    let mut text = String::from("📋 Sizda qazo namozlar mavjud:\n\n");
    for (date, prayer) in rows {
        text.push_str(&format!("- {} {prayer}\n", date.format("%Y-%m-%d")));
    }
    text
}
