//! # Feature: Notifications
//!
//! Renders and sends the two per-prayer messages: the preparation alert
//! before the prayer and the did-you-pray prompt after it. Written against
//! the [`Messenger`] seam, so tests run without Telegram.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;

use crate::features::prayer_times::Prayer;
use crate::telegram::{keyboards, Messenger};

/// Sends pre-notify alerts and post-check prompts.
#[derive(Clone)]
pub struct NotificationDispatcher {
    messenger: Arc<dyn Messenger>,
}

impl NotificationDispatcher {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        NotificationDispatcher { messenger }
    }

    /// Tell the user to prepare for the upcoming prayer.
    pub async fn send_pre_notify(
        &self,
        user_id: i64,
        prayer: Prayer,
        prayer_time: NaiveTime,
    ) -> Result<()> {
        let text = format!(
            "{} {prayer} namoziga tayyorlaning!\nBugun {prayer} vaqti: {}",
            prayer.emoji(),
            prayer_time.format("%H:%M:%S")
        );
        self.messenger.send_text(user_id, &text).await
    }

    /// Ask the user whether they prayed, with done/missed buttons correlated
    /// on `(date, prayer)`.
    pub async fn send_post_check(
        &self,
        user_id: i64,
        prayer: Prayer,
        date: NaiveDate,
    ) -> Result<()> {
        let text = format!(
            "📅 {}\nSiz {prayer} namozini o'qidingizmi?",
            date.format("%Y-%m-%d")
        );
        self.messenger
            .send_prompt(user_id, &text, keyboards::post_check_keyboard(date, prayer))
            .await
    }
}
