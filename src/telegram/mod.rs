//! # Telegram Transport
//!
//! Outbound messaging and inbound update types for the Telegram Bot API.
//! The [`Messenger`] trait is the seam the notification dispatcher and the
//! response resolver are written against; [`api::TelegramApi`] is the real
//! implementation, tests substitute an in-memory one.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod api;
pub mod keyboards;
#[cfg(test)]
pub mod testing;
pub mod types;

pub use api::TelegramApi;
pub use types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update};

use anyhow::Result;
use async_trait::async_trait;

/// Outbound side of the messaging channel.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Post a plain text notification.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Post a text prompt with an inline keyboard.
    async fn send_prompt(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<()>;

    /// Replace a previously sent message's text (and drop its keyboard).
    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()>;

    /// Replace a previously sent message's text and keyboard.
    async fn edit_prompt(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<()>;

    /// Acknowledge a pressed inline button so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<()>;
}
