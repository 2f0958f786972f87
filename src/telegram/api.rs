//! # Telegram API Client
//!
//! Thin reqwest client for the handful of Bot API methods the bot needs:
//! sending and editing messages, answering callback queries, and long-polling
//! getUpdates.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use super::types::{ApiResponse, InlineKeyboardMarkup, Message, Update};
use super::Messenger;

/// How long getUpdates holds the connection open, in seconds.
const LONG_POLL_SECS: u64 = 30;

pub struct TelegramApi {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramApi {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(&format!("https://api.telegram.org/bot{token}"))
    }

    /// Point the client at an arbitrary base URL (used by tests).
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        // Client timeout must outlast the long poll
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(LONG_POLL_SECS + 10))
            .build()?;

        Ok(TelegramApi {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: &impl Serialize) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self.client.post(&url).json(params).send().await?;
        let envelope: ApiResponse<T> = response.json().await?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| "no description".to_string());
            return Err(anyhow!("Telegram {method} failed: {description}"));
        }

        envelope
            .result
            .ok_or_else(|| anyhow!("Telegram {method} returned ok without a result"))
    }

    /// Fetch pending updates, blocking server-side up to the long-poll window.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &json!({ "offset": offset, "timeout": LONG_POLL_SECS }),
        )
        .await
    }
}

#[async_trait]
impl Messenger for TelegramApi {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        debug!("Sending message to chat {chat_id}");
        let _: Message = self
            .call("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }

    async fn send_prompt(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<()> {
        debug!("Sending prompt to chat {chat_id}");
        let _: Message = self
            .call(
                "sendMessage",
                &json!({ "chat_id": chat_id, "text": text, "reply_markup": keyboard }),
            )
            .await?;
        Ok(())
    }

    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &json!({ "chat_id": chat_id, "message_id": message_id, "text": text }),
            )
            .await?;
        Ok(())
    }

    async fn edit_prompt(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                &json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                    "text": text,
                    "reply_markup": keyboard
                }),
            )
            .await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": callback_id }),
            )
            .await?;
        Ok(())
    }
}
