//! In-memory [`Messenger`] used by unit tests across the crate.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

use super::types::InlineKeyboardMarkup;
use super::Messenger;

/// Records every outbound message instead of delivering it. Optionally fails
/// all sends, or only those to one chat.
#[derive(Default)]
pub struct RecordingMessenger {
    fail_all: bool,
    fail_chat: Option<i64>,
    texts: Mutex<Vec<(i64, String)>>,
    prompts: Mutex<Vec<(i64, String, InlineKeyboardMarkup)>>,
    edits: Mutex<Vec<(i64, i64, String)>>,
}

impl RecordingMessenger {
    /// A messenger whose every send fails.
    pub fn failing() -> Self {
        RecordingMessenger {
            fail_all: true,
            ..Default::default()
        }
    }

    /// A messenger that fails only sends to `chat_id`.
    pub fn failing_for(chat_id: i64) -> Self {
        RecordingMessenger {
            fail_chat: Some(chat_id),
            ..Default::default()
        }
    }

    fn check(&self, chat_id: i64) -> Result<()> {
        if self.fail_all || self.fail_chat == Some(chat_id) {
            return Err(anyhow!("simulated delivery failure for chat {chat_id}"));
        }
        Ok(())
    }

    pub fn sent_texts(&self) -> Vec<(i64, String)> {
        self.texts.lock().unwrap().clone()
    }

    pub fn sent_prompts(&self) -> Vec<(i64, String, InlineKeyboardMarkup)> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn edited(&self) -> Vec<(i64, i64, String)> {
        self.edits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.check(chat_id)?;
        self.texts.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_prompt(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: InlineKeyboardMarkup,
    ) -> Result<()> {
        self.check(chat_id)?;
        self.prompts
            .lock()
            .unwrap()
            .push((chat_id, text.to_string(), keyboard));
        Ok(())
    }

    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        self.check(chat_id)?;
        self.edits
            .lock()
            .unwrap()
            .push((chat_id, message_id, text.to_string()));
        Ok(())
    }

    async fn edit_prompt(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        _keyboard: InlineKeyboardMarkup,
    ) -> Result<()> {
        self.edit_text(chat_id, message_id, text).await
    }

    async fn answer_callback(&self, _callback_id: &str) -> Result<()> {
        Ok(())
    }
}
