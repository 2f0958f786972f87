//! # Feature: Verdicts
//!
//! Consumes the user's done/missed answers to post-check prompts. Inbound
//! verdicts arrive on an mpsc channel and are processed one at a time, so
//! every store mutation caused by a response is naturally serialized.
//!
//! A "missed" verdict appends a qazo record; "done" persists nothing. Neither
//! is deduplicated: answering the same prompt twice produces two records. The
//! acknowledgement edit of the prompt is best-effort since the persisted
//! record is already authoritative.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::Result;
use chrono::NaiveDate;
use log::{debug, error, info};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::database::Database;
use crate::features::prayer_times::Prayer;
use crate::telegram::Messenger;

/// The user's answer to a post-check prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Done,
    Missed,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Done => write!(f, "done"),
            Verdict::Missed => write!(f, "missed"),
        }
    }
}

/// One inbound verdict, correlated with the prompt it answers.
#[derive(Debug, Clone)]
pub struct VerdictEvent {
    pub user_id: i64,
    pub chat_id: i64,
    /// The prompt message, edited as acknowledgement
    pub message_id: i64,
    pub date: NaiveDate,
    pub prayer: Prayer,
    pub verdict: Verdict,
}

/// Parse a post-check callback payload (`done:{date}:{prayer}` or
/// `qazo:{date}:{prayer}`) into its correlation key.
pub fn parse_verdict_callback(data: &str) -> Option<(Verdict, NaiveDate, Prayer)> {
    let mut parts = data.splitn(3, ':');
    let verdict = match parts.next()? {
        "done" => Verdict::Done,
        "qazo" => Verdict::Missed,
        _ => return None,
    };
    let date = NaiveDate::parse_from_str(parts.next()?, "%Y-%m-%d").ok()?;
    let prayer = Prayer::from_str(parts.next()?).ok()?;
    Some((verdict, date, prayer))
}

/// Applies verdicts to the store and acknowledges them to the user.
#[derive(Clone)]
pub struct ResponseResolver {
    database: Database,
    messenger: Arc<dyn Messenger>,
}

impl ResponseResolver {
    pub fn new(database: Database, messenger: Arc<dyn Messenger>) -> Self {
        ResponseResolver {
            database,
            messenger,
        }
    }

    /// Drain the verdict channel until every sender is gone. Store errors
    /// are logged here; they never stop the loop.
    pub async fn run(self, mut events: mpsc::Receiver<VerdictEvent>) {
        info!("Response resolver started");
        while let Some(event) = events.recv().await {
            if let Err(e) = self.resolve(&event).await {
                error!(
                    "Failed to resolve {} verdict for user {}: {e:#}",
                    event.verdict, event.user_id
                );
            }
        }
        info!("Response resolver stopped: verdict channel closed");
    }

    /// Apply one verdict. The store mutation is authoritative and its error
    /// propagates; the acknowledgement edit is best-effort.
    pub async fn resolve(&self, event: &VerdictEvent) -> Result<()> {
        let date = event.date.format("%Y-%m-%d");

        let ack = match event.verdict {
            Verdict::Missed => {
                self.database
                    .add_missed(event.user_id, event.date, event.prayer)
                    .await?;
                info!(
                    "Logged missed {} on {date} for user {}",
                    event.prayer, event.user_id
                );
                format!(
                    "❌ {date} sanasidagi {} qazo sifatida saqlandi.",
                    event.prayer
                )
            }
            Verdict::Done => format!(
                "✅ {date} {} o'qilgan sifatida belgilandi. Barakalla!",
                event.prayer
            ),
        };

        if let Err(e) = self
            .messenger
            .edit_text(event.chat_id, event.message_id, &ack)
            .await
        {
            debug!("Acknowledgement edit failed for user {}: {e:#}", event.user_id);
        }

        Ok(())
    }

    /// A user's missed prayers, in insertion order.
    pub async fn list_missed(&self, user_id: i64) -> Result<Vec<(NaiveDate, Prayer)>> {
        self.database.missed_for_user(user_id).await
    }

    /// Remove every missed record for a user.
    pub async fn clear_all(&self, user_id: i64) -> Result<()> {
        self.database.clear_missed(user_id).await
    }
}
