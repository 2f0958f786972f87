//! # Configuration
//!
//! Environment-based configuration for the muazzin bot. Everything except the
//! bot token has a sensible default so a bare `BOT_TOKEN=... cargo run` works.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::{Context, Result};
use chrono::NaiveTime;

/// Runtime configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot API token (required)
    pub bot_token: String,

    /// Path to the sqlite database file
    pub database_path: String,

    /// Base URL of the daily prayer times API
    pub prayer_api_url: String,

    /// Per-request timeout for schedule fetches, in seconds
    pub fetch_timeout_secs: u64,

    /// Local wall-clock time at which the daily replanning cycle runs
    pub replan_time: NaiveTime,

    /// Default log filter when RUST_LOG is not set
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails only when `BOT_TOKEN` is missing or `REPLAN_TIME` is malformed.
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("BOT_TOKEN")
            .context("BOT_TOKEN environment variable is required")?;

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "users.db".to_string());

        let prayer_api_url = std::env::var("PRAYER_API_URL")
            .unwrap_or_else(|_| "https://namoz-vaqtlari.more-info.uz:444".to_string());

        let fetch_timeout_secs = std::env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15);

        let replan_time_str =
            std::env::var("REPLAN_TIME").unwrap_or_else(|_| "00:10".to_string());
        let replan_time = NaiveTime::parse_from_str(&replan_time_str, "%H:%M")
            .with_context(|| format!("Invalid REPLAN_TIME '{replan_time_str}' (expected HH:MM)"))?;

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            bot_token,
            database_path,
            prayer_api_url,
            fetch_timeout_secs,
            replan_time,
            log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replan_time_parses() {
        let t = NaiveTime::parse_from_str("00:10", "%H:%M").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(0, 10, 0).unwrap());
    }

    #[test]
    fn test_missing_token_is_an_error() {
        std::env::remove_var("BOT_TOKEN");
        assert!(Config::from_env().is_err());
    }
}
