//! # Prayer Times Fetcher
//!
//! Fetches one region's daily schedule from the external prayer-times API.
//! Transport problems (including the bounded per-request timeout) surface as
//! [`FetchError::Network`], malformed payloads as [`FetchError::Parse`], so
//! the replanning cycle can report them separately.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Extracted payload parsing so it is testable without the network
//! - 1.0.0: Initial release

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use super::DailyTimes;

/// Fetch failure, split by where it happened.
#[derive(Debug)]
pub enum FetchError {
    /// Transport-level failure: connect error, timeout, non-success status
    Network(String),
    /// The API answered but the body was not the expected shape
    Parse(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "network error: {msg}"),
            FetchError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Source of daily schedules. The production implementation is
/// [`PrayerTimesApi`]; tests substitute an in-memory one.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn daily_times(&self, region: &str, date: NaiveDate)
        -> Result<DailyTimes, FetchError>;
}

/// HTTP client for the daily prayer-times API.
pub struct PrayerTimesApi {
    client: reqwest::Client,
    base_url: String,
}

impl PrayerTimesApi {
    /// Build a client with a bounded per-request timeout, so one slow region
    /// cannot stall the replanning cycle for everyone else.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(PrayerTimesApi {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ScheduleSource for PrayerTimesApi {
    async fn daily_times(
        &self,
        region: &str,
        date: NaiveDate,
    ) -> Result<DailyTimes, FetchError> {
        let url = format!(
            "{}/api/GetDailyPrayTimes/{}/{}",
            self.base_url,
            region,
            date.format("%Y-%m-%d")
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Network(format!(
                "{} returned HTTP {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        parse_daily_times(&body)
    }
}

#[derive(Deserialize)]
struct ApiEnvelope {
    response: ApiDailyTimes,
}

#[derive(Deserialize)]
struct ApiDailyTimes {
    region: String,
    date: String,
    bomdod: String,
    peshin: String,
    asr: String,
    shom: String,
    xufton: String,
}

/// Parse the API payload into a [`DailyTimes`].
fn parse_daily_times(body: &str) -> Result<DailyTimes, FetchError> {
    let envelope: ApiEnvelope =
        serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    let raw = envelope.response;

    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d")
        .map_err(|e| FetchError::Parse(format!("bad date '{}': {}", raw.date, e)))?;

    let parse_time = |field: &str, value: &str| {
        NaiveTime::parse_from_str(value, "%H:%M:%S")
            .map_err(|e| FetchError::Parse(format!("bad {field} time '{value}': {e}")))
    };

    Ok(DailyTimes {
        region: raw.region,
        date,
        bomdod: parse_time("bomdod", &raw.bomdod)?,
        peshin: parse_time("peshin", &raw.peshin)?,
        asr: parse_time("asr", &raw.asr)?,
        shom: parse_time("shom", &raw.shom)?,
        xufton: parse_time("xufton", &raw.xufton)?,
    })
}
