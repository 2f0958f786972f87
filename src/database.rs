//! # Database
//!
//! Sqlite-backed persistence: one row per user holding the selected region,
//! and an append-only log of missed prayers. The connection lives behind an
//! async mutex, so every operation is atomic with respect to itself and
//! concurrent writes for different users cannot interleave mid-statement.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlite::{ConnectionWithFullMutex, State};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::features::prayer_times::Prayer;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Shared handle to the sqlite store. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<ConnectionWithFullMutex>>,
}

impl Database {
    /// Open (or create) the database and ensure the schema exists.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = sqlite::Connection::open_with_full_mutex(path)
            .with_context(|| format!("Failed to open database at {path}"))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                region TEXT NOT NULL
            )",
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS missed (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                prayer TEXT NOT NULL
            )",
        )?;

        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Set (or overwrite) a user's region. Last write wins; the users table
    /// keeps at most one row per user.
    pub async fn set_user_region(&self, user_id: i64, region: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("INSERT OR REPLACE INTO users (user_id, region) VALUES (?, ?)")?;
        stmt.bind((1, user_id))?;
        stmt.bind((2, region))?;
        stmt.next()?;
        Ok(())
    }

    /// The stored region for one user, if they picked one.
    pub async fn user_region(&self, user_id: i64) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT region FROM users WHERE user_id = ?")?;
        stmt.bind((1, user_id))?;

        if stmt.next()? == State::Row {
            Ok(Some(stmt.read::<String, _>(0)?))
        } else {
            Ok(None)
        }
    }

    /// All known users with their regions.
    pub async fn all_users(&self) -> Result<Vec<(i64, String)>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT user_id, region FROM users")?;

        let mut users = Vec::new();
        while stmt.next()? == State::Row {
            users.push((stmt.read::<i64, _>(0)?, stmt.read::<String, _>(1)?));
        }
        Ok(users)
    }

    /// Append a missed-prayer record. Deliberately no dedup: confirming
    /// "missed" twice for the same prayer produces two rows.
    pub async fn add_missed(&self, user_id: i64, date: NaiveDate, prayer: Prayer) -> Result<()> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("INSERT INTO missed (user_id, date, prayer) VALUES (?, ?, ?)")?;
        stmt.bind((1, user_id))?;
        stmt.bind((2, date.format(DATE_FORMAT).to_string().as_str()))?;
        stmt.bind((3, prayer.to_string().as_str()))?;
        stmt.next()?;
        Ok(())
    }

    /// A user's missed prayers in insertion order.
    pub async fn missed_for_user(&self, user_id: i64) -> Result<Vec<(NaiveDate, Prayer)>> {
        let conn = self.conn.lock().await;
        let mut stmt =
            conn.prepare("SELECT date, prayer FROM missed WHERE user_id = ? ORDER BY id")?;
        stmt.bind((1, user_id))?;

        let mut rows = Vec::new();
        while stmt.next()? == State::Row {
            let date_str = stmt.read::<String, _>(0)?;
            let prayer_str = stmt.read::<String, _>(1)?;

            let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .with_context(|| format!("Corrupt date in missed row: {date_str}"))?;
            let prayer = Prayer::from_str(&prayer_str)?;
            rows.push((date, prayer));
        }
        Ok(rows)
    }

    /// Remove every missed record for one user.
    pub async fn clear_missed(&self, user_id: i64) -> Result<()> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("DELETE FROM missed WHERE user_id = ?")?;
        stmt.bind((1, user_id))?;
        stmt.next()?;
        Ok(())
    }
}
