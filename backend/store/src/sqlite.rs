use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use spamshot_core::{ReceivedMessage, SpamStore, SpammerMessage, SpamshotError, Submitter};

/// SQLite-backed store for submitters, their messages, and reported spammers.
pub struct SqliteSpamStore {
    conn: Mutex<Connection>,
}

/// A stored spammer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpammerRow {
    pub spammer_id: String,
    pub phone_number: String,
    pub created_at: String,
}

/// A spammer together with how many reports reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpammerSummary {
    pub spammer_id: String,
    pub reports: u64,
}

impl SqliteSpamStore {
    /// Open or create the store at the given path.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open SQLite database")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        info!(path = %path, "Spam store opened");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory SQLite")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn init_schema(&self) -> Result<()> {
        self.conn().execute_batch(
            "PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS telegram_users (
                telegram_user_id INTEGER PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT,
                username TEXT,
                user_json TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS telegram_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                telegram_message_id INTEGER NOT NULL,
                telegram_user_id INTEGER NOT NULL,
                message_json TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS spammers (
                spammer_id TEXT PRIMARY KEY,
                phone_number TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS spammer_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                spammer_id TEXT NOT NULL REFERENCES spammers(spammer_id),
                telegram_user_id INTEGER NOT NULL,
                tesseract_tsv TEXT NOT NULL,
                tesseract_txt TEXT NOT NULL,
                file_id TEXT NOT NULL,
                file_path TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_spammer_messages_spammer ON spammer_messages(spammer_id);
            CREATE INDEX IF NOT EXISTS idx_telegram_messages_user ON telegram_messages(telegram_user_id);",
        )?;
        Ok(())
    }

    pub fn get_spammer(&self, phone_number: &str) -> Result<Option<SpammerRow>> {
        let row = self
            .conn()
            .query_row(
                "SELECT spammer_id, phone_number, created_at FROM spammers WHERE spammer_id = ?1",
                params![phone_number],
                |row| {
                    Ok(SpammerRow {
                        spammer_id: row.get(0)?,
                        phone_number: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Evidence rows filed against a spammer, oldest first.
    pub fn messages_for(&self, spammer_id: &str) -> Result<Vec<SpammerMessage>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT spammer_id, telegram_user_id, tesseract_tsv, tesseract_txt, file_id, file_path, created_at
             FROM spammer_messages WHERE spammer_id = ?1 ORDER BY id ASC",
        )?;
        let messages = stmt
            .query_map(params![spammer_id], |row| {
                let spammer_id: String = row.get(0)?;
                let user_id: i64 = row.get(1)?;
                let ocr_raw: String = row.get(2)?;
                let ocr_text: String = row.get(3)?;
                let file_id: String = row.get(4)?;
                let file_path: String = row.get(5)?;
                let created_at: String = row.get(6)?;
                Ok((spammer_id, user_id, ocr_raw, ocr_text, file_id, file_path, created_at))
            })?
            .filter_map(|r| r.ok())
            .filter_map(
                |(spammer_id, user_id, ocr_raw, ocr_text, file_id, file_path, created_at)| {
                    Some(SpammerMessage {
                        spammer_id,
                        user_id,
                        ocr_raw,
                        ocr_text,
                        file_id,
                        file_path,
                        created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
                            .ok()?
                            .with_timezone(&Utc),
                    })
                },
            )
            .collect();
        Ok(messages)
    }

    /// Most reported spammers first.
    pub fn top_spammers(&self, limit: usize) -> Result<Vec<SpammerSummary>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT s.spammer_id, COUNT(m.id) AS reports
             FROM spammers s LEFT JOIN spammer_messages m ON m.spammer_id = s.spammer_id
             GROUP BY s.spammer_id ORDER BY reports DESC, s.spammer_id ASC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(SpammerSummary {
                    spammer_id: row.get(0)?,
                    reports: row.get::<_, i64>(1)? as u64,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    pub fn user_count(&self) -> Result<usize> {
        let count: usize =
            self.conn()
                .query_row("SELECT COUNT(*) FROM telegram_users", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn message_count(&self) -> Result<usize> {
        let count: usize =
            self.conn()
                .query_row("SELECT COUNT(*) FROM telegram_messages", [], |row| row.get(0))?;
        Ok(count)
    }

    fn upsert_user_sync(&self, user: &Submitter) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let user_json = serde_json::to_string(&user.raw)?;
        self.conn().execute(
            "INSERT INTO telegram_users
                (telegram_user_id, first_name, last_name, username, user_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(telegram_user_id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                username = excluded.username,
                user_json = excluded.user_json,
                updated_at = excluded.updated_at",
            params![
                user.user_id,
                user.first_name,
                user.last_name,
                user.username,
                user_json,
                now
            ],
        )?;
        debug!(user_id = user.user_id, "Upserted telegram user");
        Ok(())
    }

    fn log_message_sync(&self, message: &ReceivedMessage) -> Result<()> {
        self.conn().execute(
            "INSERT INTO telegram_messages (telegram_message_id, telegram_user_id, message_json, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                message.message_id,
                message.user_id,
                serde_json::to_string(&message.raw)?,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn insert_spammer_sync(&self, phone_number: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR IGNORE INTO spammers (spammer_id, phone_number, created_at)
             VALUES (?1, ?1, ?2)",
            params![phone_number, Utc::now().to_rfc3339()],
        )?;
        info!(spammer = %phone_number, "Spammer recorded");
        Ok(())
    }

    fn insert_spammer_message_sync(&self, record: &SpammerMessage) -> Result<()> {
        self.conn().execute(
            "INSERT INTO spammer_messages
                (spammer_id, telegram_user_id, tesseract_tsv, tesseract_txt, file_id, file_path, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.spammer_id,
                record.user_id,
                record.ocr_raw,
                record.ocr_text,
                record.file_id,
                record.file_path,
                record.created_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }
}

fn storage_err(err: anyhow::Error) -> SpamshotError {
    SpamshotError::Storage(format!("{err:#}"))
}

#[async_trait]
impl SpamStore for SqliteSpamStore {
    async fn upsert_user(&self, user: &Submitter) -> Result<(), SpamshotError> {
        self.upsert_user_sync(user).map_err(storage_err)
    }

    async fn log_message(&self, message: &ReceivedMessage) -> Result<(), SpamshotError> {
        self.log_message_sync(message).map_err(storage_err)
    }

    async fn spammer_exists(&self, phone_number: &str) -> Result<bool, SpamshotError> {
        self.get_spammer(phone_number)
            .map(|row| row.is_some())
            .map_err(storage_err)
    }

    async fn insert_spammer(&self, phone_number: &str) -> Result<(), SpamshotError> {
        self.insert_spammer_sync(phone_number).map_err(storage_err)
    }

    async fn insert_spammer_message(&self, record: &SpammerMessage) -> Result<(), SpamshotError> {
        self.insert_spammer_message_sync(record).map_err(storage_err)
    }
}
