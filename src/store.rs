use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::detail::Draft;

const SCHEMA_VERSION: i32 = 1;

/// Raw session blobs as written by `login`; parsing happens in `session`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token: Option<String>,
    pub user: Option<String>,
    pub saved_at: DateTime<Utc>,
}

/// Local desk state kept between invocations.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).context("Failed to open database")?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap_or(0);

        if version < SCHEMA_VERSION {
            self.conn.execute_batch(
                r#"
                -- Single-row credential store
                CREATE TABLE IF NOT EXISTS session (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    token TEXT,
                    user TEXT,
                    saved_at TEXT NOT NULL
                );

                -- Staged detail edits, one per complaint
                CREATE TABLE IF NOT EXISTS drafts (
                    complaint_id TEXT PRIMARY KEY,
                    payload TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                "#,
            )?;

            self.conn
                .execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;
        }

        Ok(())
    }

    // Session
    pub fn save_session(&self, token: &str, user: Option<&str>) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO session (id, token, user, saved_at) VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET token = ?1, user = ?2, saved_at = ?3",
            params![token, user, now],
        )?;
        Ok(())
    }

    pub fn load_session(&self) -> Result<Option<StoredSession>> {
        let session = self
            .conn
            .query_row(
                "SELECT token, user, saved_at FROM session WHERE id = 1",
                [],
                |row| {
                    Ok(StoredSession {
                        token: row.get(0)?,
                        user: row.get(1)?,
                        saved_at: parse_datetime(row.get::<_, String>(2)?),
                    })
                },
            )
            .optional()?;
        Ok(session)
    }

    pub fn clear_session(&self) -> Result<bool> {
        let rows = self.conn.execute("DELETE FROM session", [])?;
        Ok(rows > 0)
    }

    // Drafts
    pub fn save_draft(&self, draft: &Draft) -> Result<()> {
        let payload = serde_json::to_string(draft).context("Failed to encode draft")?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO drafts (complaint_id, payload, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(complaint_id) DO UPDATE SET payload = ?2, updated_at = ?3",
            params![draft.complaint_id, payload, now],
        )?;
        Ok(())
    }

    pub fn get_draft(&self, complaint_id: &str) -> Result<Option<Draft>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM drafts WHERE complaint_id = ?1",
                [complaint_id],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|p| serde_json::from_str(&p).context("Stored draft is corrupt"))
            .transpose()
    }

    pub fn list_drafts(&self) -> Result<Vec<Draft>> {
        let mut stmt = self
            .conn
            .prepare("SELECT complaint_id, payload FROM drafts ORDER BY updated_at")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut drafts = Vec::with_capacity(rows.len());
        for (complaint_id, payload) in rows {
            match serde_json::from_str(&payload) {
                Ok(draft) => drafts.push(draft),
                Err(e) => tracing::warn!(%complaint_id, error = %e, "ignoring corrupt draft"),
            }
        }
        Ok(drafts)
    }

    pub fn delete_draft(&self, complaint_id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM drafts WHERE complaint_id = ?1", [complaint_id])?;
        Ok(rows > 0)
    }
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
