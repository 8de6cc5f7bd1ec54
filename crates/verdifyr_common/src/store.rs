//! Session log persistence
//!
//! The pipeline only knows the [`SessionGateway`] trait; the shipped
//! implementation is SQLite-backed, one row per session in `search_logs`
//! with the ingredient list and verdicts stored as JSON payloads. A store
//! failure never invalidates computed verdicts; callers report it alongside
//! the result.

use crate::session::{Actor, SessionRecord};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Persistence failures, kept separate from pipeline errors on purpose.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to encode session payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to prepare store location: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored session row is corrupt: {0}")]
    Corrupt(String),
}

/// One line of session history.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub actor_id: String,
    pub ingredient_count: usize,
    pub forbidden_count: usize,
}

/// External persistence collaborator, interface only as far as the pipeline
/// is concerned.
pub trait SessionGateway: Send + Sync {
    /// Persist a record, returning the assigned row id
    fn save(&self, record: &SessionRecord) -> Result<i64, StoreError>;

    /// Most recent sessions, newest first
    fn recent(&self, limit: usize) -> Result<Vec<SessionSummary>, StoreError>;

    /// Load one full record by session id
    fn load(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError>;
}

/// SQLite-backed session store.
pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    /// Open or create the store at the default location
    /// (`~/.local/share/verdifyr/search_logs.db`)
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(&Self::default_path())
    }

    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// In-memory store for tests
    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Arc::new(Mutex::new(Connection::open_in_memory()?)),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("verdifyr")
            .join("search_logs.db")
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS search_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL UNIQUE,
                actor_kind TEXT NOT NULL,
                actor_id TEXT NOT NULL,
                source_ingredients TEXT NOT NULL,
                final_verdicts TEXT NOT NULL,
                ingredient_count INTEGER NOT NULL,
                forbidden_count INTEGER NOT NULL,
                app_version TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_search_logs_created
             ON search_logs(created_at DESC)",
            [],
        )?;
        Ok(())
    }
}

impl SessionGateway for SqliteSessionStore {
    fn save(&self, record: &SessionRecord) -> Result<i64, StoreError> {
        let (actor_kind, actor_id) = match &record.actor {
            Actor::User(id) => ("user", id.as_str()),
            Actor::Anonymous(id) => ("anonymous", id.as_str()),
        };
        let ingredients_json = serde_json::to_string(&record.source_ingredients)?;
        let verdicts_json = serde_json::to_string(&record.final_verdicts)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO search_logs
                (session_id, actor_kind, actor_id, source_ingredients,
                 final_verdicts, ingredient_count, forbidden_count,
                 app_version, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.session_id.to_string(),
                actor_kind,
                actor_id,
                ingredients_json,
                verdicts_json,
                record.source_ingredients.len(),
                record.forbidden_count(),
                record.app_version,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn recent(&self, limit: usize) -> Result<Vec<SessionSummary>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT session_id, created_at, actor_id, ingredient_count, forbidden_count
             FROM search_logs ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (session_id, created_at, actor_id, ingredient_count, forbidden_count) = row?;
            summaries.push(SessionSummary {
                session_id,
                created_at: parse_timestamp(&created_at)?,
                actor_id,
                ingredient_count: ingredient_count as usize,
                forbidden_count: forbidden_count as usize,
            });
        }
        Ok(summaries)
    }

    fn load(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT session_id, actor_kind, actor_id, source_ingredients,
                        final_verdicts, app_version, created_at
                 FROM search_logs WHERE session_id = ?1",
                params![session_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((sid, actor_kind, actor_id, ingredients_json, verdicts_json, app_version, created_at)) =
            row
        else {
            return Ok(None);
        };

        let actor = match actor_kind.as_str() {
            "user" => Actor::User(actor_id),
            "anonymous" => Actor::Anonymous(actor_id),
            other => return Err(StoreError::Corrupt(format!("unknown actor kind {:?}", other))),
        };

        Ok(Some(SessionRecord {
            session_id: sid
                .parse()
                .map_err(|e| StoreError::Corrupt(format!("bad session id: {}", e)))?,
            created_at: parse_timestamp(&created_at)?,
            actor,
            source_ingredients: serde_json::from_str(&ingredients_json)?,
            final_verdicts: serde_json::from_str(&verdicts_json)?,
            app_version,
        }))
    }
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {:?}: {}", text, e)))
}
