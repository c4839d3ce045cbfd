//! SQLite document-store cache backend
//!
//! Entries live in a single table keyed by the URL digest, with the
//! snapshot serialized as a JSON document. Calls are short blocking
//! statements behind a mutex; the connection is never held across awaits.

use crate::cache::{Cache, CacheEntry, CacheResult};
use crate::snapshot::PageSnapshot;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed cache
pub struct SqliteCache {
    conn: Mutex<Connection>,
    duration_ms: i64,
}

impl SqliteCache {
    /// Opens (or creates) the database at `path` and initializes the schema
    pub fn new(path: impl AsRef<Path>, duration_ms: i64) -> CacheResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better concurrent behavior
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            duration_ms,
        })
    }

    /// Creates an in-memory database, used by tests
    pub fn new_in_memory(duration_ms: i64) -> CacheResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            duration_ms,
        })
    }
}

fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS snapshots (
            url_digest  TEXT PRIMARY KEY,
            url         TEXT NOT NULL,
            created_at  INTEGER NOT NULL,
            expire_at   INTEGER NOT NULL,
            snapshot    TEXT NOT NULL
        );
    ",
    )
}

#[async_trait]
impl Cache for SqliteCache {
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT url, created_at, expire_at, snapshot
                 FROM snapshots WHERE url_digest = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((url, created_at, expire_at, snapshot_json)) = row else {
            return Ok(None);
        };

        let snapshot: PageSnapshot = serde_json::from_str(&snapshot_json)?;
        Ok(Some(CacheEntry {
            url,
            created_at,
            expire_at,
            url_digest: key.to_string(),
            snapshot,
        }))
    }

    async fn save(&self, url: &str, key: &str, snapshot: &PageSnapshot) -> CacheResult<()> {
        let entry = CacheEntry::new(url, key, snapshot, self.duration_ms);
        let snapshot_json = serde_json::to_string(&entry.snapshot)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO snapshots (url_digest, url, created_at, expire_at, snapshot)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(url_digest) DO UPDATE SET
                 url = excluded.url,
                 created_at = excluded.created_at,
                 expire_at = excluded.expire_at,
                 snapshot = excluded.snapshot",
            params![key, entry.url, entry.created_at, entry.expire_at, snapshot_json],
        )?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM snapshots WHERE url_digest = ?1", params![key])?;
        Ok(())
    }
}
