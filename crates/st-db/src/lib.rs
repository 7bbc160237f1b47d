//! Durable unique-item store.
//!
//! Persists item observations with their attributed locations using
//! `rusqlite`, deduplicating on insert so that re-observing the same chest
//! is a no-op.
//!
//! # Thread Safety
//!
//! [`Database`] wraps a `rusqlite::Connection`, which is `Send` but not
//! `Sync`. The intended multi-threaded setup is a single [`StoreWriter`]
//! thread owning the connection, fed through its bounded channel handle.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in ISO 8601 format (e.g.
//! `2024-01-15T10:30:00Z`), so lexicographic ordering matches
//! chronological ordering.
//!
//! Identity for deduplication is the tuple (item key, profile, container,
//! position). The item key is the host-provided item uuid when present,
//! otherwise a hash surrogate over the item payload. The position key is a
//! plain `x,y,z` string (empty when no fresh signal existed) because a
//! unique index over nullable coordinate columns would treat every NULL
//! row as distinct.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

use st_core::{ItemSnapshot, StoredItemLocation};

mod writer;

pub use writer::{StoreHandle, StoreWriter, WRITER_QUEUE_CAPACITY};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The item payload could not be serialized.
    #[error("item payload not serializable: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Per-container stored-item tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerTally {
    pub container: String,
    pub items: i64,
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    fn init(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS unique_items (
                id          INTEGER PRIMARY KEY,
                item_key    TEXT NOT NULL,
                name        TEXT NOT NULL,
                count       INTEGER NOT NULL,
                data        TEXT NOT NULL,
                profile_id  TEXT NOT NULL,
                container   TEXT NOT NULL,
                x           INTEGER,
                y           INTEGER,
                z           INTEGER,
                pos_key     TEXT NOT NULL,
                first_seen  TEXT NOT NULL
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_unique_items_identity
                ON unique_items (item_key, profile_id, container, pos_key);",
        )?;
        Ok(())
    }

    /// Inserts one observation, returning whether a new row was added.
    ///
    /// Re-inserting an identical (item, location) pair is ignored.
    pub fn insert_item(
        &mut self,
        item: &ItemSnapshot,
        location: &StoredItemLocation,
        first_seen: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let item_key = item_key(item)?;
        let data = serde_json::to_string(&item.data)?;
        let (x, y, z) = location
            .pos
            .map_or((None, None, None), |p| (Some(p.x), Some(p.y), Some(p.z)));
        let pos_key = location.pos.map_or_else(String::new, |p| p.to_string());

        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO unique_items
                (item_key, name, count, data, profile_id, container, x, y, z, pos_key, first_seen)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                item_key,
                item.name,
                item.count,
                data,
                location.profile.as_str(),
                location.container,
                x,
                y,
                z,
                pos_key,
                first_seen.to_rfc3339_opts(SecondsFormat::Millis, true),
            ],
        )?;
        Ok(changed > 0)
    }

    /// Total number of stored unique items.
    pub fn count_items(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM unique_items", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Stored-item counts grouped by container, largest first.
    pub fn items_by_container(&self) -> Result<Vec<ContainerTally>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT container, COUNT(*) AS items
             FROM unique_items
             GROUP BY container
             ORDER BY items DESC, container ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ContainerTally {
                container: row.get(0)?,
                items: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

/// Stable identity for deduplication: the host uuid when present, else an
/// xxh3 hash surrogate over the item payload.
fn item_key(item: &ItemSnapshot) -> Result<String, StoreError> {
    if let Some(uuid) = &item.uuid {
        return Ok(uuid.clone());
    }
    let canonical = serde_json::to_string(&(&item.name, item.count, &item.data))?;
    Ok(format!("data:{:016x}", xxh3_64(canonical.as_bytes())))
}
