//! Read-only access to the key-press counter table.
//!
//! The capture daemon owns the SQLite database and its writes; this crate
//! opens it read-only and polls the full `key_counts` table once per publish
//! tick. Rows that fail to decode are skipped individually so one bad row
//! never costs a whole batch.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use serde::Serialize;

/// One counter row: a key identifier and its cumulative press count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCount {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to open counter database {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("counter query failed")]
    Query(#[from] rusqlite::Error),
}

/// Source of per-key counts for the publish loop.
///
/// Seam between the loop and the concrete store: the loop only needs "read
/// the full current batch", and tests substitute failing sources to exercise
/// the skip-a-tick policy.
pub trait CountSource: Send + Sync {
    /// Read the full current batch of per-key counts.
    fn fetch_counts(&self) -> Result<Vec<KeyCount>, StoreError>;
}

/// Wait briefly for the capture daemon's write lock instead of erroring.
const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

/// Read-only handle on the capture daemon's counter database.
pub struct CounterStore {
    conn: Mutex<Connection>,
}

impl CounterStore {
    /// Open the counter database read-only.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .and_then(|conn| {
                conn.busy_timeout(BUSY_TIMEOUT)?;
                Ok(conn)
            })
            .map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl CountSource for CounterStore {
    fn fetch_counts(&self) -> Result<Vec<KeyCount>, StoreError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare("SELECT key, count FROM key_counts")?;
        let rows = stmt.query_map([], |row| {
            Ok(KeyCount {
                key: row.get(0)?,
                count: row.get(1)?,
            })
        })?;

        let mut batch = Vec::new();
        for row in rows {
            match row {
                Ok(record) => batch.push(record),
                Err(e) => tracing::debug!(error = %e, "skipping unreadable counter row"),
            }
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a counter database on disk and return its path.
    fn seed_db(dir: &tempfile::TempDir, rows: &[(&str, i64)]) -> PathBuf {
        let path = dir.path().join("key_stats.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE key_counts (key TEXT PRIMARY KEY, count INTEGER)")
            .unwrap();
        for (key, count) in rows {
            conn.execute(
                "INSERT INTO key_counts (key, count) VALUES (?1, ?2)",
                rusqlite::params![key, count],
            )
            .unwrap();
        }
        path
    }

    #[test]
    fn test_fetch_reads_all_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = seed_db(&dir, &[("KeyA", 12), ("Space", 340)]);

        let store = CounterStore::open(&path).unwrap();
        let mut batch = store.fetch_counts().unwrap();
        batch.sort_by(|a, b| a.key.cmp(&b.key));

        assert_eq!(
            batch,
            vec![
                KeyCount { key: "KeyA".into(), count: 12 },
                KeyCount { key: "Space".into(), count: 340 },
            ]
        );
    }

    #[test]
    fn test_fetch_sees_writes_from_other_connections() {
        let dir = tempfile::tempdir().unwrap();
        let path = seed_db(&dir, &[("KeyA", 1)]);
        let store = CounterStore::open(&path).unwrap();
        assert_eq!(store.fetch_counts().unwrap().len(), 1);

        // Another process bumps the table between ticks
        let writer = Connection::open(&path).unwrap();
        writer
            .execute("INSERT INTO key_counts (key, count) VALUES ('KeyB', 2)", [])
            .unwrap();

        assert_eq!(store.fetch_counts().unwrap().len(), 2);
    }

    #[test]
    fn test_undecodable_row_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = seed_db(&dir, &[("KeyA", 5)]);

        // SQLite is dynamically typed, so a stray TEXT count can appear
        let writer = Connection::open(&path).unwrap();
        writer
            .execute("INSERT INTO key_counts (key, count) VALUES ('Bad', 'oops')", [])
            .unwrap();

        let store = CounterStore::open(&path).unwrap();
        let batch = store.fetch_counts().unwrap();
        assert_eq!(batch, vec![KeyCount { key: "KeyA".into(), count: 5 }]);
    }

    #[test]
    fn test_missing_table_is_a_query_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.sqlite");
        Connection::open(&path).unwrap();

        let store = CounterStore::open(&path).unwrap();
        assert!(matches!(store.fetch_counts(), Err(StoreError::Query(_))));
    }

    #[test]
    fn test_open_missing_database_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = CounterStore::open(&dir.path().join("nope.sqlite"));
        assert!(matches!(result, Err(StoreError::Open { .. })));
    }
}
