//! Database connection management.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access.
//! Configures WAL mode and recommended PRAGMAs on initialization, and owns
//! the broadcast channel that announces committed writes.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, ErrorCode, Transaction};
use tokio::sync::broadcast;
use tracing::{debug, info};

use memo_core::config::StorageConfig;
use memo_core::error::MemoError;
use memo_core::events::DomainEvent;
use memo_core::types::Millis;

use crate::migrations;

/// Thread-safe SQLite database handle.
///
/// Construct one per process and share it by `Arc`. All writes are
/// serialized by the connection mutex; foreign keys are enforced so that
/// deleting a folder cascades to its memos.
pub struct Database {
    conn: Mutex<Connection>,
    events: broadcast::Sender<DomainEvent>,
}

impl Database {
    /// Open (or create) a database at the given path with default settings.
    pub fn new(path: &Path) -> Result<Self, MemoError> {
        Self::with_config(path, &StorageConfig::default())
    }

    /// Open (or create) a database at the given path.
    ///
    /// Configures WAL mode, synchronous=NORMAL, foreign keys, the busy
    /// timeout, and runs all pending migrations.
    pub fn with_config(path: &Path, config: &StorageConfig) -> Result<Self, MemoError> {
        // Ensure parent directory exists.
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| MemoError::Storage(format!("Failed to open database: {}", e)))?;

        let db = Self::configure(conn, config)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, MemoError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| MemoError::Storage(format!("Failed to open in-memory db: {}", e)))?;
        Self::configure(conn, &StorageConfig::default())
    }

    fn configure(conn: Connection, config: &StorageConfig) -> Result<Self, MemoError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| MemoError::Storage(format!("Failed to set pragmas: {}", e)))?;

        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(|e| MemoError::Storage(format!("Failed to set busy timeout: {}", e)))?;

        migrations::run_migrations(&conn)?;

        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Ok(Self {
            conn: Mutex::new(conn),
            events,
        })
    }

    /// Execute a closure with a reference to the underlying connection.
    ///
    /// This is the primary way to interact with the database. The mutex
    /// is held for the duration of the closure.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, MemoError>
    where
        F: FnOnce(&Connection) -> Result<T, MemoError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| MemoError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Run `f` inside a transaction. Commits if `f` succeeds, rolls back
    /// (on drop) if it fails.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, MemoError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, MemoError>,
    {
        self.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| sqlite_error("Failed to begin transaction", e))?;
            let value = f(&tx)?;
            tx.commit()
                .map_err(|e| sqlite_error("Failed to commit transaction", e))?;
            Ok(value)
        })
    }

    /// Receive every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }

    /// Announce a committed write. Having no listeners is not an error.
    pub fn publish(&self, event: DomainEvent) {
        debug!(event = event.event_name(), "Publishing change");
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("listeners", &self.events.receiver_count())
            .finish()
    }
}

/// Commit timestamp for published events.
pub(crate) fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}

/// Convert a rusqlite error, keeping constraint failures distinguishable.
pub(crate) fn sqlite_error(context: &str, err: rusqlite::Error) -> MemoError {
    if let rusqlite::Error::SqliteFailure(code, message) = &err {
        if code.code == ErrorCode::ConstraintViolation {
            return MemoError::ConstraintViolation(
                message.clone().unwrap_or_else(|| err.to_string()),
            );
        }
    }
    MemoError::Storage(format!("{}: {}", context, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_database() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM memos", [], |row| row.get(0))
                .map_err(|e| MemoError::Storage(e.to_string()))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("memo.db");
        let db = Database::new(&path).unwrap();

        db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM folders", [], |row| row.get(0))
                .map_err(|e| MemoError::Storage(e.to_string()))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let on: i64 = conn
                .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
                .map_err(|e| MemoError::Storage(e.to_string()))?;
            assert_eq!(on, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_wal_mode_enabled() {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| {
            let mode: String = conn
                .query_row("PRAGMA journal_mode", [], |row| row.get(0))
                .map_err(|e| MemoError::Storage(e.to_string()))?;
            // In-memory databases may report "memory" instead of "wal".
            assert!(
                mode == "wal" || mode == "memory",
                "Expected wal or memory, got: {}",
                mode
            );
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let db = Database::in_memory().unwrap();
        let result: Result<(), MemoError> = db.with_transaction(|tx| {
            tx.execute(
                "INSERT INTO folders (name, createdAt) VALUES ('A', 1)",
                [],
            )
            .map_err(|e| sqlite_error("insert", e))?;
            Err(MemoError::Storage("abort".into()))
        });
        assert!(result.is_err());

        let count: i64 = db
            .with_conn(|conn| {
                conn.query_row("SELECT COUNT(*) FROM folders", [], |row| row.get(0))
                    .map_err(|e| MemoError::Storage(e.to_string()))
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_constraint_failures_are_classified() {
        let db = Database::in_memory().unwrap();
        let err = db
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO memos (title, content, folderId, createdAt, updatedAt)
                     VALUES ('t', 'c', 999, 1, 1)",
                    [],
                )
                .map_err(|e| sqlite_error("insert", e))
            })
            .unwrap_err();
        assert!(matches!(err, MemoError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let db = Database::in_memory().unwrap();
        let mut rx = db.subscribe();
        db.publish(DomainEvent::MemoDeleted {
            memo_id: 1,
            timestamp: 5,
        });
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_name(), "memo_deleted");
    }

    #[test]
    fn test_publish_without_listeners_is_fine() {
        let db = Database::in_memory().unwrap();
        db.publish(DomainEvent::FolderCreated {
            folder_id: 1,
            timestamp: 1,
        });
    }
}
