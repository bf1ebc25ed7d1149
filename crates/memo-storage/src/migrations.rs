//! Database schema migrations.
//!
//! Applies the initial schema: the folders and memos tables plus the
//! schema_migrations bookkeeping table.

use rusqlite::Connection;
use tracing::info;

use memo_core::error::MemoError;

/// Run all pending database migrations.
///
/// Currently implements the initial schema (version 1). Future migrations
/// can be added by checking the current version and applying incremental changes.
pub fn run_migrations(conn: &Connection) -> Result<(), MemoError> {
    // Create the migrations tracking table first.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| MemoError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| MemoError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: folders and memos.
fn apply_v1(conn: &Connection) -> Result<(), MemoError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS folders (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            createdAt   INTEGER NOT NULL
        );

        -- Deleting a folder removes every memo filed in it.
        CREATE TABLE IF NOT EXISTS memos (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            title       TEXT NOT NULL,
            content     TEXT NOT NULL,
            folderId    INTEGER NULL
                        REFERENCES folders(id) ON DELETE CASCADE,
            createdAt   INTEGER NOT NULL,
            updatedAt   INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_memos_folderId
            ON memos (folderId);

        -- Record migration.
        INSERT OR IGNORE INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| MemoError::Storage(format!("Failed to apply migration v1: {}", e)))?;

    Ok(())
}
