//! Typed SQL access to the `memos` table.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension, ToSql};
use tracing::{debug, info};

use memo_core::error::MemoError;
use memo_core::events::{DomainEvent, Table};
use memo_core::live::Subscription;
use memo_core::types::{FolderId, Memo, MemoId, UNSAVED_ID};

use crate::db::{now_millis, sqlite_error, Database};
use crate::live::spawn_live_query;

const SELECT_MEMOS: &str =
    "SELECT id, title, content, folderId, createdAt, updatedAt FROM memos";

const NEWEST_FIRST: &str = "ORDER BY updatedAt DESC, id DESC";

/// Data access for memos. Cheap to clone.
#[derive(Clone, Debug)]
pub struct MemoDao {
    db: Arc<Database>,
}

impl MemoDao {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn query_memos(&self, filter: &str, args: &[&dyn ToSql]) -> Result<Vec<Memo>, MemoError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!("{} {} {}", SELECT_MEMOS, filter, NEWEST_FIRST))
                .map_err(|e| sqlite_error("Failed to prepare memo query", e))?;

            let rows = stmt
                .query_map(args, row_to_memo)
                .map_err(|e| sqlite_error("Failed to query memos", e))?;

            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| sqlite_error("Failed to read memo row", e))
        })
    }

    /// All memos, most recently updated first.
    pub fn get_all(&self) -> Result<Vec<Memo>, MemoError> {
        self.query_memos("", &[])
    }

    /// Memos filed in `folder_id`, most recently updated first.
    pub fn get_by_folder(&self, folder_id: FolderId) -> Result<Vec<Memo>, MemoError> {
        self.query_memos("WHERE folderId = ?1", &[&folder_id])
    }

    /// Memos without a folder, most recently updated first.
    pub fn get_unfiled(&self) -> Result<Vec<Memo>, MemoError> {
        self.query_memos("WHERE folderId IS NULL", &[])
    }

    /// Memos whose title or content contains `query` as a literal substring.
    ///
    /// Uses SQLite's default `LIKE` comparison (ASCII case-insensitive). An
    /// empty query matches every memo.
    pub fn search(&self, query: &str) -> Result<Vec<Memo>, MemoError> {
        let pattern = escape_like(query);
        self.query_memos(
            "WHERE title LIKE '%' || ?1 || '%' ESCAPE '\\'
                OR content LIKE '%' || ?1 || '%' ESCAPE '\\'",
            &[&pattern],
        )
    }

    pub fn watch_all(&self) -> Result<Subscription<Vec<Memo>>, MemoError> {
        let dao = self.clone();
        spawn_live_query(&self.db, Table::Memos, move || dao.get_all())
    }

    pub fn watch_by_folder(
        &self,
        folder_id: FolderId,
    ) -> Result<Subscription<Vec<Memo>>, MemoError> {
        let dao = self.clone();
        spawn_live_query(&self.db, Table::Memos, move || dao.get_by_folder(folder_id))
    }

    pub fn watch_unfiled(&self) -> Result<Subscription<Vec<Memo>>, MemoError> {
        let dao = self.clone();
        spawn_live_query(&self.db, Table::Memos, move || dao.get_unfiled())
    }

    pub fn watch_search(&self, query: &str) -> Result<Subscription<Vec<Memo>>, MemoError> {
        let dao = self.clone();
        let query = query.to_string();
        spawn_live_query(&self.db, Table::Memos, move || dao.search(&query))
    }

    /// Find a memo by ID. Absence is `Ok(None)`.
    pub fn get_by_id(&self, id: MemoId) -> Result<Option<Memo>, MemoError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("{} WHERE id = ?1", SELECT_MEMOS),
                params![id],
                row_to_memo,
            )
            .optional()
            .map_err(|e| sqlite_error("Failed to load memo", e))
        })
    }

    /// Insert a memo, or overwrite every column of the row sharing its id.
    ///
    /// Fails with `ConstraintViolation` if `folder_id` names no folder.
    pub fn insert_or_replace(&self, memo: &Memo) -> Result<MemoId, MemoError> {
        let requested = (memo.id != UNSAVED_ID).then_some(memo.id);

        let id = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO memos (id, title, content, folderId, createdAt, updatedAt)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                     title = excluded.title,
                     content = excluded.content,
                     folderId = excluded.folderId,
                     createdAt = excluded.createdAt,
                     updatedAt = excluded.updatedAt",
                params![
                    requested,
                    memo.title,
                    memo.content,
                    memo.folder_id,
                    memo.created_at,
                    memo.updated_at,
                ],
            )
            .map_err(|e| sqlite_error("Failed to save memo", e))?;
            Ok(requested.unwrap_or_else(|| conn.last_insert_rowid()))
        })?;

        info!(memo_id = id, folder_id = ?memo.folder_id, "Memo saved");
        self.db.publish(DomainEvent::MemoCreated {
            memo_id: id,
            folder_id: memo.folder_id,
            timestamp: now_millis(),
        });
        Ok(id)
    }

    /// Overwrite an existing memo.
    ///
    /// `NotFound` if no row has its id; `ConstraintViolation` (and no change)
    /// if its folder does not exist.
    pub fn update(&self, memo: &Memo) -> Result<(), MemoError> {
        let previous_folder = self.db.with_conn(|conn| {
            let previous: Option<Option<FolderId>> = conn
                .query_row(
                    "SELECT folderId FROM memos WHERE id = ?1",
                    params![memo.id],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| sqlite_error("Failed to load memo", e))?;

            let Some(previous) = previous else {
                return Err(MemoError::NotFound {
                    entity: "memo",
                    id: memo.id,
                });
            };

            conn.execute(
                "UPDATE memos
                 SET title = ?2, content = ?3, folderId = ?4, createdAt = ?5, updatedAt = ?6
                 WHERE id = ?1",
                params![
                    memo.id,
                    memo.title,
                    memo.content,
                    memo.folder_id,
                    memo.created_at,
                    memo.updated_at,
                ],
            )
            .map_err(|e| sqlite_error("Failed to update memo", e))?;

            Ok(previous)
        })?;

        let timestamp = now_millis();
        let event = if previous_folder != memo.folder_id {
            info!(
                memo_id = memo.id,
                from = ?previous_folder,
                to = ?memo.folder_id,
                "Memo moved"
            );
            DomainEvent::MemoMoved {
                memo_id: memo.id,
                from: previous_folder,
                to: memo.folder_id,
                timestamp,
            }
        } else {
            debug!(memo_id = memo.id, "Memo updated");
            DomainEvent::MemoUpdated {
                memo_id: memo.id,
                timestamp,
            }
        };
        self.db.publish(event);
        Ok(())
    }

    pub fn delete(&self, memo: &Memo) -> Result<(), MemoError> {
        self.delete_by_id(memo.id)
    }

    /// Delete a memo. Deleting a missing memo is a no-op.
    pub fn delete_by_id(&self, id: MemoId) -> Result<(), MemoError> {
        let removed = self.db.with_conn(|conn| {
            conn.execute("DELETE FROM memos WHERE id = ?1", params![id])
                .map_err(|e| sqlite_error("Failed to delete memo", e))
        })?;

        if removed > 0 {
            info!(memo_id = id, "Memo deleted");
            self.db.publish(DomainEvent::MemoDeleted {
                memo_id: id,
                timestamp: now_millis(),
            });
        }
        Ok(())
    }

    /// Count memos.
    pub fn count(&self) -> Result<u64, MemoError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM memos", [], |row| row.get(0))
                .map_err(|e| sqlite_error("Failed to count memos", e))?;
            Ok(count as u64)
        })
    }
}

/// Escape `LIKE` wildcards so the query matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for ch in query.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn row_to_memo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Memo> {
    Ok(Memo {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        folder_id: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
