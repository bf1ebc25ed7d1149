//! Typed SQL access to the `folders` table.

use std::sync::Arc;

use rusqlite::{params, OptionalExtension};
use tracing::info;

use memo_core::error::MemoError;
use memo_core::events::{DomainEvent, Table};
use memo_core::live::Subscription;
use memo_core::types::{Folder, FolderId, UNSAVED_ID};

use crate::db::{now_millis, sqlite_error, Database};
use crate::live::spawn_live_query;

const SELECT_FOLDERS: &str = "SELECT id, name, createdAt FROM folders";

/// Data access for folders. Cheap to clone.
#[derive(Clone, Debug)]
pub struct FolderDao {
    db: Arc<Database>,
}

impl FolderDao {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All folders, newest first.
    pub fn get_all(&self) -> Result<Vec<Folder>, MemoError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&format!(
                    "{} ORDER BY createdAt DESC, id DESC",
                    SELECT_FOLDERS
                ))
                .map_err(|e| sqlite_error("Failed to prepare folder query", e))?;

            let rows = stmt
                .query_map([], row_to_folder)
                .map_err(|e| sqlite_error("Failed to query folders", e))?;

            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| sqlite_error("Failed to read folder row", e))
        })
    }

    /// Live form of [`FolderDao::get_all`].
    pub fn watch_all(&self) -> Result<Subscription<Vec<Folder>>, MemoError> {
        let dao = self.clone();
        spawn_live_query(&self.db, Table::Folders, move || dao.get_all())
    }

    /// Find a folder by ID. Absence is `Ok(None)`.
    pub fn get_by_id(&self, id: FolderId) -> Result<Option<Folder>, MemoError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("{} WHERE id = ?1", SELECT_FOLDERS),
                params![id],
                row_to_folder,
            )
            .optional()
            .map_err(|e| sqlite_error("Failed to load folder", e))
        })
    }

    /// Insert a folder, or overwrite every column of the row sharing its id.
    ///
    /// An unsaved folder (id 0) gets a fresh id from the store. Replacing is
    /// an upsert rather than `INSERT OR REPLACE`, so the folder's memos are
    /// not cascaded away by the implicit delete.
    pub fn insert_or_replace(&self, folder: &Folder) -> Result<FolderId, MemoError> {
        let requested = (folder.id != UNSAVED_ID).then_some(folder.id);

        let id = self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO folders (id, name, createdAt) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     createdAt = excluded.createdAt",
                params![requested, folder.name, folder.created_at],
            )
            .map_err(|e| sqlite_error("Failed to save folder", e))?;
            Ok(requested.unwrap_or_else(|| conn.last_insert_rowid()))
        })?;

        info!(folder_id = id, "Folder saved");
        self.db.publish(DomainEvent::FolderCreated {
            folder_id: id,
            timestamp: now_millis(),
        });
        Ok(id)
    }

    /// Overwrite an existing folder.
    pub fn update(&self, folder: &Folder) -> Result<(), MemoError> {
        let changed = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE folders SET name = ?2, createdAt = ?3 WHERE id = ?1",
                params![folder.id, folder.name, folder.created_at],
            )
            .map_err(|e| sqlite_error("Failed to update folder", e))
        })?;

        if changed == 0 {
            return Err(MemoError::NotFound {
                entity: "folder",
                id: folder.id,
            });
        }

        self.db.publish(DomainEvent::FolderUpdated {
            folder_id: folder.id,
            timestamp: now_millis(),
        });
        Ok(())
    }

    pub fn delete(&self, folder: &Folder) -> Result<u64, MemoError> {
        self.delete_by_id(folder.id)
    }

    /// Delete a folder and every memo filed in it, in one transaction.
    ///
    /// Returns the number of memos removed. Deleting a missing folder is a
    /// no-op returning 0.
    pub fn delete_by_id(&self, id: FolderId) -> Result<u64, MemoError> {
        let deleted = self.db.with_transaction(|tx| {
            let cascaded: i64 = tx
                .query_row(
                    "SELECT COUNT(*) FROM memos WHERE folderId = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .map_err(|e| sqlite_error("Failed to count folder memos", e))?;

            let removed = tx
                .execute("DELETE FROM folders WHERE id = ?1", params![id])
                .map_err(|e| sqlite_error("Failed to delete folder", e))?;

            Ok((removed > 0).then_some(cascaded as u64))
        })?;

        let Some(cascaded_memos) = deleted else {
            return Ok(0);
        };

        info!(folder_id = id, cascaded_memos, "Folder deleted");
        self.db.publish(DomainEvent::FolderDeleted {
            folder_id: id,
            cascaded_memos,
            timestamp: now_millis(),
        });
        Ok(cascaded_memos)
    }

    /// Count folders.
    pub fn count(&self) -> Result<u64, MemoError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM folders", [], |row| row.get(0))
                .map_err(|e| sqlite_error("Failed to count folders", e))?;
            Ok(count as u64)
        })
    }
}

fn row_to_folder(row: &rusqlite::Row<'_>) -> rusqlite::Result<Folder> {
    Ok(Folder {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}
