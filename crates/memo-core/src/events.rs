use serde::{Deserialize, Serialize};

use crate::types::{FolderId, MemoId, Millis};

/// Tables whose contents a live query depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Folders,
    Memos,
}

/// Committed changes to the store.
///
/// Published after every successful write and consumed by:
/// - Live queries (to re-run and emit a fresh snapshot)
/// - Logging
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DomainEvent {
    // =========================================================================
    // Folder Events
    // =========================================================================
    /// A folder row was inserted or fully replaced.
    FolderCreated { folder_id: FolderId, timestamp: Millis },

    /// A folder row was overwritten by `update`.
    FolderUpdated { folder_id: FolderId, timestamp: Millis },

    /// A folder and every memo filed in it were removed together.
    FolderDeleted {
        folder_id: FolderId,
        cascaded_memos: u64,
        timestamp: Millis,
    },

    // =========================================================================
    // Memo Events
    // =========================================================================
    /// A memo row was inserted or fully replaced.
    MemoCreated {
        memo_id: MemoId,
        folder_id: Option<FolderId>,
        timestamp: Millis,
    },

    /// A memo was overwritten without changing its folder.
    MemoUpdated { memo_id: MemoId, timestamp: Millis },

    /// A memo was overwritten and now sits in a different folder.
    MemoMoved {
        memo_id: MemoId,
        from: Option<FolderId>,
        to: Option<FolderId>,
        timestamp: Millis,
    },

    /// A memo was removed.
    MemoDeleted { memo_id: MemoId, timestamp: Millis },
}

impl DomainEvent {
    /// Returns the time the change was committed.
    pub fn timestamp(&self) -> Millis {
        match self {
            DomainEvent::FolderCreated { timestamp, .. }
            | DomainEvent::FolderUpdated { timestamp, .. }
            | DomainEvent::FolderDeleted { timestamp, .. }
            | DomainEvent::MemoCreated { timestamp, .. }
            | DomainEvent::MemoUpdated { timestamp, .. }
            | DomainEvent::MemoMoved { timestamp, .. }
            | DomainEvent::MemoDeleted { timestamp, .. } => *timestamp,
        }
    }

    /// Returns a human-readable event name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            DomainEvent::FolderCreated { .. } => "folder_created",
            DomainEvent::FolderUpdated { .. } => "folder_updated",
            DomainEvent::FolderDeleted { .. } => "folder_deleted",
            DomainEvent::MemoCreated { .. } => "memo_created",
            DomainEvent::MemoUpdated { .. } => "memo_updated",
            DomainEvent::MemoMoved { .. } => "memo_moved",
            DomainEvent::MemoDeleted { .. } => "memo_deleted",
        }
    }

    /// Tables whose contents changed with this event.
    ///
    /// Deleting a folder also removes its memos, so it touches both.
    pub fn tables(&self) -> &'static [Table] {
        match self {
            DomainEvent::FolderCreated { .. } | DomainEvent::FolderUpdated { .. } => {
                &[Table::Folders]
            }
            DomainEvent::FolderDeleted { .. } => &[Table::Folders, Table::Memos],
            DomainEvent::MemoCreated { .. }
            | DomainEvent::MemoUpdated { .. }
            | DomainEvent::MemoMoved { .. }
            | DomainEvent::MemoDeleted { .. } => &[Table::Memos],
        }
    }

    pub fn affects(&self, table: Table) -> bool {
        self.tables().contains(&table)
    }
}
