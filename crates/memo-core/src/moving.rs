//! Drag-and-drop re-filing of memos.

use serde::{Deserialize, Serialize};

use crate::types::{FolderId, ListItem, Memo, Millis};

/// Where a dragged memo was released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropTarget {
    /// Onto a folder header.
    Folder(FolderId),
    /// Onto another memo row; the memo's folder (possibly none) is inherited.
    Memo { folder_id: Option<FolderId> },
    /// Onto empty space: the memo becomes unfiled.
    Nothing,
}

impl DropTarget {
    /// Derive the target from the list row under the pointer, if any.
    pub fn from_item(item: Option<&ListItem>) -> Self {
        match item {
            Some(ListItem::Folder { folder, .. }) => DropTarget::Folder(folder.id),
            Some(ListItem::Memo { memo, .. }) => DropTarget::Memo {
                folder_id: memo.folder_id,
            },
            None => DropTarget::Nothing,
        }
    }

    /// The folder id the memo ends up in.
    pub fn folder_id(&self) -> Option<FolderId> {
        match *self {
            DropTarget::Folder(id) => Some(id),
            DropTarget::Memo { folder_id } => folder_id,
            DropTarget::Nothing => None,
        }
    }
}

/// Result of a move request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The memo was written with a new folder and fresh `updatedAt`.
    Moved {
        memo: Memo,
        from: Option<FolderId>,
    },
    /// The target equals the current folder; nothing was written.
    Unchanged,
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// Compute the memo to write for a drop, or `None` when the drop lands in
/// the folder the memo already belongs to.
pub fn plan_move(memo: &Memo, target: DropTarget, now: Millis) -> Option<Memo> {
    let to = target.folder_id();
    if memo.folder_id == to {
        return None;
    }
    Some(memo.refiled(to, now))
}
