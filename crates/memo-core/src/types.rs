use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// Store-generated folder id. `0` means "not yet persisted".
pub type FolderId = i64;

/// Store-generated memo id. `0` means "not yet persisted".
pub type MemoId = i64;

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// Placeholder id carried by entities that have not been inserted yet.
pub const UNSAVED_ID: i64 = 0;

fn millis_to_datetime(ms: Millis) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

// =============================================================================
// Folder
// =============================================================================

/// A named container for memos.
///
/// Names are not unique; two folders may share a label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub created_at: Millis,
}

impl Folder {
    /// A folder that has not been inserted yet.
    pub fn new(name: impl Into<String>, created_at: Millis) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            created_at,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_ID
    }

    pub fn created_at_utc(&self) -> DateTime<Utc> {
        millis_to_datetime(self.created_at)
    }
}

// =============================================================================
// Memo
// =============================================================================

/// A note, optionally filed in a folder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: MemoId,
    pub title: String,
    pub content: String,
    /// `None` means unfiled.
    pub folder_id: Option<FolderId>,
    pub created_at: Millis,
    pub updated_at: Millis,
}

impl Memo {
    /// A memo that has not been inserted yet. Both timestamps are `now`.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        folder_id: Option<FolderId>,
        now: Millis,
    ) -> Self {
        Self {
            id: UNSAVED_ID,
            title: title.into(),
            content: content.into(),
            folder_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_ID
    }

    pub fn is_unfiled(&self) -> bool {
        self.folder_id.is_none()
    }

    /// Copy of this memo filed under `folder_id`, stamped at `now`.
    pub fn refiled(&self, folder_id: Option<FolderId>, now: Millis) -> Self {
        Self {
            folder_id,
            updated_at: now,
            ..self.clone()
        }
    }

    pub fn updated_at_utc(&self) -> DateTime<Utc> {
        millis_to_datetime(self.updated_at)
    }
}

// =============================================================================
// ListItem
// =============================================================================

/// One row of the assembled, flat display list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListItem {
    /// A folder header. `memos` always holds every memo filed in the
    /// folder, whether or not it is expanded.
    Folder {
        folder: Folder,
        memos: Vec<Memo>,
        is_expanded: bool,
    },
    /// A memo row. `is_child` is true when it sits under an expanded folder.
    Memo { memo: Memo, is_child: bool },
}

/// Identity of a list row, independent of its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKey {
    Folder(FolderId),
    Memo(MemoId),
}

impl ListItem {
    pub fn key(&self) -> ItemKey {
        match self {
            ListItem::Folder { folder, .. } => ItemKey::Folder(folder.id),
            ListItem::Memo { memo, .. } => ItemKey::Memo(memo.id),
        }
    }

    /// True when both rows stand for the same folder or memo.
    pub fn same_item(&self, other: &ListItem) -> bool {
        self.key() == other.key()
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            ListItem::Folder { folder, .. } => Some(folder),
            ListItem::Memo { .. } => None,
        }
    }

    pub fn as_memo(&self) -> Option<&Memo> {
        match self {
            ListItem::Memo { memo, .. } => Some(memo),
            ListItem::Folder { .. } => None,
        }
    }

    /// Only memo rows can be picked up and dragged.
    pub fn is_draggable(&self) -> bool {
        matches!(self, ListItem::Memo { .. })
    }
}
