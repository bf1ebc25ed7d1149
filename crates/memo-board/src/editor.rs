//! The memo editor's working copy.

use serde::{Deserialize, Serialize};

use memo_core::types::{FolderId, Memo, MemoId, Millis};
use memo_core::validation::{normalize_content, validate_title, ValidationError};

/// Unsaved edits for one memo.
///
/// `id` is `None` while composing a new memo.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoDraft {
    pub id: Option<MemoId>,
    pub title: String,
    pub content: String,
    pub folder_id: Option<FolderId>,
}

impl MemoDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            folder_id: None,
        }
    }

    pub fn in_folder(mut self, folder_id: Option<FolderId>) -> Self {
        self.folder_id = folder_id;
        self
    }

    /// Start editing a stored memo.
    pub fn from_memo(memo: &Memo) -> Self {
        Self {
            id: Some(memo.id),
            title: memo.title.clone(),
            content: memo.content.clone(),
            folder_id: memo.folder_id,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Validate and turn the draft into the row to write.
    ///
    /// `existing` is the stored memo being edited; its `createdAt` survives.
    pub(crate) fn build(&self, existing: Option<&Memo>, now: Millis) -> Result<Memo, ValidationError> {
        let title = validate_title(&self.title)?;
        let content = normalize_content(&self.content);

        Ok(match existing {
            Some(stored) => Memo {
                id: stored.id,
                title,
                content,
                folder_id: self.folder_id,
                created_at: stored.created_at,
                updated_at: now,
            },
            None => Memo::new(title, content, self.folder_id, now),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memo_core::types::UNSAVED_ID;

    #[test]
    fn test_new_memo_stamps_both_times() {
        let memo = MemoDraft::new("  Title ", " body \n")
            .in_folder(Some(3))
            .build(None, 500)
            .unwrap();
        assert_eq!(memo.id, UNSAVED_ID);
        assert_eq!(memo.title, "Title");
        assert_eq!(memo.content, "body");
        assert_eq!(memo.folder_id, Some(3));
        assert_eq!(memo.created_at, 500);
        assert_eq!(memo.updated_at, 500);
    }

    #[test]
    fn test_edit_keeps_created_at() {
        let stored = Memo {
            id: 8,
            title: "old".into(),
            content: "old".into(),
            folder_id: Some(1),
            created_at: 10,
            updated_at: 20,
        };
        let mut draft = MemoDraft::from_memo(&stored);
        assert!(!draft.is_new());
        draft.title = "new".into();
        draft.folder_id = None;

        let memo = draft.build(Some(&stored), 99).unwrap();
        assert_eq!(memo.id, 8);
        assert_eq!(memo.title, "new");
        assert_eq!(memo.folder_id, None);
        assert_eq!(memo.created_at, 10);
        assert_eq!(memo.updated_at, 99);
    }

    #[test]
    fn test_blank_title_rejected() {
        let err = MemoDraft::new("   ", "content").build(None, 1).unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
    }

    #[test]
    fn test_draft_json_shape() {
        let draft = MemoDraft::new("t", "c").in_folder(Some(2));
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["folderId"], 2);
        assert!(json["id"].is_null());
    }
}
