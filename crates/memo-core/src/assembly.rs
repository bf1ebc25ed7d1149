//! List assembly: folders and memos merged into one flat display sequence.
//!
//! Output order:
//! 1. Each folder, newest `createdAt` first, followed directly by its memos
//!    (newest `updatedAt` first) when the folder is expanded.
//! 2. Every unfiled memo, newest `updatedAt` first.
//!
//! A memo whose `folderId` names a folder missing from the input is an
//! orphan. It appears neither under a folder nor in the unfiled tail.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Folder, FolderId, ListItem, Memo};

/// The set of folders currently shown open. Never persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpandState {
    expanded: HashSet<FolderId>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, folder_id: FolderId) -> bool {
        self.expanded.contains(&folder_id)
    }

    /// Flip a folder's state. Returns true if it is now expanded.
    pub fn toggle(&mut self, folder_id: FolderId) -> bool {
        if self.expanded.remove(&folder_id) {
            false
        } else {
            self.expanded.insert(folder_id);
            true
        }
    }

    /// Returns true if the state changed.
    pub fn set(&mut self, folder_id: FolderId, expanded: bool) -> bool {
        if expanded {
            self.expanded.insert(folder_id)
        } else {
            self.expanded.remove(&folder_id)
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Forget folders that no longer exist.
    pub fn retain_existing(&mut self, folders: &[Folder]) {
        let live: HashSet<FolderId> = folders.iter().map(|f| f.id).collect();
        self.expanded.retain(|id| live.contains(id));
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

impl FromIterator<FolderId> for ExpandState {
    fn from_iter<I: IntoIterator<Item = FolderId>>(iter: I) -> Self {
        Self {
            expanded: iter.into_iter().collect(),
        }
    }
}

/// Merge `folders` and `memos` into the display list.
///
/// Inputs need not be pre-sorted; the ordering rules are applied here with a
/// stable sort so ties keep the order the store returned.
pub fn assemble(folders: &[Folder], memos: &[Memo], expanded: &ExpandState) -> Vec<ListItem> {
    let mut folders: Vec<&Folder> = folders.iter().collect();
    folders.sort_by_key(|f| Reverse(f.created_at));

    let mut memos: Vec<&Memo> = memos.iter().collect();
    memos.sort_by_key(|m| Reverse(m.updated_at));

    let mut by_folder: HashMap<FolderId, Vec<Memo>> = HashMap::with_capacity(folders.len());
    let mut unfiled: Vec<&Memo> = Vec::new();
    for memo in &memos {
        match memo.folder_id {
            Some(folder_id) => by_folder.entry(folder_id).or_default().push((*memo).clone()),
            None => unfiled.push(memo),
        }
    }

    let mut items = Vec::with_capacity(folders.len() + memos.len());
    for folder in folders {
        let children = by_folder.remove(&folder.id).unwrap_or_default();
        let is_expanded = expanded.is_expanded(folder.id);

        let child_rows: Vec<ListItem> = if is_expanded {
            children
                .iter()
                .map(|memo| ListItem::Memo {
                    memo: memo.clone(),
                    is_child: true,
                })
                .collect()
        } else {
            Vec::new()
        };

        items.push(ListItem::Folder {
            folder: folder.clone(),
            memos: children,
            is_expanded,
        });
        items.extend(child_rows);
    }

    // Whatever is left in the map points at folders we were not given.
    if !by_folder.is_empty() {
        let orphans: usize = by_folder.values().map(Vec::len).sum();
        debug!(
            orphans,
            missing_folders = by_folder.len(),
            "Omitting memos filed under unknown folders"
        );
    }

    items.extend(unfiled.into_iter().map(|memo| ListItem::Memo {
        memo: memo.clone(),
        is_child: false,
    }));

    items
}

/// Search results and other flat listings: every memo top-level, no folders.
pub fn flat_items(memos: &[Memo]) -> Vec<ListItem> {
    memos
        .iter()
        .map(|memo| ListItem::Memo {
            memo: memo.clone(),
            is_child: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemKey;

    fn folder(id: FolderId, created_at: i64) -> Folder {
        Folder {
            id,
            name: format!("Folder {}", id),
            created_at,
        }
    }

    fn memo(id: i64, folder_id: Option<FolderId>, updated_at: i64) -> Memo {
        Memo {
            id,
            title: format!("Memo {}", id),
            content: String::new(),
            folder_id,
            created_at: 0,
            updated_at,
        }
    }

    fn keys(items: &[ListItem]) -> Vec<ItemKey> {
        items.iter().map(ListItem::key).collect()
    }

    #[test]
    fn test_expanded_and_collapsed_folders() {
        let f1 = folder(1, 200);
        let f2 = folder(2, 100);
        let m1 = memo(1, Some(1), 50);
        let m2 = memo(2, Some(1), 40);
        let m3 = memo(3, Some(2), 30);
        let m4 = memo(4, None, 20);

        let expanded: ExpandState = [1].into_iter().collect();
        let items = assemble(
            &[f1.clone(), f2.clone()],
            &[m1.clone(), m2.clone(), m3.clone(), m4.clone()],
            &expanded,
        );

        assert_eq!(
            items,
            vec![
                ListItem::Folder {
                    folder: f1,
                    memos: vec![m1.clone(), m2.clone()],
                    is_expanded: true,
                },
                ListItem::Memo {
                    memo: m1,
                    is_child: true,
                },
                ListItem::Memo {
                    memo: m2,
                    is_child: true,
                },
                ListItem::Folder {
                    folder: f2,
                    memos: vec![m3],
                    is_expanded: false,
                },
                ListItem::Memo {
                    memo: m4,
                    is_child: false,
                },
            ]
        );
    }

    #[test]
    fn test_ordering_applied_to_unsorted_input() {
        let folders = vec![folder(1, 10), folder(2, 30), folder(3, 20)];
        let memos = vec![
            memo(10, Some(2), 1),
            memo(11, Some(2), 3),
            memo(12, None, 5),
            memo(13, None, 9),
        ];
        let expanded: ExpandState = [2].into_iter().collect();

        let items = assemble(&folders, &memos, &expanded);
        assert_eq!(
            keys(&items),
            vec![
                ItemKey::Folder(2),
                ItemKey::Memo(11),
                ItemKey::Memo(10),
                ItemKey::Folder(3),
                ItemKey::Folder(1),
                ItemKey::Memo(13),
                ItemKey::Memo(12),
            ]
        );
    }

    #[test]
    fn test_empty_folder_still_listed() {
        let items = assemble(&[folder(1, 1)], &[], &ExpandState::new());
        assert_eq!(
            items,
            vec![ListItem::Folder {
                folder: folder(1, 1),
                memos: vec![],
                is_expanded: false,
            }]
        );

        let expanded: ExpandState = [1].into_iter().collect();
        let items = assemble(&[folder(1, 1)], &[], &expanded);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_orphan_memo_is_omitted_everywhere() {
        let items = assemble(
            &[folder(1, 1)],
            &[memo(1, Some(99), 5), memo(2, None, 4)],
            &[1, 99].into_iter().collect(),
        );
        assert_eq!(keys(&items), vec![ItemKey::Folder(1), ItemKey::Memo(2)]);
        match &items[0] {
            ListItem::Folder { memos, .. } => assert!(memos.is_empty()),
            other => panic!("expected folder, got {:?}", other),
        }
    }

    #[test]
    fn test_memo_never_listed_twice() {
        let folders = vec![folder(1, 2), folder(2, 1)];
        let memos = vec![memo(1, Some(1), 1), memo(2, Some(2), 2), memo(3, None, 3)];
        let expanded: ExpandState = [1, 2].into_iter().collect();

        let items = assemble(&folders, &memos, &expanded);
        let memo_rows: Vec<_> = items.iter().filter_map(ListItem::as_memo).collect();
        assert_eq!(memo_rows.len(), 3);
    }

    #[test]
    fn test_collapsed_folder_keeps_children_in_header() {
        let items = assemble(
            &[folder(1, 1)],
            &[memo(1, Some(1), 2), memo(2, Some(1), 1)],
            &ExpandState::new(),
        );
        assert_eq!(items.len(), 1);
        match &items[0] {
            ListItem::Folder {
                memos, is_expanded, ..
            } => {
                assert!(!is_expanded);
                assert_eq!(memos.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 2]);
            }
            other => panic!("expected folder, got {:?}", other),
        }
    }

    #[test]
    fn test_no_folders_lists_unfiled_only() {
        let items = assemble(&[], &[memo(1, None, 1), memo(2, None, 2)], &ExpandState::new());
        assert_eq!(keys(&items), vec![ItemKey::Memo(2), ItemKey::Memo(1)]);
        assert!(assemble(&[], &[], &ExpandState::new()).is_empty());
    }

    #[test]
    fn test_flat_items_never_nested() {
        let items = flat_items(&[memo(1, Some(1), 1), memo(2, None, 2)]);
        assert_eq!(items.len(), 2);
        assert!(items
            .iter()
            .all(|item| matches!(item, ListItem::Memo { is_child: false, .. })));
        assert_eq!(keys(&items), vec![ItemKey::Memo(1), ItemKey::Memo(2)]);
    }

    #[test]
    fn test_expand_state_toggle_and_set() {
        let mut state = ExpandState::new();
        assert!(state.toggle(3));
        assert!(state.is_expanded(3));
        assert!(!state.toggle(3));
        assert!(!state.is_expanded(3));

        assert!(state.set(4, true));
        assert!(!state.set(4, true));
        assert!(state.set(4, false));
        assert!(state.is_empty());
    }

    #[test]
    fn test_expand_state_retain_existing() {
        let mut state: ExpandState = [1, 2, 3].into_iter().collect();
        state.retain_existing(&[folder(2, 0)]);
        assert_eq!(state.len(), 1);
        assert!(state.is_expanded(2));

        state.collapse_all();
        assert!(state.is_empty());
    }
}
