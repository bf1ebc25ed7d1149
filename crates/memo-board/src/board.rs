//! The memo board: everything the list screen and its dialogs talk to.
//!
//! Holds the expand/collapse state, turns the live folder and memo streams
//! into the assembled display list, and runs the write workflows (editor,
//! folder dialogs, drag-and-drop) with validation in front of the store.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use memo_core::assembly::{assemble, flat_items, ExpandState};
use memo_core::clock::Clock;
use memo_core::config::BoardConfig;
use memo_core::error::{MemoError, Result};
use memo_core::live::Subscription;
use memo_core::moving::{plan_move, DropTarget, MoveOutcome};
use memo_core::repository::{FolderRepository, MemoRepository};
use memo_core::types::{Folder, FolderId, ListItem, Memo, MemoId};
use memo_core::validation::validate_folder_name;

use crate::editor::MemoDraft;

/// Controller for the folder/memo list.
pub struct MemoBoard {
    folders: Arc<dyn FolderRepository>,
    memos: Arc<dyn MemoRepository>,
    clock: Arc<dyn Clock>,
    expanded: watch::Sender<ExpandState>,
    config: BoardConfig,
}

impl MemoBoard {
    pub fn new(
        folders: Arc<dyn FolderRepository>,
        memos: Arc<dyn MemoRepository>,
        clock: Arc<dyn Clock>,
        config: BoardConfig,
    ) -> Self {
        let (expanded, _) = watch::channel(ExpandState::new());
        Self {
            folders,
            memos,
            clock,
            expanded,
            config,
        }
    }

    // =========================================================================
    // Expand / collapse
    // =========================================================================

    /// Flip a folder open or closed. Returns true if it is now expanded.
    pub fn toggle_folder(&self, folder_id: FolderId) -> bool {
        let mut now_expanded = false;
        self.expanded.send_modify(|state| {
            now_expanded = state.toggle(folder_id);
        });
        debug!(folder_id, expanded = now_expanded, "Folder toggled");
        now_expanded
    }

    /// Returns true if the state changed.
    pub fn set_expanded(&self, folder_id: FolderId, expanded: bool) -> bool {
        self.expanded
            .send_if_modified(|state| state.set(folder_id, expanded))
    }

    pub fn collapse_all(&self) {
        self.expanded.send_if_modified(|state| {
            let had_any = !state.is_empty();
            state.collapse_all();
            had_any
        });
    }

    pub fn expand_state(&self) -> ExpandState {
        self.expanded.borrow().clone()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The assembled list as of now.
    pub async fn snapshot(&self) -> Result<Vec<ListItem>> {
        let folders = self.folders.list().await?;
        let memos = self.memos.list().await?;
        Ok(assemble(&folders, &memos, &self.expanded.borrow()))
    }

    /// The assembled list, re-built after every committed write and every
    /// expand/collapse change.
    ///
    /// Must be called from within a Tokio runtime. The stream ends when the
    /// board is dropped.
    pub fn watch_list(&self) -> Result<Subscription<Vec<ListItem>>> {
        let folder_sub = self.folders.all_folders()?;
        let memo_sub = self.memos.all_memos()?;

        let mut folders_rx = folder_sub.receiver();
        let mut memos_rx = memo_sub.receiver();
        let mut expand_rx = self.expanded.subscribe();

        let initial = assemble_latest(&mut folders_rx, &mut memos_rx, &mut expand_rx);
        let (tx, rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            // Upstream refresh tasks live exactly as long as this one.
            let _upstream = (folder_sub, memo_sub);
            loop {
                let open = tokio::select! {
                    r = folders_rx.changed() => r.is_ok(),
                    r = memos_rx.changed() => r.is_ok(),
                    r = expand_rx.changed() => r.is_ok(),
                };
                if !open {
                    break;
                }
                let items = assemble_latest(&mut folders_rx, &mut memos_rx, &mut expand_rx);
                if tx.send(items).is_err() {
                    break;
                }
            }
            debug!("Board list stream finished");
        });

        Ok(Subscription::new(rx, task))
    }

    /// Search results, flat. A blank query lists every memo.
    pub async fn search(&self, query: &str) -> Result<Vec<ListItem>> {
        let memos = if query.trim().is_empty() {
            self.memos.list().await?
        } else {
            self.memos.search_once(query).await?
        };
        Ok(flat_items(&memos))
    }

    /// Live form of [`MemoBoard::search`].
    pub fn watch_search(&self, query: &str) -> Result<Subscription<Vec<ListItem>>> {
        let source = if query.trim().is_empty() {
            self.memos.all_memos()?
        } else {
            self.memos.search(query)?
        };
        Ok(map_live(source, |memos| flat_items(memos)))
    }

    /// "None" followed by every folder, for the editor's folder picker.
    pub async fn folder_choices(&self) -> Result<Vec<Option<Folder>>> {
        let folders = self.folders.list().await?;
        Ok(std::iter::once(None)
            .chain(folders.into_iter().map(Some))
            .collect())
    }

    // =========================================================================
    // Drag and drop
    // =========================================================================

    /// Re-file a memo after a drop. Dropping into its current folder writes
    /// nothing.
    pub async fn move_memo(&self, memo_id: MemoId, target: DropTarget) -> Result<MoveOutcome> {
        let memo = self.require_memo(memo_id).await?;

        let Some(moved) = plan_move(&memo, target, self.clock.now_millis()) else {
            debug!(memo_id, folder_id = ?memo.folder_id, "Drop onto current folder ignored");
            return Ok(MoveOutcome::Unchanged);
        };

        self.memos.update(&moved).await?;
        info!(
            memo_id,
            from = ?memo.folder_id,
            to = ?moved.folder_id,
            "Memo re-filed"
        );
        Ok(MoveOutcome::Moved {
            memo: moved,
            from: memo.folder_id,
        })
    }

    /// Re-file a memo dropped onto `item` (or onto empty space).
    pub async fn move_memo_to_item(
        &self,
        memo_id: MemoId,
        item: Option<&ListItem>,
    ) -> Result<MoveOutcome> {
        self.move_memo(memo_id, DropTarget::from_item(item)).await
    }

    // =========================================================================
    // Folder dialogs
    // =========================================================================

    pub async fn create_folder(&self, name: &str) -> Result<Folder> {
        let name = validate_folder_name(name)?;
        let mut folder = Folder::new(name, self.clock.now_millis());
        folder.id = self.folders.insert(&folder).await?;

        if self.config.expand_new_folders {
            self.set_expanded(folder.id, true);
        }
        Ok(folder)
    }

    pub async fn rename_folder(&self, folder_id: FolderId, name: &str) -> Result<Folder> {
        let name = validate_folder_name(name)?;
        let mut folder = self
            .folders
            .get_by_id(folder_id)
            .await?
            .ok_or(MemoError::NotFound {
                entity: "folder",
                id: folder_id,
            })?;

        folder.name = name;
        self.folders.update(&folder).await?;
        Ok(folder)
    }

    /// Delete a folder together with its memos. Returns how many memos went
    /// with it.
    pub async fn delete_folder(&self, folder_id: FolderId) -> Result<u64> {
        let removed = self.folders.delete_by_id(folder_id).await?;
        self.set_expanded(folder_id, false);
        Ok(removed)
    }

    // =========================================================================
    // Memo editor
    // =========================================================================

    /// Load a stored memo into a draft. Absence is `Ok(None)`.
    pub async fn edit_memo(&self, memo_id: MemoId) -> Result<Option<MemoDraft>> {
        Ok(self
            .memos
            .get_by_id(memo_id)
            .await?
            .map(|memo| MemoDraft::from_memo(&memo)))
    }

    /// Validate and store a draft, returning the saved memo.
    pub async fn save_memo(&self, draft: &MemoDraft) -> Result<Memo> {
        let now = self.clock.now_millis();
        match draft.id {
            Some(id) => {
                let stored = self.require_memo(id).await?;
                let memo = draft.build(Some(&stored), now)?;
                self.memos.update(&memo).await?;
                Ok(memo)
            }
            None => {
                let mut memo = draft.build(None, now)?;
                memo.id = self.memos.insert(&memo).await?;
                Ok(memo)
            }
        }
    }

    pub async fn delete_memo(&self, memo_id: MemoId) -> Result<()> {
        self.memos.delete_by_id(memo_id).await
    }

    async fn require_memo(&self, memo_id: MemoId) -> Result<Memo> {
        self.memos
            .get_by_id(memo_id)
            .await?
            .ok_or(MemoError::NotFound {
                entity: "memo",
                id: memo_id,
            })
    }
}

impl std::fmt::Debug for MemoBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoBoard")
            .field("expanded", &*self.expanded.borrow())
            .field("config", &self.config)
            .finish()
    }
}

fn assemble_latest(
    folders: &mut watch::Receiver<Vec<Folder>>,
    memos: &mut watch::Receiver<Vec<Memo>>,
    expanded: &mut watch::Receiver<ExpandState>,
) -> Vec<ListItem> {
    let folders = folders.borrow_and_update().clone();
    let memos = memos.borrow_and_update().clone();
    let expanded = expanded.borrow_and_update().clone();
    assemble(&folders, &memos, &expanded)
}

/// Derive a subscription by applying `f` to every snapshot of `source`.
fn map_live<T, U, F>(source: Subscription<T>, f: F) -> Subscription<U>
where
    T: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
    F: Fn(&T) -> U + Send + 'static,
{
    let mut source_rx = source.receiver();
    let initial = f(&source_rx.borrow_and_update());
    let (tx, rx) = watch::channel(initial);

    let task = tokio::spawn(async move {
        let _source = source;
        while source_rx.changed().await.is_ok() {
            let next = f(&source_rx.borrow_and_update());
            if tx.send(next).is_err() {
                break;
            }
        }
    });

    Subscription::new(rx, task)
}
