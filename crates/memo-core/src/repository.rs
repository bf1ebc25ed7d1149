//! Repository interfaces.
//!
//! Upper layers depend on these traits rather than on a concrete store.
//! List reads come in two forms: a live `Subscription` that re-emits after
//! every committed change to the underlying table, and a one-shot snapshot.

use async_trait::async_trait;

use crate::error::Result;
use crate::live::Subscription;
use crate::types::{Folder, FolderId, Memo, MemoId};

#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// Every folder, newest `createdAt` first, kept up to date.
    ///
    /// Must be called from within a Tokio runtime.
    fn all_folders(&self) -> Result<Subscription<Vec<Folder>>>;

    /// Every folder, newest `createdAt` first.
    async fn list(&self) -> Result<Vec<Folder>>;

    async fn get_by_id(&self, id: FolderId) -> Result<Option<Folder>>;

    /// Insert, or fully overwrite the row sharing `folder.id`. Returns the id.
    async fn insert(&self, folder: &Folder) -> Result<FolderId>;

    /// Overwrite an existing folder. `NotFound` if no row has its id.
    async fn update(&self, folder: &Folder) -> Result<()>;

    /// Delete a folder and, atomically, every memo filed in it.
    /// Returns the number of memos removed with it.
    async fn delete(&self, folder: &Folder) -> Result<u64>;

    async fn delete_by_id(&self, id: FolderId) -> Result<u64>;
}

#[async_trait]
pub trait MemoRepository: Send + Sync {
    /// Every memo, newest `updatedAt` first, kept up to date.
    ///
    /// Must be called from within a Tokio runtime.
    fn all_memos(&self) -> Result<Subscription<Vec<Memo>>>;

    /// Memos filed in `folder_id`, kept up to date.
    fn memos_in_folder(&self, folder_id: FolderId) -> Result<Subscription<Vec<Memo>>>;

    /// Memos without a folder, kept up to date.
    fn unfiled_memos(&self) -> Result<Subscription<Vec<Memo>>>;

    /// Memos whose title or content contains `query`, kept up to date.
    /// An empty query matches everything.
    fn search(&self, query: &str) -> Result<Subscription<Vec<Memo>>>;

    /// Every memo, newest `updatedAt` first.
    async fn list(&self) -> Result<Vec<Memo>>;

    /// One-shot form of [`MemoRepository::search`].
    async fn search_once(&self, query: &str) -> Result<Vec<Memo>>;

    async fn get_by_id(&self, id: MemoId) -> Result<Option<Memo>>;

    /// Insert, or fully overwrite the row sharing `memo.id`. Returns the id.
    async fn insert(&self, memo: &Memo) -> Result<MemoId>;

    /// Overwrite an existing memo. `NotFound` if no row has its id,
    /// `ConstraintViolation` if its folder does not exist.
    async fn update(&self, memo: &Memo) -> Result<()>;

    async fn delete(&self, memo: &Memo) -> Result<()>;

    async fn delete_by_id(&self, id: MemoId) -> Result<()>;
}
