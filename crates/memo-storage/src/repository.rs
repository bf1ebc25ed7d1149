//! SQLite-backed implementations of the core repository traits.
//!
//! Writes run on the blocking pool. A caller that stops awaiting a write
//! does not cancel it; the statement still runs to completion.

use std::sync::Arc;

use async_trait::async_trait;

use memo_core::error::{MemoError, Result};
use memo_core::live::Subscription;
use memo_core::repository::{FolderRepository, MemoRepository};
use memo_core::types::{Folder, FolderId, Memo, MemoId};

use crate::db::Database;
use crate::folder_dao::FolderDao;
use crate::memo_dao::MemoDao;

async fn blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| MemoError::Storage(format!("Storage worker failed: {}", e)))?
}

/// Folder repository over a shared [`Database`].
#[derive(Clone, Debug)]
pub struct SqliteFolderRepository {
    dao: FolderDao,
}

impl SqliteFolderRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            dao: FolderDao::new(db),
        }
    }
}

#[async_trait]
impl FolderRepository for SqliteFolderRepository {
    fn all_folders(&self) -> Result<Subscription<Vec<Folder>>> {
        self.dao.watch_all()
    }

    async fn list(&self) -> Result<Vec<Folder>> {
        let dao = self.dao.clone();
        blocking(move || dao.get_all()).await
    }

    async fn get_by_id(&self, id: FolderId) -> Result<Option<Folder>> {
        let dao = self.dao.clone();
        blocking(move || dao.get_by_id(id)).await
    }

    async fn insert(&self, folder: &Folder) -> Result<FolderId> {
        let dao = self.dao.clone();
        let folder = folder.clone();
        blocking(move || dao.insert_or_replace(&folder)).await
    }

    async fn update(&self, folder: &Folder) -> Result<()> {
        let dao = self.dao.clone();
        let folder = folder.clone();
        blocking(move || dao.update(&folder)).await
    }

    async fn delete(&self, folder: &Folder) -> Result<u64> {
        self.delete_by_id(folder.id).await
    }

    async fn delete_by_id(&self, id: FolderId) -> Result<u64> {
        let dao = self.dao.clone();
        blocking(move || dao.delete_by_id(id)).await
    }
}

/// Memo repository over a shared [`Database`].
#[derive(Clone, Debug)]
pub struct SqliteMemoRepository {
    dao: MemoDao,
}

impl SqliteMemoRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            dao: MemoDao::new(db),
        }
    }
}

#[async_trait]
impl MemoRepository for SqliteMemoRepository {
    fn all_memos(&self) -> Result<Subscription<Vec<Memo>>> {
        self.dao.watch_all()
    }

    fn memos_in_folder(&self, folder_id: FolderId) -> Result<Subscription<Vec<Memo>>> {
        self.dao.watch_by_folder(folder_id)
    }

    fn unfiled_memos(&self) -> Result<Subscription<Vec<Memo>>> {
        self.dao.watch_unfiled()
    }

    fn search(&self, query: &str) -> Result<Subscription<Vec<Memo>>> {
        self.dao.watch_search(query)
    }

    async fn list(&self) -> Result<Vec<Memo>> {
        let dao = self.dao.clone();
        blocking(move || dao.get_all()).await
    }

    async fn search_once(&self, query: &str) -> Result<Vec<Memo>> {
        let dao = self.dao.clone();
        let query = query.to_string();
        blocking(move || dao.search(&query)).await
    }

    async fn get_by_id(&self, id: MemoId) -> Result<Option<Memo>> {
        let dao = self.dao.clone();
        blocking(move || dao.get_by_id(id)).await
    }

    async fn insert(&self, memo: &Memo) -> Result<MemoId> {
        let dao = self.dao.clone();
        let memo = memo.clone();
        blocking(move || dao.insert_or_replace(&memo)).await
    }

    async fn update(&self, memo: &Memo) -> Result<()> {
        let dao = self.dao.clone();
        let memo = memo.clone();
        blocking(move || dao.update(&memo)).await
    }

    async fn delete(&self, memo: &Memo) -> Result<()> {
        self.delete_by_id(memo.id).await
    }

    async fn delete_by_id(&self, id: MemoId) -> Result<()> {
        let dao = self.dao.clone();
        blocking(move || dao.delete_by_id(id)).await
    }
}
