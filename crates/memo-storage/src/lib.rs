//! Memo Storage crate - SQLite persistence and live queries.
//!
//! Provides a WAL-mode SQLite database with migrations, DAOs for the
//! `folders` and `memos` tables, and repository implementations whose list
//! reads stay current by re-running after every committed write.

pub mod db;
pub mod folder_dao;
pub mod live;
pub mod memo_dao;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use folder_dao::FolderDao;
pub use memo_dao::MemoDao;
pub use repository::{SqliteFolderRepository, SqliteMemoRepository};
