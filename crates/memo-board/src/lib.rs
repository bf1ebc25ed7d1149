//! Memo Board crate - the list screen's controller and the composition root.
//!
//! [`open`] wires a SQLite database, the repositories, and the system clock
//! into a [`MemoBoard`].

pub mod board;
pub mod editor;

use std::sync::Arc;

use tracing::info;

use memo_core::clock::{Clock, SystemClock};
use memo_core::config::{BoardConfig, MemoConfig};
use memo_core::error::Result;
use memo_storage::{Database, SqliteFolderRepository, SqliteMemoRepository};

pub use board::MemoBoard;
pub use editor::MemoDraft;

/// Open the database named by `config` and build a board over it.
pub fn open(config: &MemoConfig) -> Result<MemoBoard> {
    let path = config.database_path();
    let db = Arc::new(Database::with_config(&path, &config.storage)?);
    info!(path = %path.display(), "Memo board ready");
    Ok(with_database(db, Arc::new(SystemClock), config.board.clone()))
}

/// Build a board over an already opened database.
pub fn with_database(db: Arc<Database>, clock: Arc<dyn Clock>, config: BoardConfig) -> MemoBoard {
    MemoBoard::new(
        Arc::new(SqliteFolderRepository::new(Arc::clone(&db))),
        Arc::new(SqliteMemoRepository::new(db)),
        clock,
        config,
    )
}
