//! Live queries over the change broadcast.
//!
//! Each live query owns a task that listens for committed writes, re-runs
//! its query when a relevant table changed, and pushes the fresh snapshot
//! into a watch channel.

use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::watch;
use tracing::{debug, warn};

use memo_core::error::MemoError;
use memo_core::events::Table;
use memo_core::live::Subscription;

use crate::db::Database;

/// Run `query` now and again after every committed change to `table`.
///
/// Must be called from within a Tokio runtime. The listener is registered
/// before the first snapshot is taken, so no write can slip between them.
pub(crate) fn spawn_live_query<T, F>(
    db: &Arc<Database>,
    table: Table,
    query: F,
) -> Result<Subscription<T>, MemoError>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Result<T, MemoError> + Send + Sync + 'static,
{
    let mut events = db.subscribe();
    let initial = query()?;
    let (tx, rx) = watch::channel(initial);
    let query = Arc::new(query);

    let task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) if !event.affects(table) => continue,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(?table, skipped, "Live query lagged, re-syncing");
                }
                Err(RecvError::Closed) => break,
            }

            // Fold a burst of writes into a single refresh.
            loop {
                match events.try_recv() {
                    Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }

            let query = Arc::clone(&query);
            match tokio::task::spawn_blocking(move || (*query)()).await {
                Ok(Ok(snapshot)) => {
                    if tx.send(snapshot).is_err() {
                        break;
                    }
                }
                Ok(Err(e)) => warn!(?table, error = %e, "Live query refresh failed"),
                Err(e) => {
                    warn!(?table, error = %e, "Live query worker stopped");
                    break;
                }
            }
        }
        debug!(?table, "Live query finished");
    });

    Ok(Subscription::new(rx, task))
}
