//! Live query handles.
//!
//! A `Subscription` owns the task that keeps its snapshot fresh. Dropping
//! the handle stops the task, so a consumer only has to keep it alive for as
//! long as it wants updates.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{MemoError, Result};

/// A continuously updated snapshot of some query result.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
    task: Option<JoinHandle<()>>,
}

impl<T: Clone> Subscription<T> {
    /// Wrap a receiver fed by `task`.
    pub fn new(rx: watch::Receiver<T>, task: JoinHandle<()>) -> Self {
        Self {
            rx,
            task: Some(task),
        }
    }

    /// A subscription with no refresh task; it never changes.
    pub fn fixed(value: T) -> Self {
        let (_tx, rx) = watch::channel(value);
        Self { rx, task: None }
    }

    /// The latest snapshot.
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot and return it.
    ///
    /// Fails with `SubscriptionClosed` once the producer has stopped.
    pub async fn changed(&mut self) -> Result<T> {
        self.rx
            .changed()
            .await
            .map_err(|_| MemoError::SubscriptionClosed)?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// A second receiver on the same stream, for callers that combine
    /// several subscriptions. The refresh task stays owned by `self`.
    pub fn receiver(&self) -> watch::Receiver<T> {
        self.rx.clone()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_changed_yields_new_value() {
        let (tx, rx) = watch::channel(1);
        let task = tokio::spawn(async move {
            tx.send(2).unwrap();
            // Keep the sender alive until aborted.
            std::future::pending::<()>().await;
        });
        let mut sub = Subscription::new(rx, task);

        assert_eq!(sub.changed().await.unwrap(), 2);
        assert_eq!(sub.current(), 2);
    }

    #[tokio::test]
    async fn test_closed_producer_reports_error() {
        let (tx, rx) = watch::channel(0);
        let task = tokio::spawn(async move {
            drop(tx);
        });
        let mut sub = Subscription::new(rx, task);
        let err = sub.changed().await.unwrap_err();
        assert!(matches!(err, MemoError::SubscriptionClosed));
    }

    #[tokio::test]
    async fn test_drop_aborts_task() {
        let (tx, rx) = watch::channel(0);
        let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let _done = done_tx;
            let _tx = tx;
            std::future::pending::<()>().await;
        });
        drop(Subscription::new(rx, task));

        // The oneshot sender is dropped when the aborted task is torn down.
        assert!(done_rx.await.is_err());
    }

    #[tokio::test]
    async fn test_fixed_subscription() {
        let mut sub = Subscription::fixed(vec![1, 2]);
        assert_eq!(sub.current(), vec![1, 2]);
        assert!(sub.changed().await.is_err());
    }
}
