//! One-shot result channels.
//!
//! Each store operation runs as a spawned task that sends exactly one
//! result and closes. There is no cancellation: dropping a
//! [`StoreChannel`] discards the result but the task still runs to
//! completion.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use poststore_core::{StoreError, StoreResult};
use tokio::sync::oneshot;

/// Pending result of a dispatched store operation
#[derive(Debug)]
#[must_use = "a StoreChannel does nothing useful unless awaited"]
pub struct StoreChannel<T> {
    op: &'static str,
    rx: oneshot::Receiver<StoreResult<T>>,
}

impl<T: Send + 'static> StoreChannel<T> {
    /// Spawn `work` on the tokio runtime and return its result channel.
    pub fn spawn<F>(op: &'static str, work: F) -> Self
    where
        F: Future<Output = StoreResult<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            // Receiver may already be gone; the work still completed.
            let _ = tx.send(work.await);
        });
        Self { op, rx }
    }
}

impl<T> StoreChannel<T> {
    /// Name of the operation this channel reports for
    pub fn op(&self) -> &'static str {
        self.op
    }
}

impl<T> Future for StoreChannel<T> {
    type Output = StoreResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let op = this.op;
        Pin::new(&mut this.rx).poll(cx).map(|received| match received {
            Ok(result) => result,
            // Task died before sending (panicked or runtime shut down)
            Err(err) => Err(StoreError::storage(op, "dispatch", err)),
        })
    }
}
