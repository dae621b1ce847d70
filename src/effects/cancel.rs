//! Cancellation of in-flight timer store calls.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use crate::store::TimerStoreError;

/// Owner side of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Create a handle and the signal it controls.
    pub fn new() -> (Self, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx: Arc::new(tx) }, CancelSignal { rx: Some(rx) })
    }

    /// Cancel every call waiting on a signal of this handle.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Signal observed by store calls; once raised, calls abort with
/// [`TimerStoreError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once the signal is raised. Never resolves if the handle was
    /// dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(mut rx) = self.rx.clone() else {
            return std::future::pending().await;
        };
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }

    /// Run a store call unless cancellation wins first.
    pub async fn guard<T, F>(&self, call: F) -> Result<T, TimerStoreError>
    where
        F: Future<Output = Result<T, TimerStoreError>>,
    {
        if self.is_cancelled() {
            return Err(TimerStoreError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(TimerStoreError::Cancelled),
            result = call => result,
        }
    }
}
