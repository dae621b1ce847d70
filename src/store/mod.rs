//! Timer store contract.
//!
//! Implicit timers never own timer state. They only ask a store to arm and
//! cancel timers by key; persistence and wake-up delivery are the store's
//! concern.

use crate::core::TimerKey;
use async_trait::async_trait;
use chrono::Duration;
use serde_json::Value;
use thiserror::Error;

mod memory;

pub use memory::{FiredTimer, MemoryTimerStore, PendingTimer};

/// Errors a timer store can report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimerStoreError {
    #[error("timer store unavailable: {0}")]
    Unavailable(String),

    #[error("timer '{key}' rejected: {reason}")]
    Rejected { key: String, reason: String },

    #[error("timer store call cancelled")]
    Cancelled,
}

/// Minimal arm/cancel contract of a timer store.
#[async_trait]
pub trait TimerStore: Send + Sync {
    /// Arm a timer that delivers `payload` after `delay`.
    ///
    /// A zero or negative delay is passed through; the store decides whether
    /// to fire immediately or reject.
    async fn add(
        &self,
        key: &TimerKey,
        payload: Value,
        delay: Duration,
    ) -> Result<(), TimerStoreError>;

    /// Cancel the timer for `key`. Removing an absent timer is not an error.
    async fn remove(&self, key: &TimerKey) -> Result<(), TimerStoreError>;
}

#[async_trait]
impl<T: TimerStore + ?Sized> TimerStore for std::sync::Arc<T> {
    async fn add(
        &self,
        key: &TimerKey,
        payload: Value,
        delay: Duration,
    ) -> Result<(), TimerStoreError> {
        (**self).add(key, payload, delay).await
    }

    async fn remove(&self, key: &TimerKey) -> Result<(), TimerStoreError> {
        (**self).remove(key).await
    }
}
