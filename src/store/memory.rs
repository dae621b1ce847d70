//! In-process timer store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::{TimerStore, TimerStoreError};
use crate::core::TimerKey;

/// A timer waiting to fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTimer {
    pub key: TimerKey,
    pub fire_at: DateTime<Utc>,
    pub payload: Value,
}

/// A timer that came due.
///
/// `message` is the armed payload. Delivered to the machine named by
/// `key.machine_id()`, it matches the timed branch that armed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredTimer {
    pub key: TimerKey,
    pub fire_at: DateTime<Utc>,
    pub message: Value,
}

#[derive(Debug, Default)]
struct Faults {
    next_add: Option<TimerStoreError>,
    next_remove: Option<TimerStoreError>,
}

/// Timer store kept in memory, one pending timer per key.
///
/// Arming a key that is already pending replaces the earlier timer. Nothing
/// survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryTimerStore {
    timers: Arc<RwLock<HashMap<TimerKey, PendingTimer>>>,
    faults: Arc<RwLock<Faults>>,
}

impl MemoryTimerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer firing at an explicit instant.
    pub async fn add_at(&self, key: &TimerKey, payload: Value, fire_at: DateTime<Utc>) {
        let timer = PendingTimer {
            key: key.clone(),
            fire_at,
            payload,
        };
        self.timers.write().await.insert(key.clone(), timer);
    }

    /// Remove and return every timer due at `now`, earliest first.
    pub async fn poll_due(&self, now: DateTime<Utc>) -> Vec<FiredTimer> {
        let mut timers = self.timers.write().await;
        let due_keys: Vec<TimerKey> = timers
            .values()
            .filter(|t| t.fire_at <= now)
            .map(|t| t.key.clone())
            .collect();

        let mut fired: Vec<FiredTimer> = due_keys
            .iter()
            .filter_map(|key| timers.remove(key))
            .map(|t| FiredTimer {
                key: t.key,
                fire_at: t.fire_at,
                message: t.payload,
            })
            .collect();
        fired.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then_with(|| a.key.cmp(&b.key)));
        fired
    }

    /// Pending timers, earliest first.
    pub async fn pending(&self) -> Vec<PendingTimer> {
        let mut pending: Vec<PendingTimer> = self.timers.read().await.values().cloned().collect();
        pending.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then_with(|| a.key.cmp(&b.key)));
        pending
    }

    /// The pending timer for `key`, if any.
    pub async fn get(&self, key: &TimerKey) -> Option<PendingTimer> {
        self.timers.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.timers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.timers.read().await.is_empty()
    }

    /// Make the next `add` fail with `error`.
    pub async fn fail_next_add(&self, error: TimerStoreError) {
        self.faults.write().await.next_add = Some(error);
    }

    /// Make the next `remove` fail with `error`.
    pub async fn fail_next_remove(&self, error: TimerStoreError) {
        self.faults.write().await.next_remove = Some(error);
    }
}

#[async_trait]
impl TimerStore for MemoryTimerStore {
    async fn add(
        &self,
        key: &TimerKey,
        payload: Value,
        delay: Duration,
    ) -> Result<(), TimerStoreError> {
        if let Some(error) = self.faults.write().await.next_add.take() {
            return Err(error);
        }
        let now = Utc::now();
        let fire_at = now.checked_add_signed(delay).ok_or_else(|| TimerStoreError::Rejected {
            key: key.to_string(),
            reason: format!("delay {delay} out of range"),
        })?;
        debug!(timer_key = %key, fire_at = %fire_at, "timer armed");
        self.add_at(key, payload, fire_at).await;
        Ok(())
    }

    async fn remove(&self, key: &TimerKey) -> Result<(), TimerStoreError> {
        if let Some(error) = self.faults.write().await.next_remove.take() {
            return Err(error);
        }
        if self.timers.write().await.remove(key).is_some() {
            debug!(timer_key = %key, "timer removed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn add_replaces_pending_timer_for_same_key() {
        let store = MemoryTimerStore::new();
        let key = TimerKey::new("m", "wait");

        store.add(&key, json!({"after": 10}), Duration::seconds(10)).await.unwrap();
        store.add(&key, json!({"after": 20}), Duration::seconds(20)).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(&key).await.unwrap().payload, json!({"after": 20}));
    }

    #[tokio::test]
    async fn removing_absent_timer_is_ok() {
        let store = MemoryTimerStore::new();
        assert!(store.remove(&TimerKey::new("m", "none")).await.is_ok());
    }

    #[tokio::test]
    async fn poll_due_returns_due_timers_in_order() {
        let store = MemoryTimerStore::new();
        let now = Utc::now();
        let late = TimerKey::new("m", "late");
        let early = TimerKey::new("m", "early");
        let future = TimerKey::new("m", "future");

        store.add_at(&late, json!({"after": 2}), now - Duration::seconds(1)).await;
        store.add_at(&early, json!({"after": 1}), now - Duration::seconds(2)).await;
        store.add_at(&future, json!({"after": 60}), now + Duration::seconds(60)).await;

        let fired = store.poll_due(now).await;
        let keys: Vec<&TimerKey> = fired.iter().map(|f| &f.key).collect();
        assert_eq!(keys, vec![&early, &late]);
        assert_eq!(fired[0].message, json!({"after": 1}));

        let pending = store.pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].key, future);
    }

    #[tokio::test]
    async fn negative_delay_is_due_immediately() {
        let store = MemoryTimerStore::new();
        let key = TimerKey::new("m", "past");
        store.add(&key, json!({"after": -5}), Duration::seconds(-5)).await.unwrap();
        assert_eq!(store.poll_due(Utc::now()).await.len(), 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn injected_faults_fire_once() {
        let store = MemoryTimerStore::new();
        let key = TimerKey::new("m", "x");
        store
            .fail_next_add(TimerStoreError::Unavailable("down".to_string()))
            .await;

        let first = store.add(&key, json!({}), Duration::seconds(1)).await;
        assert_eq!(first, Err(TimerStoreError::Unavailable("down".to_string())));
        assert!(store.add(&key, json!({}), Duration::seconds(1)).await.is_ok());

        store.fail_next_remove(TimerStoreError::Cancelled).await;
        assert_eq!(store.remove(&key).await, Err(TimerStoreError::Cancelled));
        assert!(store.remove(&key).await.is_ok());
        assert!(store.is_empty().await);
    }
}
