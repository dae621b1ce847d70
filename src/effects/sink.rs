//! Destinations for failures that must not interrupt machine execution.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::core::{TimeExprError, TimerKey};
use crate::store::TimerStoreError;

/// A failure observed while processing a step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImplicitTimerError {
    #[error("timer '{key}': {source}")]
    Interpret {
        key: TimerKey,
        after: Value,
        #[source]
        source: TimeExprError,
    },

    #[error("arming timer '{key}' failed: {source}")]
    Arm {
        key: TimerKey,
        #[source]
        source: TimerStoreError,
    },

    #[error("cancelling timer '{key}' failed: {source}")]
    Cancel {
        key: TimerKey,
        #[source]
        source: TimerStoreError,
    },
}

impl ImplicitTimerError {
    pub fn key(&self) -> &TimerKey {
        match self {
            Self::Interpret { key, .. } | Self::Arm { key, .. } | Self::Cancel { key, .. } => key,
        }
    }
}

/// Receives every failure the processor absorbs.
pub trait ErrorSink: Send + Sync {
    fn report(&self, error: ImplicitTimerError);
}

/// Logs failures as warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, error: ImplicitTimerError) {
        warn!(timer_key = %error.key(), error = %error, "implicit timer failure");
    }
}

/// Keeps failures in memory, for tests and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct CollectingErrorSink {
    errors: Arc<Mutex<Vec<ImplicitTimerError>>>,
}

impl CollectingErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected failures, oldest first.
    pub fn errors(&self) -> Vec<ImplicitTimerError> {
        self.errors
            .lock()
            .map(|errors| errors.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn is_empty(&self) -> bool {
        self.errors().is_empty()
    }
}

impl ErrorSink for CollectingErrorSink {
    fn report(&self, error: ImplicitTimerError) {
        match self.errors.lock() {
            Ok(mut errors) => errors.push(error),
            Err(poisoned) => poisoned.into_inner().push(error),
        }
    }
}

impl<E: ErrorSink + ?Sized> ErrorSink for Arc<E> {
    fn report(&self, error: ImplicitTimerError) {
        (**self).report(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_sink_keeps_order() {
        let sink = CollectingErrorSink::new();
        let a = TimerKey::new("m", "a");
        let b = TimerKey::new("m", "b");

        sink.report(ImplicitTimerError::Cancel {
            key: a.clone(),
            source: TimerStoreError::Cancelled,
        });
        sink.report(ImplicitTimerError::Arm {
            key: b.clone(),
            source: TimerStoreError::Unavailable("down".to_string()),
        });

        let keys: Vec<TimerKey> = sink.errors().iter().map(|e| e.key().clone()).collect();
        assert_eq!(keys, vec![a, b]);
    }

    #[test]
    fn error_messages_name_the_key() {
        let error = ImplicitTimerError::Arm {
            key: TimerKey::new("m", "wait"),
            source: TimerStoreError::Unavailable("down".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "arming timer 'm/wait' failed: timer store unavailable: down"
        );
    }

    #[test]
    fn tracing_sink_accepts_reports() {
        TracingErrorSink.report(ImplicitTimerError::Cancel {
            key: TimerKey::new("m", "x"),
            source: TimerStoreError::Cancelled,
        });
    }
}
