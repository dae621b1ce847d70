//! Executes timer plans against a timer store.

use chrono::Utc;
use tracing::debug;

use super::cancel::CancelSignal;
use super::sink::{ErrorSink, ImplicitTimerError, TracingErrorSink};
use crate::config::ImplicitTimersConfig;
use crate::core::{plan_walk, Spec, TimerAction, Walked};
use crate::store::TimerStore;

/// Creates and cancels timers implied by the branches of the nodes a machine
/// moves through.
///
/// Entering a node whose message branches include a pattern with an `after`
/// field arms a timer keyed `<machine id>/<node>`; when the timer fires, the
/// store delivers `{"after": x}`, which matches that branch. Leaving a node
/// cancels its timer, whether or not it already fired.
///
/// Failures are reported to the [`ErrorSink`] and never returned: a bad
/// `after` value or a flaky store must not abort the machine step.
pub struct ImplicitTimers<T, E = TracingErrorSink> {
    config: ImplicitTimersConfig,
    store: T,
    sink: E,
}

impl<T: TimerStore> ImplicitTimers<T> {
    /// Processor reporting failures through `tracing`.
    pub fn new(config: ImplicitTimersConfig, store: T) -> Self {
        Self::with_sink(config, store, TracingErrorSink)
    }
}

impl<T: TimerStore, E: ErrorSink> ImplicitTimers<T, E> {
    pub fn with_sink(config: ImplicitTimersConfig, store: T, sink: E) -> Self {
        Self {
            config,
            store,
            sink,
        }
    }

    pub fn config(&self) -> &ImplicitTimersConfig {
        &self.config
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    /// Process the strides of one step of machine `machine_id`.
    pub async fn consider_walked(&self, machine_id: &str, spec: &Spec, walked: &Walked) {
        self.consider_walked_until(&CancelSignal::never(), machine_id, spec, walked)
            .await;
    }

    /// Like [`consider_walked`](Self::consider_walked), but store calls abort
    /// once `cancel` is raised. Each aborted call is reported like any other
    /// store failure.
    pub async fn consider_walked_until(
        &self,
        cancel: &CancelSignal,
        machine_id: &str,
        spec: &Spec,
        walked: &Walked,
    ) {
        if !self.config.enabled {
            return;
        }

        for action in plan_walk(&self.config, machine_id, spec, walked, Utc::now()) {
            self.execute(cancel, action).await;
        }
    }

    async fn execute(&self, cancel: &CancelSignal, action: TimerAction) {
        match action {
            TimerAction::Cancel(key) => {
                debug!(timer_key = %key, "cancelling implicit timer");
                if let Err(source) = cancel.guard(self.store.remove(&key)).await {
                    self.sink.report(ImplicitTimerError::Cancel { key, source });
                }
            }
            TimerAction::Arm(req) => {
                // Measured at arm time so absolute fire times stay exact.
                let delay = req.delay_at(Utc::now());
                debug!(
                    timer_key = %req.key,
                    delay_ms = delay.num_milliseconds(),
                    "arming implicit timer"
                );
                if let Err(source) = cancel
                    .guard(self.store.add(&req.key, req.payload, delay))
                    .await
                {
                    self.sink.report(ImplicitTimerError::Arm {
                        key: req.key,
                        source,
                    });
                }
            }
            TimerAction::Skip { key, after, error } => {
                self.sink.report(ImplicitTimerError::Interpret {
                    key,
                    after,
                    source: error,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SpecBuilder;
    use crate::core::{NodeRef, Stride, TimerKey};
    use crate::effects::cancel::CancelHandle;
    use crate::effects::sink::CollectingErrorSink;
    use crate::store::{MemoryTimerStore, TimerStoreError};
    use serde_json::json;

    fn spec() -> Spec {
        SpecBuilder::new()
            .node("idle", |n| n.on_message(json!({"go": true}), "waiting"))
            .node("waiting", |n| {
                n.on_message(json!({"after": "5m"}), "idle")
                    .on_message(json!({"done": true}), "idle")
            })
            .build()
            .unwrap()
    }

    fn processor() -> ImplicitTimers<MemoryTimerStore, CollectingErrorSink> {
        ImplicitTimers::with_sink(
            ImplicitTimersConfig::enabled(),
            MemoryTimerStore::new(),
            CollectingErrorSink::new(),
        )
    }

    fn step(from: &str, to: &str) -> Walked {
        Walked::new(vec![Stride::between(NodeRef::new(from), NodeRef::new(to))])
    }

    #[tokio::test]
    async fn entering_timed_node_arms_and_leaving_cancels() {
        let timers = processor();
        let key = TimerKey::new("m1", "waiting");

        timers.consider_walked("m1", &spec(), &step("idle", "waiting")).await;
        let pending = timers.store().get(&key).await.unwrap();
        assert_eq!(pending.payload, json!({"after": "5m"}));

        timers.consider_walked("m1", &spec(), &step("waiting", "idle")).await;
        assert!(timers.store().is_empty().await);
        assert!(timers.sink().is_empty());
    }

    #[tokio::test]
    async fn instances_do_not_share_timers() {
        let timers = processor();
        timers.consider_walked("m1", &spec(), &step("idle", "waiting")).await;
        timers.consider_walked("m2", &spec(), &step("idle", "waiting")).await;
        timers.consider_walked("m1", &spec(), &step("waiting", "idle")).await;

        let pending = timers.store().pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].key, TimerKey::new("m2", "waiting"));
    }

    #[tokio::test]
    async fn cancel_failure_is_reported_and_processing_continues() {
        let timers = processor();
        timers
            .store()
            .fail_next_remove(TimerStoreError::Unavailable("flaky".to_string()))
            .await;

        timers.consider_walked("m1", &spec(), &step("idle", "waiting")).await;

        assert_eq!(timers.store().len().await, 1);
        assert_eq!(
            timers.sink().errors(),
            vec![ImplicitTimerError::Cancel {
                key: TimerKey::new("m1", "idle"),
                source: TimerStoreError::Unavailable("flaky".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn arm_failure_is_reported() {
        let timers = processor();
        timers
            .store()
            .fail_next_add(TimerStoreError::Rejected {
                key: "m1/waiting".to_string(),
                reason: "full".to_string(),
            })
            .await;

        timers.consider_walked("m1", &spec(), &step("idle", "waiting")).await;

        assert!(timers.store().is_empty().await);
        let errors = timers.sink().errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ImplicitTimerError::Arm { .. }));
    }

    #[tokio::test]
    async fn cancelled_signal_reports_every_store_call() {
        let timers = processor();
        let (handle, signal) = CancelHandle::new();
        handle.cancel();

        timers
            .consider_walked_until(&signal, "m1", &spec(), &step("idle", "waiting"))
            .await;

        assert!(timers.store().is_empty().await);
        let errors = timers.sink().errors();
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors[0],
            ImplicitTimerError::Cancel {
                source: TimerStoreError::Cancelled,
                ..
            }
        ));
        assert!(matches!(
            errors[1],
            ImplicitTimerError::Arm {
                source: TimerStoreError::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn disabled_processor_touches_nothing() {
        let timers = ImplicitTimers::with_sink(
            ImplicitTimersConfig::default(),
            MemoryTimerStore::new(),
            CollectingErrorSink::new(),
        );
        timers
            .store()
            .fail_next_remove(TimerStoreError::Cancelled)
            .await;

        timers.consider_walked("m1", &spec(), &step("idle", "waiting")).await;

        assert!(timers.store().is_empty().await);
        assert!(timers.sink().is_empty());
    }
}
