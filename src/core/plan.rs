//! Pure planning of timer actions for one execution step.
//!
//! Planning looks at the strides of a step and decides, without touching any
//! timer store, which timers must be cancelled and which armed. The effectful
//! shell in [`crate::effects`] carries the plan out.

use super::key::TimerKey;
use super::spec::{Spec, AFTER_FIELD};
use super::time_expr::{interpret_at, TimeExprError};
use super::walk::{NodeRef, Stride, Walked};
use crate::config::ImplicitTimersConfig;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

/// Request to arm one implicit timer.
#[derive(Clone, Debug, PartialEq)]
pub struct ArmRequest {
    pub key: TimerKey,
    /// `{"after": x}` with `x` already resolved through the bindings.
    pub payload: Value,
    pub fire_at: DateTime<Utc>,
}

impl ArmRequest {
    /// Delay until the fire time as seen from `now`. May be zero or negative.
    pub fn delay_at(&self, now: DateTime<Utc>) -> Duration {
        self.fire_at - now
    }
}

/// A single planned step, in execution order.
#[derive(Clone, Debug, PartialEq)]
pub enum TimerAction {
    /// Cancel whatever timer the vacated node may have.
    Cancel(TimerKey),
    /// Arm a timer for the entered node.
    Arm(ArmRequest),
    /// A timed branch whose `after` could not be interpreted.
    Skip {
        key: TimerKey,
        after: Value,
        error: TimeExprError,
    },
}

impl TimerAction {
    pub fn key(&self) -> &TimerKey {
        match self {
            Self::Cancel(key) | Self::Skip { key, .. } => key,
            Self::Arm(req) => &req.key,
        }
    }
}

/// Plan the timer actions for one step of machine `machine_id`.
///
/// Returns an empty plan when the feature is disabled.
pub fn plan_walk(
    config: &ImplicitTimersConfig,
    machine_id: &str,
    spec: &Spec,
    walked: &Walked,
    now: DateTime<Utc>,
) -> Vec<TimerAction> {
    if !config.enabled {
        return Vec::new();
    }
    walked
        .strides
        .iter()
        .flat_map(|stride| plan_stride(config, machine_id, spec, stride, now))
        .collect()
}

/// Plan one stride: cancel for the vacated node first, then arming for the
/// entered node.
pub fn plan_stride(
    config: &ImplicitTimersConfig,
    machine_id: &str,
    spec: &Spec,
    stride: &Stride,
    now: DateTime<Utc>,
) -> Vec<TimerAction> {
    let mut actions = Vec::new();

    if let (Some(from), Some(_)) = (&stride.from, &stride.to) {
        actions.push(TimerAction::Cancel(TimerKey::new(machine_id, &from.node_name)));
    }

    if let Some(to) = &stride.to {
        plan_entry(config, machine_id, spec, to, now, &mut actions);
    }

    actions
}

fn plan_entry(
    config: &ImplicitTimersConfig,
    machine_id: &str,
    spec: &Spec,
    to: &NodeRef,
    now: DateTime<Utc>,
    actions: &mut Vec<TimerAction>,
) {
    // Most nodes have no timer semantics; absence is not an error.
    let Some(node) = spec.node(&to.node_name) else {
        tracing::trace!(node = %to.node_name, "entered node not in spec");
        return;
    };
    let Some(branches) = node.message_branches() else {
        return;
    };

    let key = TimerKey::new(machine_id, &to.node_name);
    for raw in branches.iter().filter_map(|b| b.after()) {
        let after = resolve_after(config, raw, to);
        match interpret_at(&after, now) {
            Ok(fire_at) => {
                actions.push(TimerAction::Arm(ArmRequest {
                    key,
                    payload: after_payload(after),
                    fire_at,
                }));
                // One implicit timer per node.
                return;
            }
            Err(error) => actions.push(TimerAction::Skip {
                key: key.clone(),
                after,
                error,
            }),
        }
    }
}

/// Resolve a variable reference through the entered node's bindings.
///
/// An unbound variable is passed on unresolved; the interpreter then rejects
/// it like any other unusable string.
pub fn resolve_after(config: &ImplicitTimersConfig, raw: &Value, to: &NodeRef) -> Value {
    match raw {
        Value::String(s) if config.is_variable(s) => {
            to.bs.get(s).cloned().unwrap_or_else(|| raw.clone())
        }
        _ => raw.clone(),
    }
}

fn after_payload(after: Value) -> Value {
    let mut payload = Map::new();
    payload.insert(AFTER_FIELD.to_string(), after);
    Value::Object(payload)
}
