//! Pure core of implicit timers.
//!
//! This module contains everything that can be decided without side effects:
//! - The machine specification and step-result models
//! - Timer identity
//! - Interpretation of `after` values as fire times
//! - Planning which timers to cancel and arm for a step
//!
//! Carrying out a plan against a timer store lives in [`crate::effects`].

mod key;
mod plan;
mod spec;
mod time_expr;
mod walk;

pub use key::TimerKey;
pub use plan::{plan_stride, plan_walk, resolve_after, ArmRequest, TimerAction};
pub use spec::{Branch, BranchKind, Branches, Node, Pattern, Spec, AFTER_FIELD};
pub use time_expr::{
    interpret, interpret_at, parse_duration, TimeExpr, TimeExprError, CLOCK_TIME_FORMAT,
};
pub use walk::{Bindings, NodeRef, Stride, Walked};
