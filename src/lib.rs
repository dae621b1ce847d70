//! Implicit timers for message-driven state machines.
//!
//! Timers are inferred from the shape of a machine's transition graph rather
//! than scheduled by machine logic. When a machine enters a node whose message
//! branches include a pattern with an `after` field, a timer is armed; when
//! the machine leaves that node, the timer is cancelled. A fired timer
//! delivers `{"after": x}`, an ordinary message that matches the timed branch.
//!
//! The design follows a "pure core, imperative shell" split:
//!
//! - **core**: specs, step results, `after` interpretation and pure planning
//! - **effects**: the processor that carries plans out against a store
//! - **store**: the timer store contract and an in-memory store
//! - **lint**: advisory checks over the timed branches of a spec
//!
//! # Example
//!
//! ```rust
//! use implicit_timers::builder::SpecBuilder;
//! use implicit_timers::config::ImplicitTimersConfig;
//! use implicit_timers::core::{NodeRef, Stride, TimerKey, Walked};
//! use implicit_timers::effects::ImplicitTimers;
//! use implicit_timers::store::MemoryTimerStore;
//! use serde_json::json;
//!
//! # tokio_test_block(async {
//! let spec = SpecBuilder::new()
//!     .node("idle", |n| n.on_message(json!({"start": true}), "waiting"))
//!     .node("waiting", |n| n.on_message(json!({"after": "30s"}), "idle"))
//!     .build()
//!     .unwrap();
//!
//! let timers = ImplicitTimers::new(ImplicitTimersConfig::enabled(), MemoryTimerStore::new());
//! let step = Walked::new(vec![Stride::between(NodeRef::new("idle"), NodeRef::new("waiting"))]);
//! timers.consider_walked("machine-1", &spec, &step).await;
//!
//! let pending = timers.store().get(&TimerKey::new("machine-1", "waiting")).await;
//! assert_eq!(pending.unwrap().payload, json!({"after": "30s"}));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod effects;
pub mod lint;
pub mod store;

// Re-export commonly used types
pub use config::ImplicitTimersConfig;
pub use core::{interpret, Spec, Stride, TimeExpr, TimerKey, Walked};
pub use effects::{ErrorSink, ImplicitTimers};
pub use store::{MemoryTimerStore, TimerStore};
