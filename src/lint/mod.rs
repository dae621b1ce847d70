//! Advisory lint for timed branches.
//!
//! The processor silently skips timed branches it cannot use. This lint
//! surfaces those problems up front, using Stillwater's `Validation` type
//! to accumulate ALL findings instead of stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use implicit_timers::builder::SpecBuilder;
//! use implicit_timers::config::ImplicitTimersConfig;
//! use implicit_timers::lint::lint_spec;
//! use serde_json::json;
//!
//! let spec = SpecBuilder::new()
//!     .node("wait", |n| n.on_message(json!({"after": "whenever"}), "done"))
//!     .build()
//!     .unwrap();
//!
//! assert!(lint_spec(&spec, &ImplicitTimersConfig::enabled()).is_failure());
//! ```

pub mod rules;
pub mod violations;

pub use rules::{lint_node, lint_spec};
pub use violations::LintViolation;
