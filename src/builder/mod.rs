//! Builder API for ergonomic spec construction.
//!
//! Specs usually arrive as JSON from the execution engine; these builders
//! cover specs assembled in code.

pub mod error;
pub mod node;
pub mod spec;

pub use error::BuildError;
pub use node::NodeBuilder;
pub use spec::SpecBuilder;

use crate::core::Node;
use serde_json::{json, Value};

/// Create a node with a single timed message branch.
///
/// # Example
///
/// ```
/// use implicit_timers::builder::timed_node;
/// use serde_json::json;
///
/// let node = timed_node(json!("30s"), "expired");
/// let branch = &node.message_branches().unwrap()[0];
/// assert_eq!(branch.after(), Some(&json!("30s")));
/// ```
pub fn timed_node(after: Value, target: impl Into<String>) -> Node {
    NodeBuilder::new()
        .on_message(json!({ "after": after }), target)
        .build()
}
