//! Machine specification model.
//!
//! A `Spec` is the immutable description of a machine: a set of named nodes,
//! each optionally carrying the branches that decide where the machine goes
//! next. Only the parts relevant to implicit timers are modeled here; the
//! execution engine owns everything else.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Name of the pattern field that marks a branch as timed.
pub const AFTER_FIELD: &str = "after";

/// Immutable machine specification with nodes addressable by name.
///
/// # Example
///
/// ```rust
/// use implicit_timers::core::Spec;
///
/// let spec: Spec = serde_json::from_str(r#"{
///     "nodes": {
///         "waiting": {
///             "branches": {
///                 "type": "message",
///                 "branches": [{ "pattern": { "after": 30 }, "target": "expired" }]
///             }
///         },
///         "expired": {}
///     }
/// }"#).unwrap();
///
/// assert!(spec.node("waiting").is_some());
/// assert!(spec.node("missing").is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    #[serde(default)]
    pub nodes: HashMap<String, Node>,
}

impl Spec {
    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }
}

/// A state definition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Branches>,
}

impl Node {
    /// Branches of this node, but only when they are matched against messages.
    pub fn message_branches(&self) -> Option<&[Branch]> {
        self.branches
            .as_ref()
            .filter(|b| b.kind.is_message())
            .map(|b| b.branches.as_slice())
    }
}

/// What the branches of a node are matched against.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    /// Matched against incoming messages.
    Message,
    /// Matched against the current bindings.
    #[default]
    Bindings,
    /// Any kind this crate does not interpret.
    #[serde(other)]
    Other,
}

impl BranchKind {
    pub fn is_message(&self) -> bool {
        matches!(self, Self::Message)
    }
}

/// Ordered branches of a node, tagged with their kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Branches {
    #[serde(rename = "type", default)]
    pub kind: BranchKind,
    #[serde(default)]
    pub branches: Vec<Branch>,
}

/// A single branch: an optional pattern and the node it leads to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Branch {
    /// Raw `after` value of this branch's pattern, if it has one.
    pub fn after(&self) -> Option<&Value> {
        self.pattern.as_ref().and_then(Pattern::after_field)
    }
}

/// Structural template matched against incoming messages.
///
/// Patterns are arbitrary JSON. Timer inference only understands patterns
/// that are objects; every other shape is ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(pub Value);

impl Pattern {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Value of the `after` field when the pattern is a field/value mapping
    /// that has one. Any other pattern shape yields `None`.
    pub fn after_field(&self) -> Option<&Value> {
        self.0.as_object().and_then(|m| m.get(AFTER_FIELD))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Pattern {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn after_field_found_in_object_pattern() {
        let pattern = Pattern::new(json!({"after": "5s", "to": "me"}));
        assert_eq!(pattern.after_field(), Some(&json!("5s")));
    }

    #[test]
    fn after_field_ignores_non_object_patterns() {
        assert_eq!(Pattern::new(json!("after")).after_field(), None);
        assert_eq!(Pattern::new(json!(["after", 3])).after_field(), None);
        assert_eq!(Pattern::new(json!(null)).after_field(), None);
        assert_eq!(Pattern::new(json!({"before": 3})).after_field(), None);
    }

    #[test]
    fn branch_kind_defaults_to_bindings() {
        let branches: Branches = serde_json::from_value(json!({"branches": []})).unwrap();
        assert_eq!(branches.kind, BranchKind::Bindings);
    }

    #[test]
    fn unknown_branch_kind_deserializes_as_other() {
        let branches: Branches =
            serde_json::from_value(json!({"type": "timer", "branches": []})).unwrap();
        assert_eq!(branches.kind, BranchKind::Other);
    }

    #[test]
    fn message_branches_only_for_message_kind() {
        let message: Node = serde_json::from_value(json!({
            "branches": {"type": "message", "branches": [{"pattern": {"after": 1}}]}
        }))
        .unwrap();
        let bindings: Node = serde_json::from_value(json!({
            "branches": {"type": "bindings", "branches": [{"pattern": {"after": 1}}]}
        }))
        .unwrap();

        assert_eq!(message.message_branches().map(<[Branch]>::len), Some(1));
        assert!(bindings.message_branches().is_none());
        assert!(Node::default().message_branches().is_none());
    }

    #[test]
    fn spec_roundtrips_through_json() {
        let spec: Spec = serde_json::from_value(json!({
            "nodes": {
                "start": {"branches": {"type": "message", "branches": [
                    {"pattern": {"after": "?d"}, "target": "done"}
                ]}},
                "done": {}
            }
        }))
        .unwrap();

        let json = serde_json::to_string(&spec).unwrap();
        let back: Spec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
        assert_eq!(
            back.node("start")
                .and_then(|n| n.message_branches())
                .and_then(|b| b.first())
                .and_then(Branch::after),
            Some(&json!("?d"))
        );
    }
}
