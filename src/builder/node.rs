//! Builder for constructing nodes.

use crate::core::{Branch, BranchKind, Branches, Node, Pattern};
use serde_json::Value;

/// Builder for a single node with a fluent API.
///
/// All branches of a node share one kind; the first branch added decides it.
#[derive(Debug, Default)]
pub struct NodeBuilder {
    kind: Option<BranchKind>,
    branches: Vec<Branch>,
    mixed: bool,
}

impl NodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch matched against incoming messages.
    pub fn on_message(self, pattern: Value, target: impl Into<String>) -> Self {
        self.branch(BranchKind::Message, Some(pattern), target)
    }

    /// Add a branch matched against the current bindings.
    pub fn on_bindings(self, pattern: Value, target: impl Into<String>) -> Self {
        self.branch(BranchKind::Bindings, Some(pattern), target)
    }

    /// Add an unconditional branch of the node's current kind.
    pub fn otherwise(self, target: impl Into<String>) -> Self {
        let kind = self.kind.clone().unwrap_or_default();
        self.branch(kind, None, target)
    }

    fn branch(mut self, kind: BranchKind, pattern: Option<Value>, target: impl Into<String>) -> Self {
        match &self.kind {
            Some(existing) if *existing != kind => self.mixed = true,
            Some(_) => {}
            None => self.kind = Some(kind),
        }
        self.branches.push(Branch {
            pattern: pattern.map(Pattern::new),
            target: Some(target.into()),
        });
        self
    }

    pub(crate) fn is_mixed(&self) -> bool {
        self.mixed
    }

    /// Build the node. A node without branches has no branch specification.
    pub fn build(self) -> Node {
        let branches = self.kind.map(|kind| Branches {
            kind,
            branches: self.branches,
        });
        Node { branches }
    }
}
