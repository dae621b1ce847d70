//! Builder for constructing machine specifications.

use crate::builder::error::BuildError;
use crate::builder::node::NodeBuilder;
use crate::core::{Node, Spec};
use std::collections::HashMap;

/// Builder for constructing specs with a fluent API.
#[derive(Debug, Default)]
pub struct SpecBuilder {
    nodes: Vec<(String, NodeBuilder)>,
}

impl SpecBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, configured by `f`.
    pub fn node<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(NodeBuilder) -> NodeBuilder,
    {
        self.nodes.push((name.into(), f(NodeBuilder::new())));
        self
    }

    /// Build the spec.
    /// Returns an error on empty or duplicate node names, or on a node that
    /// mixes branch kinds.
    pub fn build(self) -> Result<Spec, BuildError> {
        let mut nodes: HashMap<String, Node> = HashMap::with_capacity(self.nodes.len());
        for (name, builder) in self.nodes {
            if name.is_empty() {
                return Err(BuildError::EmptyNodeName);
            }
            if builder.is_mixed() {
                return Err(BuildError::MixedBranchKinds(name));
            }
            if nodes.contains_key(&name) {
                return Err(BuildError::DuplicateNode(name));
            }
            nodes.insert(name, builder.build());
        }
        Ok(Spec { nodes })
    }
}
