//! Step results produced by the execution engine.
//!
//! A `Walked` is the record of one execution step: the ordered strides the
//! machine took. Strides are read-only here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Binding environment: pattern-variable name to bound value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings(BTreeMap<String, Value>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: &str) -> Option<&Value> {
        self.0.get(var)
    }

    /// Returns the bindings with `var` bound to `value`.
    pub fn bind(mut self, var: impl Into<String>, value: Value) -> Self {
        self.0.insert(var.into(), value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A node visited by a stride, together with the bindings in effect there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRef {
    pub node_name: String,
    #[serde(default)]
    pub bs: Bindings,
}

impl NodeRef {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            bs: Bindings::new(),
        }
    }

    pub fn with_bindings(mut self, bs: Bindings) -> Self {
        self.bs = bs;
        self
    }
}

/// One transition recorded during a step.
///
/// `from` is absent on the initial entry; `to` is absent when the machine
/// halted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NodeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NodeRef>,
}

impl Stride {
    /// A stride moving from one node to another.
    pub fn between(from: NodeRef, to: NodeRef) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// The first stride of a machine: no node was vacated.
    pub fn entering(to: NodeRef) -> Self {
        Self {
            from: None,
            to: Some(to),
        }
    }

    /// The machine halted after leaving `from`.
    pub fn halting(from: NodeRef) -> Self {
        Self {
            from: Some(from),
            to: None,
        }
    }
}

/// Ordered strides from exactly one completed execution step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Walked {
    #[serde(default)]
    pub strides: Vec<Stride>,
}

impl Walked {
    pub fn new(strides: Vec<Stride>) -> Self {
        Self { strides }
    }

    pub fn is_empty(&self) -> bool {
        self.strides.is_empty()
    }
}
