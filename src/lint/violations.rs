//! Lint findings.

use crate::core::TimeExprError;
use serde_json::Value;
use thiserror::Error;

/// A timer-related problem found in a spec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LintViolation {
    #[error("node '{node}' branch {branch}: \"after\" {after} will never arm a timer: {source}")]
    UninterpretableAfter {
        node: String,
        branch: usize,
        after: Value,
        #[source]
        source: TimeExprError,
    },

    #[error("node '{node}' has {count} timed branches; only the first is armed")]
    MultipleTimedBranches { node: String, count: usize },

    #[error("node '{node}' branch {branch}: \"after\" is ignored outside message branches")]
    IgnoredAfter { node: String, branch: usize },
}

impl LintViolation {
    /// Node the finding is about.
    pub fn node(&self) -> &str {
        match self {
            Self::UninterpretableAfter { node, .. }
            | Self::MultipleTimedBranches { node, .. }
            | Self::IgnoredAfter { node, .. } => node,
        }
    }
}
