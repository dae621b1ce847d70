//! Build errors for spec and node builders.

use thiserror::Error;

/// Errors that can occur when building specs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("Node name is empty")]
    EmptyNodeName,

    #[error("Node '{0}' defined more than once")]
    DuplicateNode(String),

    #[error("Node '{0}' mixes message and bindings branches")]
    MixedBranchKinds(String),
}
