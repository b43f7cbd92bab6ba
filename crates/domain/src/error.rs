//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`RuleTreeError`] via `#[from]`.

use crate::trigger::NodeId;

/// Top-level error shared by the domain and application layers.
#[derive(Debug, thiserror::Error)]
pub enum RuleTreeError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("trigger tree error")]
    Tree(#[from] TreeError),

    /// Opaque storage failure raised by a repository adapter.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("the root of a rule must be a connector, got {0:?}")]
    RootNotConnector(String),
}

/// A lookup that matched nothing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failures of the trigger tree core: document decoding and structural edits.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TreeError {
    /// A document is missing a required field or cannot be parsed.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// `connectorType` is not one of `AND`, `OR`, `XOR`.
    #[error("unknown connector type {0:?}")]
    UnknownConnectorType(String),

    /// No factory is registered for the document's `type` tag.
    #[error("unknown trigger type {0:?}")]
    UnknownTriggerType(String),

    #[error("index {index} out of range for connector with {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("node {0} does not exist in this tree")]
    UnknownNode(NodeId),

    #[error("node {0} is not a connector")]
    NotAConnector(NodeId),

    /// The root cannot be moved under another node nor discarded.
    #[error("node {0} is the root of the tree")]
    RootNode(NodeId),

    /// Adding `child` under `parent` would make a node its own ancestor.
    #[error("adding node {child} under {parent} would create a cycle")]
    WouldCycle { parent: NodeId, child: NodeId },
}

impl From<serde_json::Error> for TreeError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedDocument(err.to_string())
    }
}
