//! Trigger trees: boolean expressions deciding whether a rule fires.
//!
//! A tree is made of leaf [`Trigger`]s (opaque conditions such as a time
//! window) combined by connectors, each folding its ordered children with a
//! [`ConnectorType`]. All nodes live in a [`TriggerTree`] arena; parents and
//! children refer to each other through [`NodeId`] handles, so the parent
//! back-reference never owns anything.
//!
//! Incremental edits leave redundant nesting behind; [`TriggerTree::simplify`]
//! folds it back into canonical form.

mod connector_type;
mod constant;
mod document;
mod edit;
mod registry;
mod simplify;
mod time_range;
mod tree;

use std::fmt;

pub use connector_type::ConnectorType;
pub use constant::ConstantTrigger;
pub use document::{CONNECTOR_TAG, Document};
pub use registry::{TriggerFactory, TriggerRegistry};
pub use time_range::TimeRangeTrigger;
pub use tree::{Connector, NodeId, NodeKind, TreeObserver, TriggerTree};

use crate::error::TreeError;

/// A leaf condition of a trigger tree.
///
/// Implementations are created empty by a [`TriggerRegistry`] factory and
/// then filled through [`Trigger::load`]. Evaluation must not fail: a leaf
/// that cannot read its input returns a safe default instead.
pub trait Trigger: fmt::Debug + Send + Sync {
    /// Tag stored in the `type` field of the leaf's [`Document`].
    fn type_tag(&self) -> &'static str;

    /// Current truth value of the condition.
    fn evaluate(&self) -> bool;

    /// Human readable description.
    fn describe(&self) -> String;

    /// The `data` payload of the leaf's [`Document`].
    fn to_data(&self) -> serde_json::Value;

    /// Populate the leaf from the `data` payload of its [`Document`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::MalformedDocument`] when the payload does not
    /// describe a valid leaf of this type.
    fn load(&mut self, data: &serde_json::Value) -> Result<(), TreeError>;
}
