//! Arena holding the nodes of a trigger tree.

use std::fmt;

use slab::Slab;

use super::{ConnectorType, Trigger};
use crate::error::TreeError;

/// Handle to a node inside a [`TriggerTree`].
///
/// Handles of nodes that were discarded, or merged away by
/// [`TriggerTree::simplify`], are invalid and may later be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(super) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Interior node folding its children with a [`ConnectorType`].
#[derive(Debug, Default)]
pub struct Connector {
    pub(super) connector_type: ConnectorType,
    pub(super) children: Vec<NodeId>,
}

impl Connector {
    #[must_use]
    pub fn connector_type(&self) -> ConnectorType {
        self.connector_type
    }

    /// Children in fold order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// What a node is: an opaque leaf or a connector.
#[derive(Debug)]
pub enum NodeKind {
    Leaf(Box<dyn Trigger>),
    Connector(Connector),
}

#[derive(Debug)]
pub(super) struct Node {
    pub(super) parent: Option<NodeId>,
    pub(super) kind: NodeKind,
}

/// Notified whenever the child list of a connector changes, so a
/// presentation layer can refresh.
pub trait TreeObserver: Send + Sync {
    fn rebuild(&self, connector: NodeId);
}

impl<F> TreeObserver for F
where
    F: Fn(NodeId) + Send + Sync,
{
    fn rebuild(&self, connector: NodeId) {
        self(connector);
    }
}

/// A rooted trigger tree.
///
/// The root is always a connector. Nodes created with
/// [`TriggerTree::new_leaf`] or [`TriggerTree::new_connector`] start
/// detached and join the tree through [`TriggerTree::add`].
pub struct TriggerTree {
    pub(super) nodes: Slab<Node>,
    root: NodeId,
    observer: Option<Box<dyn TreeObserver>>,
}

impl fmt::Debug for TriggerTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerTree")
            .field("root", &self.root)
            .field("nodes", &self.nodes)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl Default for TriggerTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerTree {
    /// Create a tree whose root is an empty AND connector.
    #[must_use]
    pub fn new() -> Self {
        Self::with_type(ConnectorType::default())
    }

    /// Create a tree whose root is an empty connector of the given type.
    #[must_use]
    pub fn with_type(connector_type: ConnectorType) -> Self {
        let mut nodes = Slab::new();
        let root = NodeId(nodes.insert(Node {
            parent: None,
            kind: NodeKind::Connector(Connector {
                connector_type,
                children: Vec::new(),
            }),
        }));
        Self {
            nodes,
            root,
            observer: None,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, detached ones included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id.0)
    }

    /// Install the observer notified on child list changes.
    pub fn set_observer(&mut self, observer: impl TreeObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// Insert a detached leaf.
    pub fn new_leaf(&mut self, trigger: Box<dyn Trigger>) -> NodeId {
        NodeId(self.nodes.insert(Node {
            parent: None,
            kind: NodeKind::Leaf(trigger),
        }))
    }

    /// Insert a detached, empty connector.
    pub fn new_connector(&mut self, connector_type: ConnectorType) -> NodeId {
        NodeId(self.nodes.insert(Node {
            parent: None,
            kind: NodeKind::Connector(Connector {
                connector_type,
                children: Vec::new(),
            }),
        }))
    }

    fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes.get(id.0).ok_or(TreeError::UnknownNode(id))
    }

    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for an invalid handle.
    pub fn kind(&self, id: NodeId) -> Result<&NodeKind, TreeError> {
        self.node(id).map(|node| &node.kind)
    }

    /// The connector owning `id`, `None` for the root and detached nodes.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for an invalid handle.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, TreeError> {
        self.node(id).map(|node| node.parent)
    }

    #[must_use]
    pub fn is_connector(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(id.0),
            Some(Node {
                kind: NodeKind::Connector(_),
                ..
            })
        )
    }

    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for an invalid handle and
    /// [`TreeError::NotAConnector`] when `id` is a leaf.
    pub fn connector(&self, id: NodeId) -> Result<&Connector, TreeError> {
        match &self.node(id)?.kind {
            NodeKind::Connector(connector) => Ok(connector),
            NodeKind::Leaf(_) => Err(TreeError::NotAConnector(id)),
        }
    }

    pub(super) fn connector_mut(&mut self, id: NodeId) -> Result<&mut Connector, TreeError> {
        let node = self.nodes.get_mut(id.0).ok_or(TreeError::UnknownNode(id))?;
        match &mut node.kind {
            NodeKind::Connector(connector) => Ok(connector),
            NodeKind::Leaf(_) => Err(TreeError::NotAConnector(id)),
        }
    }

    /// # Errors
    ///
    /// Fails when `id` is not a connector of this tree.
    pub fn connector_type(&self, id: NodeId) -> Result<ConnectorType, TreeError> {
        self.connector(id).map(Connector::connector_type)
    }

    /// # Errors
    ///
    /// Fails when `id` is not a connector of this tree.
    pub fn set_connector_type(
        &mut self,
        id: NodeId,
        connector_type: ConnectorType,
    ) -> Result<(), TreeError> {
        self.connector_mut(id)?.connector_type = connector_type;
        Ok(())
    }

    /// Number of children of a connector.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not a connector of this tree.
    pub fn size(&self, id: NodeId) -> Result<usize, TreeError> {
        self.connector(id).map(Connector::len)
    }

    /// The `index`-th child of a connector.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::IndexOutOfRange`] when `index >= size`, or fails
    /// when `id` is not a connector of this tree.
    pub fn get(&self, id: NodeId, index: usize) -> Result<NodeId, TreeError> {
        let connector = self.connector(id)?;
        connector
            .children
            .get(index)
            .copied()
            .ok_or(TreeError::IndexOutOfRange {
                index,
                len: connector.len(),
            })
    }

    /// Position of `child` among the children of `parent`, compared by
    /// identity.
    ///
    /// # Errors
    ///
    /// Fails when `parent` is not a connector of this tree.
    pub fn position_of(&self, parent: NodeId, child: NodeId) -> Result<Option<usize>, TreeError> {
        let connector = self.connector(parent)?;
        Ok(connector.children.iter().position(|c| *c == child))
    }

    /// Append `child` to the children of `parent`.
    ///
    /// A child attached elsewhere is moved.
    ///
    /// # Errors
    ///
    /// Fails when either handle is invalid, when `parent` is a leaf, when
    /// `child` is the root ([`TreeError::RootNode`]), or when `child` is
    /// `parent` itself or one of its ancestors ([`TreeError::WouldCycle`]).
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        self.connector(parent)?;
        let previous = self.parent(child)?;
        if child == self.root {
            return Err(TreeError::RootNode(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(TreeError::WouldCycle { parent, child });
        }
        if let Some(previous) = previous {
            self.connector_mut(previous)?.children.retain(|c| *c != child);
            self.notify(previous);
        }
        self.connector_mut(parent)?.children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.notify(parent);
        Ok(())
    }

    /// Detach `child` from `parent`.
    ///
    /// Returns whether `child` was found. The detached node stays alive
    /// with no parent, ready to be added again or discarded.
    ///
    /// # Errors
    ///
    /// Fails when `parent` is not a connector of this tree.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<bool, TreeError> {
        let connector = self.connector_mut(parent)?;
        let Some(index) = connector.children.iter().position(|c| *c == child) else {
            return Ok(false);
        };
        connector.children.remove(index);
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = None;
        }
        self.notify(parent);
        Ok(true)
    }

    /// Free a node and its whole subtree, detaching it first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::RootNode`] for the root and
    /// [`TreeError::UnknownNode`] for an invalid handle.
    pub fn discard(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id == self.root {
            return Err(TreeError::RootNode(id));
        }
        if let Some(parent) = self.parent(id)? {
            self.remove(parent, id)?;
        }
        self.free(id);
        Ok(())
    }

    fn free(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.try_remove(id.0)
            && let NodeKind::Connector(connector) = node.kind
        {
            for child in connector.children {
                self.free(child);
            }
        }
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == candidate {
                return true;
            }
            match self.nodes.get(id.0).and_then(|node| node.parent) {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }

    pub(super) fn notify(&self, connector: NodeId) {
        if let Some(observer) = &self.observer {
            observer.rebuild(connector);
        }
    }

    /// Evaluate the whole tree.
    #[must_use]
    pub fn evaluate(&self) -> bool {
        self.eval(self.root)
    }

    /// Evaluate the subtree rooted at `id`.
    ///
    /// An empty connector is `true`. Otherwise the first child seeds the
    /// result and the others are folded in left to right; every child is
    /// evaluated exactly once, whatever the intermediate result.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for an invalid handle.
    pub fn evaluate_node(&self, id: NodeId) -> Result<bool, TreeError> {
        self.node(id)?;
        Ok(self.eval(id))
    }

    fn eval(&self, id: NodeId) -> bool {
        match &self.nodes[id.0].kind {
            NodeKind::Leaf(trigger) => trigger.evaluate(),
            NodeKind::Connector(connector) => {
                let connector_type = connector.connector_type;
                let mut results = connector.children.iter().map(|child| self.eval(*child));
                match results.next() {
                    Some(first) => results.fold(first, |acc, value| connector_type.apply(acc, value)),
                    None => true,
                }
            }
        }
    }

    /// Describe the whole tree.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.write_description(self.root, &mut out);
        out
    }

    /// Describe the subtree rooted at `id`: children descriptions joined by
    /// the connector label.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownNode`] for an invalid handle.
    pub fn describe_node(&self, id: NodeId) -> Result<String, TreeError> {
        self.node(id)?;
        let mut out = String::new();
        self.write_description(id, &mut out);
        Ok(out)
    }

    fn write_description(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Leaf(trigger) => out.push_str(&trigger.describe()),
            NodeKind::Connector(connector) => {
                for (index, child) in connector.children.iter().enumerate() {
                    if index > 0 {
                        out.push(' ');
                        out.push_str(connector.connector_type.label());
                        out.push(' ');
                    }
                    self.write_description(*child, out);
                }
            }
        }
    }
}
