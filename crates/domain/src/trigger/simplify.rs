//! Structural canonicalization of trigger trees.
//!
//! Editing a tree one node at a time leaves wrappers behind: connectors with
//! a single child, or connectors nested under a parent using the same
//! operator. Both are folded away here. Leaves are never reordered and no
//! boolean identity beyond associativity is applied.

use super::ConnectorType;
use super::tree::{NodeId, NodeKind, TriggerTree};
use crate::error::TreeError;

/// A connector merges into its parent when it holds a single child or uses
/// the parent's operator. An empty connector evaluates to `true`, which is
/// only neutral under AND, so it merges into an AND parent alone.
fn mergeable(child_type: ConnectorType, child_len: usize, parent_type: ConnectorType) -> bool {
    child_len == 1
        || (child_type == parent_type && (child_len > 0 || parent_type == ConnectorType::And))
}

impl TriggerTree {
    /// Rewrite the subtree at `id` into canonical form.
    ///
    /// Returns the node now standing for this position. When `id` merges
    /// into its parent the parent is simplified in turn, so the returned
    /// node may be an ancestor of `id` and `id` itself becomes invalid.
    ///
    /// After this call, within the returned subtree:
    /// - no connector has a connector as its only child,
    /// - no non-root connector holds a single child,
    /// - no connector shares its operator with its parent, except an empty
    ///   OR or XOR.
    ///
    /// Empty connectors evaluate to `true` regardless of their operator. An
    /// empty AND under an AND parent is dropped; other empty connectors are
    /// left in place so the result always evaluates like the input.
    ///
    /// # Errors
    ///
    /// Fails when `id` is not a connector of this tree.
    pub fn simplify(&mut self, id: NodeId) -> Result<NodeId, TreeError> {
        self.connector(id)?;
        self.canonicalize(id);

        let Some(parent) = self.nodes[id.0].parent else {
            return Ok(id);
        };
        let connector = self.connector(id)?;
        let parent_type = self.connector_type(parent)?;
        if mergeable(connector.connector_type, connector.len(), parent_type) {
            tracing::debug!(node = %id, into = %parent, "merging connector into parent");
            self.splice_into_parent(id, parent);
            return self.simplify(parent);
        }
        Ok(id)
    }

    /// Simplify from the root.
    pub fn simplify_root(&mut self) -> NodeId {
        let root = self.root();
        self.canonicalize(root);
        root
    }

    /// Canonicalize the subtree at `id` without looking above it.
    fn canonicalize(&mut self, id: NodeId) {
        let mut index = 0;
        loop {
            let (own_type, child) = match &self.nodes[id.0].kind {
                NodeKind::Connector(connector) => match connector.children.get(index) {
                    Some(child) => (connector.connector_type, *child),
                    None => break,
                },
                NodeKind::Leaf(_) => return,
            };
            if !self.is_connector(child) {
                index += 1;
                continue;
            }

            self.canonicalize(child);
            let merge = match &self.nodes[child.0].kind {
                NodeKind::Connector(c) => mergeable(c.connector_type, c.len(), own_type),
                NodeKind::Leaf(_) => false,
            };
            if merge {
                // spliced grandchildren are already canonical under `own_type`
                index += self.splice_into_parent(child, id);
            } else {
                index += 1;
            }
        }

        while let Some(only) = self.single_connector_child(id) {
            self.collapse_into(id, only);
        }
    }

    fn single_connector_child(&self, id: NodeId) -> Option<NodeId> {
        match &self.nodes[id.0].kind {
            NodeKind::Connector(connector) => match connector.children.as_slice() {
                [only] if self.is_connector(*only) => Some(*only),
                _ => None,
            },
            NodeKind::Leaf(_) => None,
        }
    }

    /// Replace `id`'s only child `only` by its content: `id` takes over the
    /// operator and children of `only`, which is freed.
    fn collapse_into(&mut self, id: NodeId, only: NodeId) {
        let Some(node) = self.nodes.try_remove(only.0) else {
            return;
        };
        let NodeKind::Connector(inner) = node.kind else {
            return;
        };
        for child in &inner.children {
            self.nodes[child.0].parent = Some(id);
        }
        if let NodeKind::Connector(connector) = &mut self.nodes[id.0].kind {
            tracing::debug!(node = %id, absorbed = %only, "collapsing single child connector");
            connector.connector_type = inner.connector_type;
            connector.children = inner.children;
        }
        self.notify(id);
    }

    /// Move the children of `child` into `parent` at `child`'s position and
    /// free `child`. Returns the number of nodes moved.
    fn splice_into_parent(&mut self, child: NodeId, parent: NodeId) -> usize {
        let Some(node) = self.nodes.try_remove(child.0) else {
            return 0;
        };
        let NodeKind::Connector(inner) = node.kind else {
            return 0;
        };
        for grandchild in &inner.children {
            self.nodes[grandchild.0].parent = Some(parent);
        }
        let moved = inner.children.len();
        if let NodeKind::Connector(connector) = &mut self.nodes[parent.0].kind
            && let Some(position) = connector.children.iter().position(|c| *c == child)
        {
            connector.children.splice(position..=position, inner.children);
        }
        self.notify(parent);
        moved
    }
}
