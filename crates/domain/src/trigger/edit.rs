//! Editing operations driven by a tree editor.
//!
//! Every connector whose child list changes is reported to the observer,
//! so the editor only has to redraw those.

use super::ConnectorType;
use super::tree::{NodeId, TriggerTree};
use crate::error::TreeError;

impl TriggerTree {
    /// Add `node` under `parent`, joined to its siblings with `connection`.
    ///
    /// When `parent` already uses `connection` the node is appended as is.
    /// Otherwise it is first wrapped in a new connector of type
    /// `connection`. Returns the node that was appended to `parent`.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`TriggerTree::add`].
    pub fn add_with_connector(
        &mut self,
        parent: NodeId,
        node: NodeId,
        connection: ConnectorType,
    ) -> Result<NodeId, TreeError> {
        if self.connector_type(parent)? == connection {
            self.add(parent, node)?;
            return Ok(node);
        }
        let wrapper = self.new_connector(connection);
        if let Err(err) = self.add(wrapper, node) {
            self.discard(wrapper)?;
            return Err(err);
        }
        self.add(parent, wrapper)?;
        Ok(wrapper)
    }

    /// Remove `node` and simplify what is left.
    ///
    /// An attached node is discarded and its former parent simplified. A
    /// connector without parent is emptied and simplified in place. Returns
    /// the node now standing for the edited position.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotAConnector`] for a detached leaf, or fails
    /// when `node` is not part of this tree.
    pub fn remove_and_simplify(&mut self, node: NodeId) -> Result<NodeId, TreeError> {
        if let Some(parent) = self.parent(node)? {
            self.discard(node)?;
            return self.simplify(parent);
        }
        let children = self.connector(node)?.children().to_vec();
        for child in children {
            self.discard(child)?;
        }
        self.simplify(node)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::super::tree::tests::{connector, leaf};
    use super::*;
    use crate::trigger::ConstantTrigger;

    fn record(tree: &mut TriggerTree) -> Arc<Mutex<Vec<NodeId>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        tree.set_observer(move |id: NodeId| sink.lock().unwrap().push(id));
        seen
    }

    #[test]
    fn should_append_directly_when_connection_matches() {
        let mut tree = TriggerTree::with_type(ConnectorType::Or);
        let root = tree.root();
        let node = tree.new_leaf(Box::new(ConstantTrigger::new(true)));

        let added = tree.add_with_connector(root, node, ConnectorType::Or).unwrap();

        assert_eq!(added, node);
        assert_eq!(tree.connector(root).unwrap().children(), &[node]);
    }

    #[test]
    fn should_wrap_node_when_connection_differs() {
        let mut tree = TriggerTree::with_type(ConnectorType::And);
        let root = tree.root();
        let node = tree.new_leaf(Box::new(ConstantTrigger::new(true)));

        let wrapper = tree.add_with_connector(root, node, ConnectorType::Xor).unwrap();

        assert_ne!(wrapper, node);
        assert_eq!(tree.connector_type(wrapper).unwrap(), ConnectorType::Xor);
        assert_eq!(tree.connector(wrapper).unwrap().children(), &[node]);
        assert_eq!(tree.parent(wrapper).unwrap(), Some(root));
    }

    #[test]
    fn should_not_leak_wrapper_when_adding_fails() {
        let mut tree = TriggerTree::with_type(ConnectorType::And);
        let root = tree.root();
        let or = connector(&mut tree, root, ConnectorType::Or);
        let count = tree.node_count();

        let err = tree
            .add_with_connector(or, root, ConnectorType::Xor)
            .unwrap_err();

        assert_eq!(err, TreeError::RootNode(root));
        assert_eq!(tree.node_count(), count);
    }

    #[test]
    fn should_simplify_parent_after_removing_a_connector() {
        let mut tree = TriggerTree::with_type(ConnectorType::And);
        let root = tree.root();
        let or = connector(&mut tree, root, ConnectorType::Or);
        leaf(&mut tree, or, true);
        leaf(&mut tree, or, false);
        let xor = connector(&mut tree, root, ConnectorType::Xor);
        leaf(&mut tree, xor, true);
        leaf(&mut tree, xor, true);

        let result = tree.remove_and_simplify(xor).unwrap();

        assert_eq!(result, root);
        assert_eq!(tree.connector_type(root).unwrap(), ConnectorType::Or);
        assert_eq!(tree.describe(), "always or never");
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn should_clear_root_when_removing_it() {
        let mut tree = TriggerTree::with_type(ConnectorType::Or);
        let root = tree.root();
        leaf(&mut tree, root, false);
        let and = connector(&mut tree, root, ConnectorType::And);
        leaf(&mut tree, and, false);

        let result = tree.remove_and_simplify(root).unwrap();

        assert_eq!(result, root);
        assert!(tree.connector(root).unwrap().is_empty());
        assert_eq!(tree.node_count(), 1);
        assert!(tree.evaluate());
    }

    #[test]
    fn should_reject_removing_a_detached_leaf() {
        let mut tree = TriggerTree::new();
        let node = tree.new_leaf(Box::new(ConstantTrigger::new(true)));
        assert_eq!(
            tree.remove_and_simplify(node),
            Err(TreeError::NotAConnector(node))
        );
    }

    #[test]
    fn should_report_wrapper_then_parent_when_adding_with_connector() {
        let mut tree = TriggerTree::with_type(ConnectorType::And);
        let root = tree.root();
        let node = tree.new_leaf(Box::new(ConstantTrigger::new(true)));
        let seen = record(&mut tree);

        let wrapper = tree.add_with_connector(root, node, ConnectorType::Or).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![wrapper, root]);
    }

    #[test]
    fn should_report_parent_when_adding_with_matching_connector() {
        let mut tree = TriggerTree::with_type(ConnectorType::Or);
        let root = tree.root();
        let node = tree.new_leaf(Box::new(ConstantTrigger::new(true)));
        let seen = record(&mut tree);

        tree.add_with_connector(root, node, ConnectorType::Or).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![root]);
    }

    #[test]
    fn should_report_removal_and_collapse_when_removing_and_simplifying() {
        let mut tree = TriggerTree::with_type(ConnectorType::And);
        let root = tree.root();
        let or = connector(&mut tree, root, ConnectorType::Or);
        leaf(&mut tree, or, true);
        leaf(&mut tree, or, false);
        let xor = connector(&mut tree, root, ConnectorType::Xor);
        leaf(&mut tree, xor, true);
        let seen = record(&mut tree);

        tree.remove_and_simplify(xor).unwrap();

        // detached from root, then root absorbs its only connector child
        assert_eq!(*seen.lock().unwrap(), vec![root, root]);
    }

    #[test]
    fn should_report_parent_and_grandparent_when_a_merge_propagates() {
        let mut tree = TriggerTree::with_type(ConnectorType::And);
        let root = tree.root();
        leaf(&mut tree, root, true);
        let or = connector(&mut tree, root, ConnectorType::Or);
        leaf(&mut tree, or, false);
        let xor = connector(&mut tree, or, ConnectorType::Xor);
        leaf(&mut tree, xor, true);
        leaf(&mut tree, xor, true);
        let seen = record(&mut tree);

        let result = tree.remove_and_simplify(xor).unwrap();

        assert_eq!(result, root);
        assert_eq!(*seen.lock().unwrap(), vec![or, root]);
        assert_eq!(tree.describe(), "always and never");
    }

    #[test]
    fn should_stop_reporting_once_observer_is_cleared() {
        let mut tree = TriggerTree::with_type(ConnectorType::And);
        let root = tree.root();
        let seen = record(&mut tree);
        tree.clear_observer();

        let node = tree.new_leaf(Box::new(ConstantTrigger::new(true)));
        tree.add_with_connector(root, node, ConnectorType::Xor).unwrap();

        assert!(seen.lock().unwrap().is_empty());
    }
}
