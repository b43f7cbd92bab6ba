//! Trigger trees shared between the engine and editors.
//!
//! A whole tree sits behind one lock: [`TriggerTree::simplify`] walks both up
//! to the parent and down into siblings, so locking per node could not keep
//! an edit consistent. Evaluation and description take the read side, so
//! they may run together but never interleave with an edit.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ruletree_domain::error::TreeError;
use ruletree_domain::trigger::{Document, NodeId, TriggerTree};

/// A [`TriggerTree`] behind a tree-wide read/write lock.
#[derive(Debug, Clone, Default)]
pub struct SharedTree {
    inner: Arc<RwLock<TriggerTree>>,
}

impl From<TriggerTree> for SharedTree {
    fn from(tree: TriggerTree) -> Self {
        Self::new(tree)
    }
}

impl SharedTree {
    #[must_use]
    pub fn new(tree: TriggerTree) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Shared access for read-only traversals. A poisoned lock is recovered.
    pub fn read(&self) -> RwLockReadGuard<'_, TriggerTree> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access for structural edits.
    pub fn write(&self) -> RwLockWriteGuard<'_, TriggerTree> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn evaluate(&self) -> bool {
        self.read().evaluate()
    }

    #[must_use]
    pub fn describe(&self) -> String {
        self.read().describe()
    }

    #[must_use]
    pub fn to_document(&self) -> Document {
        self.read().to_document()
    }

    /// Apply `edit` under the write lock, then simplify from the root.
    ///
    /// # Errors
    ///
    /// Returns the error of `edit`; the tree is then left as `edit` left it.
    pub fn edit<F, R>(&self, edit: F) -> Result<R, TreeError>
    where
        F: FnOnce(&mut TriggerTree) -> Result<R, TreeError>,
    {
        let mut tree = self.write();
        let result = edit(&mut *tree)?;
        let root: NodeId = tree.simplify_root();
        tracing::debug!(%root, description = %tree.describe(), "tree edited");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use ruletree_domain::trigger::{ConnectorType, ConstantTrigger};

    use super::*;

    fn add_leaf(tree: &mut TriggerTree, parent: NodeId, value: bool) -> Result<NodeId, TreeError> {
        let id = tree.new_leaf(Box::new(ConstantTrigger::new(value)));
        tree.add(parent, id)?;
        Ok(id)
    }

    #[test]
    fn should_simplify_after_edit() {
        let shared = SharedTree::new(TriggerTree::with_type(ConnectorType::And));

        shared
            .edit(|tree| {
                let root = tree.root();
                let or = tree.new_connector(ConnectorType::Or);
                tree.add(root, or)?;
                add_leaf(tree, or, true)?;
                add_leaf(tree, or, false)
            })
            .unwrap();

        let tree = shared.read();
        assert_eq!(tree.connector_type(tree.root()).unwrap(), ConnectorType::Or);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn should_propagate_edit_errors() {
        let shared = SharedTree::default();
        let err = shared
            .edit(|tree| {
                let root = tree.root();
                let leaf = add_leaf(tree, root, true)?;
                add_leaf(tree, leaf, true)
            })
            .unwrap_err();
        assert!(matches!(err, TreeError::NotAConnector(_)));
    }

    #[test]
    fn should_serve_readers_from_several_threads() {
        let shared = SharedTree::default();
        shared
            .edit(|tree| {
                let root = tree.root();
                add_leaf(tree, root, true)?;
                add_leaf(tree, root, true)
            })
            .unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || shared.evaluate())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(shared.describe(), "always and always");
    }
}
