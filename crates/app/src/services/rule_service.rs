//! Rule service: use-cases for managing rules and editing their trees.

use ruletree_domain::error::{NotFoundError, RuleTreeError};
use ruletree_domain::id::RuleId;
use ruletree_domain::rule::Rule;
use ruletree_domain::trigger::TriggerRegistry;

use crate::ports::RuleRepository;
use crate::shared_tree::SharedTree;

/// Application service for rule CRUD and tree editing.
pub struct RuleService<R> {
    repo: R,
    registry: &'static TriggerRegistry,
}

impl<R: RuleRepository> RuleService<R> {
    /// Create a new service backed by the given repository, resolving leaves
    /// through the process-wide registry.
    pub fn new(repo: R) -> Self {
        Self::with_registry(repo, TriggerRegistry::global())
    }

    pub fn with_registry(repo: R, registry: &'static TriggerRegistry) -> Self {
        Self { repo, registry }
    }

    /// Check invariants and that the trigger document decodes.
    fn check(&self, rule: &Rule) -> Result<(), RuleTreeError> {
        rule.validate()?;
        rule.tree(self.registry)?;
        Ok(())
    }

    /// Create a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTreeError::Validation`] if invariants fail,
    /// [`RuleTreeError::Tree`] if the trigger document does not decode, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, rule), fields(rule_name = %rule.name))]
    pub async fn create_rule(&self, rule: Rule) -> Result<Rule, RuleTreeError> {
        self.check(&rule)?;
        self.repo.create(rule).await
    }

    /// Look up a rule by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTreeError::NotFound`] when no rule with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(&self, id: RuleId) -> Result<Rule, RuleTreeError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Rule",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all rules.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rules(&self) -> Result<Vec<Rule>, RuleTreeError> {
        self.repo.get_all().await
    }

    /// Update an existing rule.
    ///
    /// # Errors
    ///
    /// Same as [`RuleService::create_rule`].
    #[tracing::instrument(skip(self, rule), fields(rule_id = %rule.id))]
    pub async fn update_rule(&self, rule: Rule) -> Result<Rule, RuleTreeError> {
        self.check(&rule)?;
        self.repo.update(rule).await
    }

    /// Enable or disable a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTreeError::NotFound`] for an unknown id, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn set_enabled(&self, id: RuleId, enabled: bool) -> Result<Rule, RuleTreeError> {
        let mut rule = self.get_rule(id).await?;
        rule.enabled = enabled;
        self.repo.update(rule).await
    }

    /// Delete a rule by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, id: RuleId) -> Result<(), RuleTreeError> {
        self.repo.delete(id).await
    }

    /// Materialize the trigger tree of a rule for editing.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTreeError::NotFound`] for an unknown id and
    /// [`RuleTreeError::Tree`] when the stored document does not decode.
    #[tracing::instrument(skip(self))]
    pub async fn open_tree(&self, id: RuleId) -> Result<SharedTree, RuleTreeError> {
        let rule = self.get_rule(id).await?;
        Ok(SharedTree::new(rule.tree(self.registry)?))
    }

    /// Simplify `tree` and store it as the trigger of rule `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTreeError::NotFound`] for an unknown id, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, tree))]
    pub async fn save_tree(&self, id: RuleId, tree: &SharedTree) -> Result<Rule, RuleTreeError> {
        let mut rule = self.get_rule(id).await?;
        {
            let mut tree = tree.write();
            tree.simplify_root();
            rule.store_tree(&tree);
        }
        self.repo.update(rule).await
    }
}
