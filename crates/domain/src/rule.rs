//! Rule: a named trigger tree deciding when an automation fires.

use serde::{Deserialize, Serialize};

use crate::error::{RuleTreeError, TreeError, ValidationError};
use crate::id::RuleId;
use crate::time::Timestamp;
use crate::trigger::{Document, TriggerRegistry, TriggerTree};

fn default_enabled() -> bool {
    true
}

/// A rule whose trigger tree is stored in its serialized form.
///
/// The tree is only materialized when the rule is evaluated, so a rule
/// referring to an unknown trigger type can still be listed and repaired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub id: RuleId,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub trigger: Document,
    #[serde(default)]
    pub last_fired: Option<Timestamp>,
}

impl Rule {
    /// Create a builder for constructing a [`Rule`].
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTreeError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `trigger` is not a connector document ([`ValidationError::RootNotConnector`])
    pub fn validate(&self) -> Result<(), RuleTreeError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !self.trigger.is_connector() {
            return Err(ValidationError::RootNotConnector(self.trigger.type_tag.clone()).into());
        }
        Ok(())
    }

    /// Materialize the trigger tree.
    ///
    /// # Errors
    ///
    /// Returns the [`TreeError`] raised while decoding the document.
    pub fn tree(&self, registry: &TriggerRegistry) -> Result<TriggerTree, TreeError> {
        TriggerTree::from_document(&self.trigger, registry)
    }

    /// Replace the stored document with the current state of `tree`.
    pub fn store_tree(&mut self, tree: &TriggerTree) {
        self.trigger = tree.to_document();
    }
}

/// Step-by-step builder for [`Rule`].
#[derive(Debug, Default)]
pub struct RuleBuilder {
    id: Option<RuleId>,
    name: Option<String>,
    enabled: Option<bool>,
    trigger: Option<Document>,
    last_fired: Option<Timestamp>,
}

impl RuleBuilder {
    #[must_use]
    pub fn id(mut self, id: RuleId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Document) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Use the serialized form of `tree` as trigger.
    #[must_use]
    pub fn tree(self, tree: &TriggerTree) -> Self {
        self.trigger(tree.to_document())
    }

    #[must_use]
    pub fn last_fired(mut self, ts: Timestamp) -> Self {
        self.last_fired = Some(ts);
        self
    }

    /// Consume the builder, validate, and return a [`Rule`].
    ///
    /// Without a trigger the rule gets an empty AND connector, which always
    /// fires.
    ///
    /// # Errors
    ///
    /// Returns [`RuleTreeError::Validation`] if invariants fail.
    pub fn build(self) -> Result<Rule, RuleTreeError> {
        let rule = Rule {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            trigger: self
                .trigger
                .unwrap_or_else(|| TriggerTree::new().to_document()),
            last_fired: self.last_fired,
        };
        rule.validate()?;
        Ok(rule)
    }
}
