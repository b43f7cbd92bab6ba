//! Registry of leaf trigger types, keyed by document tag.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use super::{CONNECTOR_TAG, ConstantTrigger, TimeRangeTrigger, Trigger};
use crate::error::TreeError;

/// Constructor producing an empty leaf, filled afterwards by
/// [`Trigger::load`].
pub type TriggerFactory = fn() -> Box<dyn Trigger>;

static GLOBAL: OnceLock<TriggerRegistry> = OnceLock::new();

/// Maps document `type` tags to leaf constructors.
///
/// The connector tag is handled by the tree itself and never looked up here.
#[derive(Clone, Default)]
pub struct TriggerRegistry {
    factories: HashMap<String, TriggerFactory>,
}

impl fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.tags().collect();
        tags.sort_unstable();
        f.debug_struct("TriggerRegistry").field("tags", &tags).finish()
    }
}

impl TriggerRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in leaves.
    #[must_use]
    pub fn with_builtins() -> Self {
        Self::new()
            .with(ConstantTrigger::TAG, || Box::new(ConstantTrigger::default()))
            .with(TimeRangeTrigger::TAG, || Box::new(TimeRangeTrigger::default()))
    }

    /// Register `factory` under `tag`, replacing any previous one.
    #[must_use]
    pub fn with(mut self, tag: impl Into<String>, factory: TriggerFactory) -> Self {
        self.register(tag, factory);
        self
    }

    /// Register `factory` under `tag`, replacing any previous one.
    pub fn register(&mut self, tag: impl Into<String>, factory: TriggerFactory) {
        let tag = tag.into();
        if tag == CONNECTOR_TAG {
            tracing::warn!(%tag, "ignoring factory registered under the connector tag");
            return;
        }
        self.factories.insert(tag, factory);
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build an empty leaf for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnknownTriggerType`] when nothing is registered
    /// under `tag`.
    pub fn resolve(&self, tag: &str) -> Result<Box<dyn Trigger>, TreeError> {
        self.factories
            .get(tag)
            .map(|factory| factory())
            .ok_or_else(|| TreeError::UnknownTriggerType(tag.to_string()))
    }

    /// Install the process-wide registry.
    ///
    /// Must happen before the first call to [`TriggerRegistry::global`].
    ///
    /// # Errors
    ///
    /// Gives `registry` back when a global registry is already in place.
    pub fn install(registry: Self) -> Result<(), Self> {
        GLOBAL.set(registry)
    }

    /// The process-wide registry, defaulting to [`Self::with_builtins`].
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::with_builtins)
    }
}
