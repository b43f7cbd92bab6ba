//! Rule engine: polls enabled rules and fires those whose tree evaluates true.
//!
//! Trees are materialized once per rule and cached alongside the document
//! they were decoded from. A rule whose stored document changes is decoded
//! again on the next poll. A rule that fails to decode is reported as
//! unavailable and skipped; the other rules keep running.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use ruletree_domain::error::{RuleTreeError, TreeError};
use ruletree_domain::id::RuleId;
use ruletree_domain::rule::Rule;
use ruletree_domain::time::now;
use ruletree_domain::trigger::{Document, TriggerRegistry};

use crate::ports::RuleRepository;
use crate::shared_tree::SharedTree;

struct CachedRule {
    document: Document,
    tree: Result<SharedTree, TreeError>,
}

/// Outcome of a single [`RuleEngine::poll`].
#[derive(Debug, Default)]
pub struct PollReport {
    /// Number of rules whose tree was evaluated.
    pub evaluated: usize,
    pub fired: Vec<RuleId>,
    /// Rules skipped because their trigger document does not decode.
    pub unavailable: Vec<(RuleId, TreeError)>,
}

/// Polling engine evaluating the trigger tree of every enabled rule.
pub struct RuleEngine<R> {
    repo: R,
    registry: &'static TriggerRegistry,
    simplify_on_load: bool,
    cache: Mutex<HashMap<RuleId, CachedRule>>,
}

impl<R: RuleRepository> RuleEngine<R> {
    /// Create a new engine.
    ///
    /// With `simplify_on_load`, trees are brought to canonical form right
    /// after decoding.
    pub fn new(repo: R, registry: &'static TriggerRegistry, simplify_on_load: bool) -> Self {
        Self {
            repo,
            registry,
            simplify_on_load,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, HashMap<RuleId, CachedRule>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn decode(&self, rule: &Rule) -> Result<SharedTree, TreeError> {
        let mut tree = rule.tree(self.registry)?;
        if self.simplify_on_load {
            tree.simplify_root();
        }
        Ok(SharedTree::new(tree))
    }

    /// The tree currently used for rule `id`, if it was loaded successfully.
    ///
    /// Edits made through the returned handle are seen by the next poll.
    pub fn tree(&self, id: RuleId) -> Option<SharedTree> {
        self.lock_cache()
            .get(&id)
            .and_then(|cached| cached.tree.as_ref().ok().cloned())
    }

    /// Drop the cached tree of rule `id` so the next poll decodes it again.
    pub fn invalidate(&self, id: RuleId) {
        self.lock_cache().remove(&id);
    }

    /// Evaluate every enabled rule once.
    ///
    /// Fired rules get their `last_fired` timestamp updated in the repository.
    ///
    /// # Errors
    ///
    /// Returns a storage error if loading or updating rules fails. Decoding
    /// failures are not errors; they are listed in
    /// [`PollReport::unavailable`].
    #[tracing::instrument(skip(self))]
    pub async fn poll(&self) -> Result<PollReport, RuleTreeError> {
        let rules = self.repo.get_enabled().await?;
        let mut report = PollReport::default();
        let mut firing = Vec::new();

        {
            let mut cache = self.lock_cache();
            cache.retain(|id, _| rules.iter().any(|rule| rule.id == *id));

            for rule in rules {
                let stale = cache
                    .get(&rule.id)
                    .is_none_or(|cached| cached.document != rule.trigger);
                if stale {
                    let tree = self.decode(&rule);
                    if let Err(err) = &tree {
                        tracing::warn!(rule_id = %rule.id, rule_name = %rule.name, error = %err, "rule unavailable");
                    }
                    cache.insert(
                        rule.id,
                        CachedRule {
                            document: rule.trigger.clone(),
                            tree,
                        },
                    );
                }

                let Some(cached) = cache.get(&rule.id) else {
                    continue;
                };
                match &cached.tree {
                    Ok(tree) => {
                        report.evaluated += 1;
                        if tree.evaluate() {
                            firing.push(rule);
                        }
                    }
                    Err(err) => report.unavailable.push((rule.id, err.clone())),
                }
            }
        }

        for mut rule in firing {
            rule.last_fired = Some(now());
            let rule = self.repo.update(rule).await?;
            tracing::info!(rule_id = %rule.id, rule_name = %rule.name, "rule fired");
            report.fired.push(rule.id);
        }

        Ok(report)
    }
}
