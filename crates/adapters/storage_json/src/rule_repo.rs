//! JSON directory implementation of [`RuleRepository`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use ruletree_app::ports::RuleRepository;
use ruletree_domain::error::{NotFoundError, RuleTreeError};
use ruletree_domain::id::RuleId;
use ruletree_domain::rule::Rule;

use crate::error::StorageError;

struct StoredRule {
    path: PathBuf,
    rule: Rule,
}

/// Directory-backed rule repository.
///
/// Rules are held in memory and every change is written through to disk.
pub struct JsonDirRuleRepository {
    dir: PathBuf,
    rules: Mutex<HashMap<RuleId, StoredRule>>,
}

impl JsonDirRuleRepository {
    /// Open `dir`, creating it when missing, and load every rule file in it.
    ///
    /// Files that cannot be parsed as a rule are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created or read.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let mut rules = HashMap::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match read_rule(&path).await {
                Ok(rule) => {
                    tracing::debug!(path = %path.display(), rule_id = %rule.id, "rule loaded");
                    rules.insert(rule.id, StoredRule { path, rule });
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable rule file");
                }
            }
        }
        tracing::info!(dir = %dir.display(), count = rules.len(), "rules loaded");

        Ok(Self {
            dir,
            rules: Mutex::new(rules),
        })
    }

    /// The directory rules are stored in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: RuleId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

async fn read_rule(path: &Path) -> Result<Rule, StorageError> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&text)?)
}

async fn write_rule(path: &Path, rule: &Rule) -> Result<(), StorageError> {
    let text = serde_json::to_string_pretty(rule)?;
    tokio::fs::write(path, text).await?;
    Ok(())
}

fn sorted_by_name(mut rules: Vec<Rule>) -> Vec<Rule> {
    rules.sort_by(|a, b| a.name.cmp(&b.name));
    rules
}

impl RuleRepository for JsonDirRuleRepository {
    async fn create(&self, rule: Rule) -> Result<Rule, RuleTreeError> {
        let mut rules = self.rules.lock().await;
        // an id already on disk keeps its file, whatever its name
        let path = rules
            .get(&rule.id)
            .map_or_else(|| self.path_for(rule.id), |stored| stored.path.clone());
        write_rule(&path, &rule).await?;
        rules.insert(
            rule.id,
            StoredRule {
                path,
                rule: rule.clone(),
            },
        );
        Ok(rule)
    }

    async fn get_by_id(&self, id: RuleId) -> Result<Option<Rule>, RuleTreeError> {
        let rules = self.rules.lock().await;
        Ok(rules.get(&id).map(|stored| stored.rule.clone()))
    }

    async fn get_all(&self) -> Result<Vec<Rule>, RuleTreeError> {
        let rules = self.rules.lock().await;
        Ok(sorted_by_name(
            rules.values().map(|stored| stored.rule.clone()).collect(),
        ))
    }

    async fn get_enabled(&self) -> Result<Vec<Rule>, RuleTreeError> {
        let rules = self.rules.lock().await;
        Ok(sorted_by_name(
            rules
                .values()
                .filter(|stored| stored.rule.enabled)
                .map(|stored| stored.rule.clone())
                .collect(),
        ))
    }

    async fn update(&self, rule: Rule) -> Result<Rule, RuleTreeError> {
        let mut rules = self.rules.lock().await;
        let Some(stored) = rules.get_mut(&rule.id) else {
            return Err(NotFoundError {
                entity: "Rule",
                id: rule.id.to_string(),
            }
            .into());
        };
        write_rule(&stored.path, &rule).await?;
        stored.rule = rule.clone();
        Ok(rule)
    }

    async fn delete(&self, id: RuleId) -> Result<(), RuleTreeError> {
        let mut rules = self.rules.lock().await;
        if let Some(stored) = rules.remove(&id) {
            tokio::fs::remove_file(&stored.path)
                .await
                .map_err(StorageError::from)?;
        }
        Ok(())
    }
}
