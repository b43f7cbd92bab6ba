//! # ruletreed: ruletree daemon
//!
//! Composition root that wires the rule repository and the rule engine
//! together, then polls rules until interrupted.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize logging
//! - Open the rule directory (adapter)
//! - Construct the rule engine, injecting the repository via its port trait
//! - Poll enabled rules on a fixed interval
//! - Handle graceful shutdown (Ctrl-C)
//!
//! Passing `--once` runs a single poll and exits.
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use ruletree_adapter_storage_json::JsonDirRuleRepository;
use ruletree_app::ports::RuleRepository;
use ruletree_app::rule_engine::RuleEngine;
use ruletree_domain::trigger::TriggerRegistry;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Repository
    let repo = JsonDirRuleRepository::open(&config.rules.dir).await?;

    // Trigger types
    if TriggerRegistry::install(TriggerRegistry::with_builtins()).is_err() {
        tracing::warn!("trigger registry already installed");
    }
    let registry = TriggerRegistry::global();

    // Engine
    tracing::info!(
        dir = %repo.dir().display(),
        trigger_types = ?registry.tags().collect::<Vec<_>>(),
        "ruletreed starting"
    );
    let engine = RuleEngine::new(repo, registry, config.engine.simplify_on_load);

    if std::env::args().any(|arg| arg == "--once") {
        poll(&engine).await;
        return Ok(());
    }

    let mut ticker = tokio::time::interval(config.poll_interval());
    loop {
        tokio::select! {
            _ = ticker.tick() => poll(&engine).await,
            result = tokio::signal::ctrl_c() => {
                result?;
                tracing::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn poll<R: RuleRepository>(engine: &RuleEngine<R>) {
    match engine.poll().await {
        Ok(report) => tracing::debug!(
            evaluated = report.evaluated,
            fired = report.fired.len(),
            unavailable = report.unavailable.len(),
            "poll complete"
        ),
        Err(err) => tracing::error!(error = %err, "poll failed"),
    }
}
