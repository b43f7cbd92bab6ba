//! # ruletree-adapter-storage-json
//!
//! Rule persistence in a directory of JSON files, one rule per file.
//!
//! ## Responsibilities
//! - Implement the `RuleRepository` port trait defined in `ruletree-app::ports`
//! - Load every `*.json` rule file of a directory at startup
//! - Write rules back to the file they were read from, or to `<id>.json`
//!
//! ## Dependency rule
//! Depends on `ruletree-app` (for port traits) and `ruletree-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod rule_repo;

pub use rule_repo::JsonDirRuleRepository;
