//! # ruletree-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RuleRepository`: CRUD for rules and their stored trigger documents
//! - Define **driving/inbound ports** as use-case structs:
//!   - `RuleService`: create, update, list, enable, and edit rule trees
//!   - `RuleEngine`: poll enabled rules and fire those whose tree is true
//! - Share trigger trees between the engine and editors behind a tree-wide lock
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `ruletree-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod rule_engine;
pub mod services;
pub mod shared_tree;
