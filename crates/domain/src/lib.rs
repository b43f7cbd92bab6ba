//! # ruletree-domain
//!
//! Pure domain model for ruletree automation rules.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **trigger trees**: leaf conditions combined by AND / OR / XOR
//!   connectors, their evaluation and description
//! - Serialize trees to and from their JSON document form, resolving leaf
//!   types through a registry
//! - Keep trees canonical after edits (`simplify`)
//! - Define **Rules** (a named trigger tree)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.

pub mod error;
pub mod id;
pub mod time;

pub mod rule;
pub mod trigger;
