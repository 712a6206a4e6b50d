//! Relative layout module orchestrator.
//!
//! Downstream code imports layout types from here; the element model, the
//! dependency graph and the resolver live in private submodules.

mod core;
pub mod document;
mod graph;
mod resolve;
pub mod rules;

pub use self::core::{Dimension, Element, ElementId, LayoutParams, RelativeLayout, Visibility};
pub use document::{ElementDocument, LayoutDocument, RuleDocument};
pub use resolve::{ResolvedLayout, Resolver, ResolverConfig};
pub use rules::{Anchor, LayoutDirection, ParentVerb, RelativeVerb, Rule, Verb, codes};
