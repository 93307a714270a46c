//! Symcore rules - structural pattern matching and conditional rewriting.
//!
//! This crate provides:
//! - [`Substitution`] - insertion-ordered capture bindings
//! - [`match_pattern`] - structural matching with `_name` capture variables
//! - [`Rule`] / [`RuleSet`] - match/replace pairs with dispatch-interface
//!   side conditions
//! - [`replace`] - bottom-up fixed-point rule application with cost-biased
//!   acceptance
//!
//! # Architecture
//!
//! The rewriter needs engine services (canonicalisation, cost, sign
//! queries, deadline polling) but the engine sits *above* this crate, so
//! those services are reached through the [`RewriteHost`] dyn seam; the
//! engine implements the trait, rules and conditions consume it. New
//! conditions are added by implementing [`RuleCondition`] - no changes to
//! existing code required.
//!
//! Matching is structural, not mathematical: `1 + x` does not match
//! `x + 1` unless the subject was canonicalised first.

mod matcher;
mod rewrite;
mod rule;
mod substitution;

#[cfg(test)]
mod test_helpers;

pub use matcher::{
    match_candidates, match_pattern, match_with_bindings, MatchOptions, COMMUTATIVE_HEADS,
};
pub use rewrite::{match_rules, replace, Rewrite, RewriteOptions};
pub use rule::{Rule, RuleCondition, RuleSet, RewriteHost};
pub use substitution::{substitute_symbols, Substitution};
