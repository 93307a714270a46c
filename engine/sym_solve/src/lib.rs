//! Symcore solver - univariate root finding over the rule engine.
//!
//! The solver is a library of root rules (linear, reciprocal, power,
//! quadratic, exponential - in that fixed order) driven by the pattern
//! matcher, plus a harmonisation stage that produces equivalent forms
//! (absolute-value splits, exponential merges) when no rule fires
//! directly, and an expansion retry after that.
//!
//! # Pipeline Position
//!
//! ```text
//! sym_ir → sym_rules → sym_eval → **sym_solve**
//! ```
//!
//! The unknown is replaced by a reserved placeholder (`_x` plus a fresh
//! per-engine counter) before matching, so patterns can capture it and
//! conditions can check that coefficients stay free of it; user
//! identifiers can never collide with the placeholder because the
//! declaration grammar rejects leading underscores.

mod conditions;
mod rules;
mod solve;


pub use solve::solve;
