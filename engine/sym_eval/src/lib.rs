//! Symcore engine - canonicalisation, evaluation and the operation
//! surface of the symbolic computation core.
//!
//! This crate provides:
//! - [`Engine`] - configuration, interner, scope stack, caches, and every
//!   public operation (`canonical`, `simplify`, `evaluate`, `n`,
//!   `pattern_match`, `replace`, `subs`, `is_equal`, `sgn`, `solve` lives
//!   in `sym_solve`)
//! - The identifier registry: [`FunctionDef`] / [`SymbolDef`] with
//!   behaviour flags, hold policies and per-pass handlers
//! - The canonicaliser with its numeric short paths and the canonical
//!   commutative ordering
//! - The assumptions store feeding [`Sgn`] inference
//!
//! # Pipeline Position
//!
//! ```text
//! sym_ir → sym_rules → **sym_eval** → sym_solve
//! ```
//!
//! # Architecture
//!
//! The engine implements `sym_rules::RewriteHost`, closing the loop
//! between the rule engine (below this crate) and canonicalisation /
//! cost / sign services (defined here). Definitions are open: anything
//! the standard library registers, user code can register through the
//! same `declare` mechanism.

mod assumptions;
mod canon;
mod engine;
mod eval;
mod expand;
mod registry;
mod scope;
mod sign;
mod stdlib;

#[cfg(test)]
mod tests;

pub use assumptions::{AssumptionSet, SignCondition};
pub use canon::{compare, total_degree};
pub use engine::{
    Constants, Engine, EngineConfig, EvaluateOptions, NumericMode, ScopedEngine,
};
pub use eval::simplify::SimplifyOptions;
pub use registry::{
    Definition, ExprHandler, FunctionDef, FunctionFlags, HoldPolicy, SignHandler, Signature,
    SymbolDef,
};
pub use scope::{Limits, Scope, ScopeStack};
pub use sign::Sgn;
