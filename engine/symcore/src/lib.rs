//! Symcore - a symbolic computation engine.
//!
//! Boxes a tree-shaped math expression into a normalised, rule-rewritable
//! form, then simplifies, evaluates, pattern-matches and solves it.
//!
//! This facade re-exports the pipeline crates:
//!
//! - [`sym_ir`]: the boxed expression model - [`Expr`], [`NumericValue`],
//!   the [`DomainKind`] lattice, interned [`Name`]s, the error surface
//! - [`sym_rules`]: structural matching, substitutions, rules and the
//!   cost-biased fixed-point rewriter
//! - [`sym_eval`]: the [`Engine`] with canonicalisation, the
//!   simplify/evaluate/numeric passes, scopes, assumptions and caches
//! - [`sym_solve`]: the univariate [`solve`] operation
//!
//! # Quick Start
//!
//! ```
//! use symcore::{solve, Engine, Expr, known};
//!
//! let mut engine = Engine::new();
//! let x = engine.interner().intern("x");
//!
//! // 5x - 10 = 0
//! let equation = Expr::apply_symbol(
//!     known::EQUAL,
//!     vec![
//!         Expr::apply_symbol(
//!             known::SUBTRACT,
//!             vec![
//!                 Expr::apply_symbol(
//!                     known::MULTIPLY,
//!                     vec![Expr::int(5), Expr::symbol(x)],
//!                 ),
//!                 Expr::int(10),
//!             ],
//!         ),
//!         Expr::int(0),
//!     ],
//! );
//! let roots = solve(&mut engine, &equation, &[x]).unwrap();
//! assert!(roots[0].is_same(&Expr::int(2)));
//! ```

pub use sym_eval::{
    AssumptionSet, Constants, Definition, Engine, EngineConfig, EvaluateOptions, ExprHandler,
    FunctionDef, FunctionFlags, HoldPolicy, Limits, NumericMode, Sgn, SignCondition, SignHandler,
    Signature, SimplifyOptions, SymbolDef,
};
pub use sym_ir::{
    known, DomainKind, EngineError, EngineResult, ErrorKind, Expr, ExprError, ExprKind, Head,
    Name, NumericValue, Span, StringInterner, Tensor, TensorField,
};
pub use sym_rules::{
    match_pattern, match_rules, replace, MatchOptions, Rewrite, RewriteHost, RewriteOptions, Rule,
    RuleCondition, RuleSet, Substitution,
};
pub use sym_solve::solve;
