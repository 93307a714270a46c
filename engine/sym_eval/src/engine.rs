//! The engine: configuration, scope stack, caches and the public
//! operation surface.
//!
//! One engine instance owns everything mutable: the interner, the scope
//! stack with its identifier registry and assumptions, the canonical
//! cache and the compiled rule sets. Operations take the engine as
//! explicit context; expressions themselves stay immutable and never
//! point back at it.
//!
//! # Thread Safety
//!
//! None, by contract: the engine is single-threaded cooperative.
//! Concurrent use must route through distinct engine instances.
//!
//! # Caches
//!
//! Caches are monotonic within a configuration epoch. Changing the
//! numeric mode or precision bumps the epoch: every cache flushes and the
//! precomputed constants are rebuilt under the new configuration.

use crate::assumptions::SignCondition;
use crate::canon;
use crate::eval::simplify::{standard_rules, SimplifyOptions};
use crate::eval::{self, numeric_approx};
use crate::expand;
use crate::registry::{Definition, FunctionDef, SymbolDef};
use crate::scope::{Limits, ScopeStack};
use crate::sign::{self, Sgn};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use std::time::{Duration, Instant};
use sym_ir::{
    is_valid_identifier, is_wildcard, DomainKind, EngineError, EngineResult, Expr, ExprKind,
    Name, NumericValue, StringInterner,
};
use sym_rules::{
    match_pattern, replace, MatchOptions, RewriteHost, RewriteOptions, RuleSet, Substitution,
};
use tracing::debug;

/// Numeric evaluation mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum NumericMode {
    /// Exact where possible, machine floats elsewhere, complex allowed.
    #[default]
    Auto,
    /// Machine floats only; complex results collapse to NaN.
    Machine,
    /// Exact big-number forms preferred; complex results collapse to NaN.
    Bignum,
    /// Complex results allowed and preserved.
    Complex,
}

/// Engine configuration.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Numeric evaluation mode.
    pub numeric_mode: NumericMode,
    /// Working precision in decimal digits; clamped to machine precision
    /// at minimum.
    pub numeric_precision: u32,
    /// Absolute tolerance of numeric equality.
    pub tolerance: f64,
}

/// Machine floats carry just under 16 decimal digits.
const MACHINE_PRECISION: u32 = 15;

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            numeric_mode: NumericMode::Auto,
            numeric_precision: 100,
            tolerance: 1e-10,
        }
    }
}

/// Precomputed common values, rebuilt on reconfiguration.
#[derive(Clone, Debug)]
pub struct Constants {
    /// Zero.
    pub zero: Expr,
    /// One.
    pub one: Expr,
    /// One half.
    pub half: Expr,
    /// Not-a-number.
    pub nan: Expr,
    /// Positive infinity.
    pub positive_infinity: Expr,
    /// Negative infinity.
    pub negative_infinity: Expr,
    /// The imaginary unit as a literal.
    pub imaginary_unit: Expr,
    /// Machine-precision pi.
    pub pi: Expr,
    /// Machine-precision e.
    pub e: Expr,
}

impl Constants {
    fn build(config: &EngineConfig) -> Self {
        let exact = !matches!(config.numeric_mode, NumericMode::Machine);
        let half = if exact {
            Expr::rational(1, 2)
        } else {
            Expr::float(0.5)
        };
        let (zero, one) = if exact {
            (Expr::int(0), Expr::int(1))
        } else {
            (Expr::float(0.0), Expr::float(1.0))
        };
        Constants {
            zero,
            one,
            half,
            nan: Expr::number(NumericValue::nan()),
            positive_infinity: Expr::float(f64::INFINITY),
            negative_infinity: Expr::float(f64::NEG_INFINITY),
            imaginary_unit: Expr::number(NumericValue::complex(0.0, 1.0)),
            pi: Expr::float(std::f64::consts::PI),
            e: Expr::float(std::f64::consts::E),
        }
    }
}

/// Evaluation options.
#[derive(Copy, Clone, Debug, Default)]
pub struct EvaluateOptions {
    /// Evaluate in numeric mode (the `N` operation).
    pub numeric_mode: bool,
}

/// The symbolic computation engine.
pub struct Engine {
    interner: StringInterner,
    scopes: ScopeStack,
    config: EngineConfig,
    constants: Constants,
    epoch: u64,
    canonical_cache: FxHashMap<u64, SmallVec<[(Expr, Expr); 1]>>,
    simplify_rules: Option<Rc<RuleSet>>,
    deadline: Option<Instant>,
    placeholder_counter: u32,
}

impl Engine {
    /// Engine with the default configuration and the standard identifier
    /// set registered.
    pub fn new() -> Self {
        Engine::with_config(EngineConfig::default())
    }

    /// Engine with an explicit configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Engine::with_identifier_library(config, crate::stdlib::register)
    }

    /// Engine with a replacement identifier library: `library` is invoked
    /// once on the bare engine and registers every definition the
    /// standard set would otherwise provide. The numeric short paths
    /// remain built in.
    pub fn with_identifier_library(
        mut config: EngineConfig,
        library: impl FnOnce(&mut Engine),
    ) -> Self {
        config.numeric_precision = config.numeric_precision.max(MACHINE_PRECISION);
        let constants = Constants::build(&config);
        let mut engine = Engine {
            interner: StringInterner::new(),
            scopes: ScopeStack::new(Limits::default()),
            config,
            constants,
            epoch: 0,
            canonical_cache: FxHashMap::default(),
            simplify_rules: None,
            deadline: None,
            placeholder_counter: 0,
        };
        library(&mut engine);
        engine
    }

    // Configuration

    /// The interner.
    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The precomputed common values.
    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    /// The configuration epoch; bumps on every cache-flushing change.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Change the numeric mode. Flushes every cache.
    pub fn set_numeric_mode(&mut self, mode: NumericMode) {
        if self.config.numeric_mode != mode {
            self.config.numeric_mode = mode;
            self.reset_caches();
        }
    }

    /// Change the working precision. Flushes every cache.
    pub fn set_numeric_precision(&mut self, digits: u32) {
        let digits = digits.max(MACHINE_PRECISION);
        if self.config.numeric_precision != digits {
            self.config.numeric_precision = digits;
            self.reset_caches();
        }
    }

    /// Change the numeric equality tolerance.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.config.tolerance = tolerance;
    }

    /// Set or clear the wall-clock budget of top-level operations.
    pub fn set_time_limit(&mut self, limit: Option<Duration>) {
        self.scopes.current_mut().limits.time_limit = limit;
    }

    /// Current resource limits.
    pub fn limits(&self) -> Limits {
        self.scopes.current().limits
    }

    fn reset_caches(&mut self) {
        self.epoch += 1;
        self.canonical_cache.clear();
        self.simplify_rules = None;
        self.constants = Constants::build(&self.config);
        debug!(epoch = self.epoch, "engine reconfigured; caches flushed");
    }

    // Scopes and identifiers

    /// Push a lexical scope (recursion limit applies).
    pub fn push_scope(&mut self) -> EngineResult<()> {
        self.scopes.push()
    }

    /// Pop the current scope.
    pub fn pop_scope(&mut self) -> EngineResult<()> {
        self.scopes.pop()
    }

    /// Push a scope and return a guard that pops it on drop, whatever the
    /// exit path.
    pub fn scoped(&mut self) -> EngineResult<ScopedEngine<'_>> {
        self.scopes.push()?;
        Ok(ScopedEngine { engine: self })
    }

    /// Declare an identifier in the current scope.
    ///
    /// Fails with `InvalidIdentifier` when the name violates the
    /// identifier grammar (capture-variable names are reserved), and with
    /// `AlreadyDeclared` when the current scope already holds a
    /// non-inferred definition of the name.
    pub fn declare(&mut self, name: &str, definition: Definition) -> EngineResult<Name> {
        if !is_valid_identifier(name) || is_wildcard(name) {
            return Err(EngineError::InvalidIdentifier {
                name: name.to_owned(),
            });
        }
        let interned = self.interner.intern(name);
        if let Some(existing) = self.scopes.local(interned) {
            if !existing.is_inferred() {
                return Err(EngineError::AlreadyDeclared {
                    name: name.to_owned(),
                });
            }
        }
        self.scopes.define(interned, definition);
        Ok(interned)
    }

    /// Bind a value to a symbol, declaring it (with an inferred domain)
    /// when it does not exist yet.
    pub fn assign(&mut self, name: Name, value: Expr) -> EngineResult<()> {
        if let Some(Definition::Symbol(def)) = self.lookup(name) {
            if def.constant {
                return Err(EngineError::AlreadyDeclared {
                    name: self.interner.resolve(name).to_owned(),
                });
            }
            self.scopes.update(name, |d| {
                if let Definition::Symbol(s) = d {
                    s.value = Some(value.clone());
                }
            });
            return Ok(());
        }
        let domain = self.domain_of(&value);
        let def = SymbolDef {
            domain,
            value: Some(value),
            numeric: None,
            constant: false,
            inferred_domain: true,
        };
        self.scopes.define(name, Definition::Symbol(def));
        Ok(())
    }

    /// Register a built-in definition, bypassing the grammar gate (the
    /// standard names are pre-interned and known-good).
    pub(crate) fn define_builtin(&mut self, name: Name, definition: Definition) {
        self.scopes.define(name, definition);
    }

    /// Resolve a name through the scope chain.
    pub fn lookup(&self, name: Name) -> Option<Definition> {
        self.scopes.lookup(name).cloned()
    }

    /// Resolve a name to a function definition.
    pub fn lookup_function(&self, name: Name) -> Option<Rc<FunctionDef>> {
        self.scopes
            .lookup(name)
            .and_then(Definition::as_function)
            .cloned()
    }

    /// Intern `name` and return it as a symbol expression.
    pub fn symbol(&self, name: &str) -> Expr {
        Expr::symbol(self.interner.intern(name))
    }

    /// A fresh reserved placeholder name (`_x0`, `_x1`, ...); never
    /// collides with user identifiers, whose grammar forbids the leading
    /// underscore at declaration.
    pub fn fresh_placeholder(&mut self, base: &str) -> Name {
        let n = self.placeholder_counter;
        self.placeholder_counter += 1;
        self.interner.intern(&format!("_{base}{n}"))
    }

    // Assumptions

    /// Assume a sign condition for a symbol in the current scope.
    pub fn assume(&mut self, symbol: Name, condition: SignCondition) {
        self.scopes
            .current_mut()
            .assumptions
            .assume_sign(symbol, condition);
    }

    /// Assume a domain for a symbol in the current scope.
    pub fn assume_domain(&mut self, symbol: Name, domain: DomainKind) {
        self.scopes
            .current_mut()
            .assumptions
            .assume_domain(symbol, domain);
    }

    /// Forget every assumption about a symbol in the current scope.
    pub fn forget(&mut self, symbol: Name) {
        self.scopes.current_mut().assumptions.forget(symbol);
    }

    /// The assumed sign condition of a symbol, if any.
    pub fn assumed_sign(&self, symbol: Name) -> Option<SignCondition> {
        self.scopes.current().assumptions.sign_of(symbol)
    }

    /// The numeric value of a named constant, if the symbol is one.
    pub fn constant_numeric(&self, symbol: Name) -> Option<NumericValue> {
        self.scopes
            .lookup(symbol)
            .and_then(Definition::as_symbol)
            .and_then(|def| def.numeric.clone())
    }

    // Queries

    /// The narrowest domain known to contain the value of `expr`.
    pub fn domain_of(&self, expr: &Expr) -> DomainKind {
        match expr.kind() {
            ExprKind::Number(v) => {
                if !v.is_real() {
                    if v.to_complex().re == 0.0 {
                        DomainKind::ImaginaryNumbers
                    } else {
                        DomainKind::ComplexNumbers
                    }
                } else if v.is_nan() || !v.is_finite() {
                    DomainKind::ExtendedRealNumbers
                } else if v.is_integer() {
                    if v.sign() == Some(1) {
                        DomainKind::PositiveIntegers
                    } else {
                        DomainKind::Integers
                    }
                } else if matches!(v, NumericValue::Rational(_)) {
                    DomainKind::RationalNumbers
                } else {
                    DomainKind::RealNumbers
                }
            }
            ExprKind::Symbol(name) => self
                .scopes
                .current()
                .assumptions
                .domain_of(*name)
                .or_else(|| {
                    self.scopes
                        .lookup(*name)
                        .and_then(Definition::as_symbol)
                        .map(|def| def.domain)
                })
                .unwrap_or(DomainKind::Anything),
            ExprKind::Str(_) => DomainKind::Strings,
            ExprKind::Function { .. } => expr
                .head_symbol()
                .and_then(|name| self.lookup_function(name))
                .map_or(DomainKind::Anything, |def| def.signature().result()),
            ExprKind::Tensor(_) => DomainKind::Values,
            ExprKind::Domain(_) => DomainKind::Anything,
            ExprKind::Error(_) => DomainKind::Void,
        }
    }

    /// Cost of an expression: per-head complexity, weighted by depth.
    pub fn cost(&self, expr: &Expr) -> u64 {
        self.cost_at(expr, 0)
    }

    fn cost_at(&self, expr: &Expr, depth: u64) -> u64 {
        let base = match expr.kind() {
            ExprKind::Number(_) | ExprKind::Symbol(_) | ExprKind::Str(_) | ExprKind::Domain(_) => 1,
            ExprKind::Error(_) => 8,
            ExprKind::Tensor(t) => {
                1 + t
                    .data()
                    .iter()
                    .map(|e| self.cost_at(e, depth + 1))
                    .sum::<u64>()
            }
            ExprKind::Function { ops, .. } => {
                let complexity = expr
                    .head_symbol()
                    .and_then(|name| self.lookup_function(name))
                    .map_or(2, |def| u64::from(def.complexity()));
                complexity
                    + ops
                        .iter()
                        .map(|op| self.cost_at(op, depth + 1))
                        .sum::<u64>()
            }
        };
        base + depth
    }

    /// The rewriter's cost-bias acceptance ratio.
    pub fn cost_bias(&self) -> f64 {
        1.2
    }

    // Deadline

    /// Poll the deadline. `Err(Timeout)` past expiry.
    pub fn should_continue(&self) -> EngineResult<()> {
        if let Some(deadline) = self.deadline {
            if Instant::now() > deadline {
                return Err(EngineError::Timeout);
            }
        }
        Ok(())
    }

    fn arm_deadline(&mut self) -> bool {
        if self.deadline.is_none() {
            if let Some(limit) = self.scopes.current().limits.time_limit {
                self.deadline = Some(Instant::now() + limit);
                return true;
            }
        }
        false
    }

    fn disarm_deadline(&mut self, armed: bool) {
        if armed {
            self.deadline = None;
        }
    }

    fn with_deadline<T>(
        &mut self,
        f: impl FnOnce(&mut Engine) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let armed = self.arm_deadline();
        let result = f(self);
        self.disarm_deadline(armed);
        result
    }

    // Operations

    /// The canonical form of `expr`. Memoised for pure expressions.
    pub fn canonical(&mut self, expr: &Expr) -> EngineResult<Expr> {
        if expr.is_canonical() {
            return Ok(expr.clone());
        }
        let cacheable = expr.is_pure();
        if cacheable {
            if let Some(bucket) = self.canonical_cache.get(&expr.content_hash()) {
                for (original, canonical) in bucket {
                    if original.is_same(expr) {
                        return Ok(canonical.clone());
                    }
                }
            }
        }
        let canonical = self.with_deadline(|engine| canon::canonicalize(engine, expr))?;
        if cacheable && canonical.is_pure() {
            self.canonical_cache
                .entry(expr.content_hash())
                .or_default()
                .push((expr.clone(), canonical.clone()));
        }
        Ok(canonical)
    }

    /// Simplify `expr` (see the pass description in `eval::simplify`).
    pub fn simplify(&mut self, expr: &Expr, options: &SimplifyOptions) -> EngineResult<Expr> {
        self.with_deadline(|engine| eval::simplify::simplify(engine, expr, options))
    }

    /// Evaluate `expr` symbolically.
    pub fn evaluate(&mut self, expr: &Expr) -> EngineResult<Expr> {
        self.evaluate_with(expr, EvaluateOptions::default())
    }

    /// Evaluate `expr` with options.
    pub fn evaluate_with(&mut self, expr: &Expr, options: EvaluateOptions) -> EngineResult<Expr> {
        self.with_deadline(|engine| eval::evaluate(engine, expr, options.numeric_mode))
    }

    /// Numeric approximation: evaluate in numeric mode.
    pub fn n(&mut self, expr: &Expr) -> EngineResult<Expr> {
        self.with_deadline(|engine| numeric_approx(engine, expr))
    }

    /// Match `pattern` against `subject` (both canonicalised first).
    pub fn pattern_match(
        &mut self,
        pattern: &Expr,
        subject: &Expr,
    ) -> EngineResult<Option<Substitution>> {
        let pattern = self.canonical(pattern)?;
        let subject = self.canonical(subject)?;
        let options = MatchOptions {
            tolerance: self.config.tolerance,
            ..MatchOptions::default()
        };
        Ok(match_pattern(&pattern, &subject, &self.interner, options))
    }

    /// Apply a rule set to fixed point over the canonical form of `expr`.
    /// `None` when no rule fired.
    pub fn replace(
        &mut self,
        expr: &Expr,
        rules: &RuleSet,
        options: Option<RewriteOptions>,
    ) -> EngineResult<Option<Expr>> {
        let canonical = self.canonical(expr)?;
        let options = options.unwrap_or_else(|| RewriteOptions {
            cost_bias: self.cost_bias(),
            iteration_limit: self.limits().iteration_limit,
        });
        self.with_deadline(|engine| replace(&canonical, rules, engine, &options))
    }

    /// Fixed-point rewriting with the engine's default options.
    pub(crate) fn replace_to_fixed_point(
        &mut self,
        expr: &Expr,
        rules: &RuleSet,
    ) -> EngineResult<Option<Expr>> {
        let options = RewriteOptions {
            cost_bias: self.cost_bias(),
            iteration_limit: self.limits().iteration_limit,
        };
        replace(expr, rules, self, &options)
    }

    /// Structural substitution of symbols (no canonicalisation; the
    /// result is raw so placeholders survive as-is).
    pub fn subs(&self, expr: &Expr, map: &FxHashMap<Name, Expr>) -> Expr {
        sym_rules::substitute_symbols(expr, map)
    }

    /// Algebraic expansion (distribution over sums).
    pub fn expand(&mut self, expr: &Expr) -> EngineResult<Expr> {
        self.with_deadline(|engine| expand::expand(engine, expr))
    }

    /// Mathematical equality: structural identity, or the simplified
    /// difference vanishing, or numeric agreement within tolerance.
    pub fn is_equal(&mut self, a: &Expr, b: &Expr) -> EngineResult<bool> {
        let a = self.canonical(a)?;
        let b = self.canonical(b)?;
        if a.is_same(&b) {
            return Ok(true);
        }
        let difference = Expr::apply_symbol(
            sym_ir::known::ADD,
            vec![
                a.clone(),
                Expr::apply_symbol(sym_ir::known::NEGATE, vec![b.clone()]),
            ],
        );
        let simplified = self.simplify(&difference, &SimplifyOptions::default())?;
        if simplified
            .numeric_value()
            .is_some_and(NumericValue::is_zero)
        {
            return Ok(true);
        }
        // Full expansion can cancel what the cost-guarded pass kept.
        let expanded = self.expand(&difference)?;
        let simplified = self.simplify(&expanded, &SimplifyOptions::default())?;
        if simplified
            .numeric_value()
            .is_some_and(NumericValue::is_zero)
        {
            return Ok(true);
        }
        let approx = self.n(&difference)?;
        if let Some(v) = approx.numeric_value() {
            return Ok(v.approx_eq(&NumericValue::int(0), self.config.tolerance));
        }
        Ok(false)
    }

    /// Sign inference.
    pub fn sgn(&mut self, expr: &Expr) -> EngineResult<Sgn> {
        let canonical = self.canonical(expr)?;
        sign::sgn(self, &canonical)
    }

    /// Free variables of `expr`: symbols that resolve to neither a
    /// function definition nor a constant.
    pub fn free_variables(&self, expr: &Expr) -> Vec<Name> {
        let mut symbols = Vec::new();
        expr.collect_symbols(&mut symbols);
        symbols.retain(|name| match self.scopes.lookup(*name) {
            Some(Definition::Function(_)) => false,
            Some(Definition::Symbol(def)) => !def.constant,
            None => true,
        });
        symbols
    }

    /// The standard simplification rule set, compiled once per epoch.
    pub(crate) fn standard_simplify_rules(&mut self) -> Rc<RuleSet> {
        if let Some(rules) = &self.simplify_rules {
            return Rc::clone(rules);
        }
        let rules = Rc::new(standard_rules(&self.interner));
        self.simplify_rules = Some(Rc::clone(&rules));
        rules
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

/// RAII guard pairing `push_scope` with a guaranteed `pop_scope`, on every
/// exit path including early returns and panics.
pub struct ScopedEngine<'a> {
    engine: &'a mut Engine,
}

impl Drop for ScopedEngine<'_> {
    fn drop(&mut self) {
        // The guard exists because the push succeeded; the root scope is
        // still below us, so the pop cannot fail.
        let _ = self.engine.scopes.pop();
    }
}

impl Deref for ScopedEngine<'_> {
    type Target = Engine;

    fn deref(&self) -> &Self::Target {
        self.engine
    }
}

impl DerefMut for ScopedEngine<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.engine
    }
}

/// The engine as seen by the rule engine and rule conditions.
impl RewriteHost for Engine {
    fn interner(&self) -> &StringInterner {
        &self.interner
    }

    fn canonicalize(&mut self, expr: &Expr) -> Expr {
        // Timeouts surface through the rewriter's own deadline polls.
        self.canonical(expr).unwrap_or_else(|_| expr.clone())
    }

    fn cost(&mut self, expr: &Expr) -> u64 {
        Engine::cost(self, expr)
    }

    fn check_continue(&mut self) -> EngineResult<()> {
        self.should_continue()
    }

    fn tolerance(&self) -> f64 {
        self.config.tolerance
    }

    fn sign_of(&mut self, expr: &Expr) -> Option<i8> {
        self.sgn(expr).ok().and_then(Sgn::as_i8)
    }

    fn numeric_approx(&mut self, expr: &Expr) -> Option<NumericValue> {
        self.n(expr)
            .ok()
            .and_then(|result| result.numeric_value().cloned())
    }
}
