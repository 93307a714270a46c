//! Identifier definitions: symbols and functions.
//!
//! A definition is what a name resolves to through the scope stack. Symbol
//! definitions carry a domain, an optional bound value and constancy;
//! function definitions carry a signature, behaviour flags, a hold policy,
//! a complexity weight and optional handlers for each evaluation pass.
//!
//! Handlers receive the engine and the (already processed) operands and
//! return `Ok(None)` to decline, letting the pass fall back to
//! reconstruction. Handler dispatch is open: registering a definition is
//! all it takes to extend the engine.

use crate::engine::Engine;
use bitflags::bitflags;
use std::rc::Rc;
use sym_ir::{DomainKind, EngineResult, Expr, Name, NumericValue};

/// Handler producing an expression, or declining.
pub type ExprHandler = Rc<dyn Fn(&mut Engine, &[Expr]) -> EngineResult<Option<Expr>>>;

/// Handler producing a sign, or declining.
pub type SignHandler = Rc<dyn Fn(&mut Engine, &[Expr]) -> EngineResult<Option<i8>>>;

bitflags! {
    /// Behaviour flags of a function definition.
    #[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
    pub struct FunctionFlags: u16 {
        /// No observable side effects; results may be cached.
        const PURE = 1 << 0;
        /// Same-headed children are flattened during canonicalisation.
        const ASSOCIATIVE = 1 << 1;
        /// Children are sorted into the canonical order.
        const COMMUTATIVE = 1 << 2;
        /// `f(f(x)) = f(x)`.
        const IDEMPOTENT = 1 << 3;
        /// `f(f(x)) = x`.
        const INVOLUTION = 1 << 4;
        /// Maps elementwise over indexable collection operands.
        const THREADABLE = 1 << 5;
        /// Evaluation passes return the first operand unchanged.
        const INERT = 1 << 6;
    }
}

/// Which operand positions a pass leaves unprocessed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum HoldPolicy {
    /// Every position is held.
    All,
    /// No position is held.
    #[default]
    None,
    /// Position 0 only.
    First,
    /// Positions 1..n-1.
    Rest,
    /// Position n-1 only.
    Last,
    /// Positions 0..n-2.
    Most,
}

impl HoldPolicy {
    /// Whether position `index` of `len` operands is held.
    pub fn holds(self, index: usize, len: usize) -> bool {
        match self {
            HoldPolicy::All => true,
            HoldPolicy::None => false,
            HoldPolicy::First => index == 0,
            HoldPolicy::Rest => index > 0,
            HoldPolicy::Last => len > 0 && index == len - 1,
            HoldPolicy::Most => len > 0 && index < len - 1,
        }
    }
}

/// Operand and result domains of a function.
#[derive(Clone, Debug)]
pub struct Signature {
    params: Vec<DomainKind>,
    variadic: Option<DomainKind>,
    result: DomainKind,
}

impl Signature {
    /// Fixed-arity signature.
    pub fn new(params: Vec<DomainKind>, result: DomainKind) -> Self {
        Signature {
            params,
            variadic: None,
            result,
        }
    }

    /// Signature with a variadic tail accepting `tail`-domain operands.
    #[must_use]
    pub fn with_variadic(mut self, tail: DomainKind) -> Self {
        self.variadic = Some(tail);
        self
    }

    /// Declared positional parameter domains.
    pub fn params(&self) -> &[DomainKind] {
        &self.params
    }

    /// Variadic tail domain, if the signature has one.
    pub fn variadic(&self) -> Option<DomainKind> {
        self.variadic
    }

    /// Result domain.
    pub fn result(&self) -> DomainKind {
        self.result
    }

    /// Domain expected at operand position `index`, if the signature
    /// admits that position at all.
    pub fn param_at(&self, index: usize) -> Option<DomainKind> {
        self.params.get(index).copied().or(self.variadic)
    }

    /// Smallest admissible operand count.
    pub fn min_arity(&self) -> usize {
        self.params.len()
    }

    /// Largest admissible operand count (`None` = unbounded).
    pub fn max_arity(&self) -> Option<usize> {
        if self.variadic.is_some() {
            None
        } else {
            Some(self.params.len())
        }
    }
}

/// A function definition.
#[derive(Clone)]
pub struct FunctionDef {
    name: Name,
    signature: Signature,
    flags: FunctionFlags,
    hold: HoldPolicy,
    complexity: u32,
    canonical: Option<ExprHandler>,
    simplify: Option<ExprHandler>,
    evaluate: Option<ExprHandler>,
    numeric: Option<ExprHandler>,
    sign: Option<SignHandler>,
}

impl FunctionDef {
    /// Definition with a variadic any-domain signature and default flags.
    pub fn new(name: Name) -> Self {
        FunctionDef {
            name,
            signature: Signature::new(Vec::new(), DomainKind::Anything)
                .with_variadic(DomainKind::Anything),
            flags: FunctionFlags::PURE,
            hold: HoldPolicy::None,
            complexity: 2,
            canonical: None,
            simplify: None,
            evaluate: None,
            numeric: None,
            sign: None,
        }
    }

    /// Replace the signature.
    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    /// Replace the flags.
    #[must_use]
    pub fn with_flags(mut self, flags: FunctionFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Replace the hold policy.
    #[must_use]
    pub fn with_hold(mut self, hold: HoldPolicy) -> Self {
        self.hold = hold;
        self
    }

    /// Replace the complexity weight.
    #[must_use]
    pub fn with_complexity(mut self, complexity: u32) -> Self {
        self.complexity = complexity;
        self
    }

    /// Install the canonical handler.
    #[must_use]
    pub fn on_canonical(
        mut self,
        handler: impl Fn(&mut Engine, &[Expr]) -> EngineResult<Option<Expr>> + 'static,
    ) -> Self {
        self.canonical = Some(Rc::new(handler));
        self
    }

    /// Install the simplify handler.
    #[must_use]
    pub fn on_simplify(
        mut self,
        handler: impl Fn(&mut Engine, &[Expr]) -> EngineResult<Option<Expr>> + 'static,
    ) -> Self {
        self.simplify = Some(Rc::new(handler));
        self
    }

    /// Install the evaluate handler.
    #[must_use]
    pub fn on_evaluate(
        mut self,
        handler: impl Fn(&mut Engine, &[Expr]) -> EngineResult<Option<Expr>> + 'static,
    ) -> Self {
        self.evaluate = Some(Rc::new(handler));
        self
    }

    /// Install the numeric-approximation handler.
    #[must_use]
    pub fn on_numeric(
        mut self,
        handler: impl Fn(&mut Engine, &[Expr]) -> EngineResult<Option<Expr>> + 'static,
    ) -> Self {
        self.numeric = Some(Rc::new(handler));
        self
    }

    /// Install the sign handler.
    #[must_use]
    pub fn on_sign(
        mut self,
        handler: impl Fn(&mut Engine, &[Expr]) -> EngineResult<Option<i8>> + 'static,
    ) -> Self {
        self.sign = Some(Rc::new(handler));
        self
    }

    /// The defined name.
    pub fn name(&self) -> Name {
        self.name
    }

    /// The signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The behaviour flags.
    pub fn flags(&self) -> FunctionFlags {
        self.flags
    }

    /// The hold policy.
    pub fn hold(&self) -> HoldPolicy {
        self.hold
    }

    /// The complexity weight used by the cost function.
    pub fn complexity(&self) -> u32 {
        self.complexity
    }

    /// The canonical handler, if installed.
    pub fn canonical_handler(&self) -> Option<ExprHandler> {
        self.canonical.clone()
    }

    /// The simplify handler, if installed.
    pub fn simplify_handler(&self) -> Option<ExprHandler> {
        self.simplify.clone()
    }

    /// The evaluate handler, if installed.
    pub fn evaluate_handler(&self) -> Option<ExprHandler> {
        self.evaluate.clone()
    }

    /// The numeric handler, if installed.
    pub fn numeric_handler(&self) -> Option<ExprHandler> {
        self.numeric.clone()
    }

    /// The sign handler, if installed.
    pub fn sign_handler(&self) -> Option<SignHandler> {
        self.sign.clone()
    }
}

/// A symbol definition.
#[derive(Clone, Debug, Default)]
pub struct SymbolDef {
    /// Narrowest domain known to contain the symbol's value.
    pub domain: DomainKind,
    /// Bound value, if any.
    pub value: Option<Expr>,
    /// Numeric approximation, for named constants.
    pub numeric: Option<NumericValue>,
    /// Whether reassignment is forbidden.
    pub constant: bool,
    /// Whether the domain was inferred from first assignment and may still
    /// be narrowed by an explicit declaration.
    pub inferred_domain: bool,
}

impl SymbolDef {
    /// Unbound symbol of a domain.
    pub fn of_domain(domain: DomainKind) -> Self {
        SymbolDef {
            domain,
            ..SymbolDef::default()
        }
    }

    /// Constant with a numeric approximation.
    pub fn constant(domain: DomainKind, numeric: NumericValue) -> Self {
        SymbolDef {
            domain,
            value: None,
            numeric: Some(numeric),
            constant: true,
            inferred_domain: false,
        }
    }

    /// Bind a value.
    #[must_use]
    pub fn with_value(mut self, value: Expr) -> Self {
        self.value = Some(value);
        self
    }
}

/// What a name resolves to.
#[derive(Clone)]
pub enum Definition {
    /// A symbol definition.
    Symbol(SymbolDef),
    /// A function definition.
    Function(Rc<FunctionDef>),
}

impl Definition {
    /// The function definition, when this is one.
    pub fn as_function(&self) -> Option<&Rc<FunctionDef>> {
        match self {
            Definition::Function(def) => Some(def),
            Definition::Symbol(_) => None,
        }
    }

    /// The symbol definition, when this is one.
    pub fn as_symbol(&self) -> Option<&SymbolDef> {
        match self {
            Definition::Symbol(def) => Some(def),
            Definition::Function(_) => None,
        }
    }

    /// Whether the definition was inferred (and may be replaced silently).
    pub fn is_inferred(&self) -> bool {
        match self {
            Definition::Symbol(def) => def.inferred_domain,
            Definition::Function(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_policies_cover_the_position_table() {
        let len = 4;
        let table: [(HoldPolicy, [bool; 4]); 6] = [
            (HoldPolicy::All, [true, true, true, true]),
            (HoldPolicy::None, [false, false, false, false]),
            (HoldPolicy::First, [true, false, false, false]),
            (HoldPolicy::Rest, [false, true, true, true]),
            (HoldPolicy::Last, [false, false, false, true]),
            (HoldPolicy::Most, [true, true, true, false]),
        ];
        for (policy, expected) in table {
            for (i, &held) in expected.iter().enumerate() {
                assert_eq!(policy.holds(i, len), held, "{policy:?} at {i}");
            }
        }
    }

    #[test]
    fn variadic_signatures_have_no_max_arity() {
        let sig = Signature::new(vec![DomainKind::Numbers], DomainKind::Numbers)
            .with_variadic(DomainKind::Numbers);
        assert_eq!(sig.min_arity(), 1);
        assert_eq!(sig.max_arity(), None);
        assert_eq!(sig.param_at(5), Some(DomainKind::Numbers));
    }
}
