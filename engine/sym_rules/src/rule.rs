//! Rules, rule sets, and the engine seam.

use crate::Substitution;
use sym_ir::{EngineResult, Expr, NumericValue, StringInterner};
use std::fmt;
use std::rc::Rc;

/// Engine services the rewriter and rule conditions depend on.
///
/// The engine sits above this crate, so it reaches back through this
/// dyn seam: conditions ask for sign and numeric queries, the rewriter
/// asks for canonicalisation, costs and deadline polls.
pub trait RewriteHost {
    /// The engine's interner (capture names resolve through it).
    fn interner(&self) -> &StringInterner;
    /// Canonicalise an expression.
    fn canonicalize(&mut self, expr: &Expr) -> Expr;
    /// Cost of an expression under the engine's cost function.
    fn cost(&mut self, expr: &Expr) -> u64;
    /// Poll the deadline; `Err(EngineError::Timeout)` past expiry.
    fn check_continue(&mut self) -> EngineResult<()>;
    /// The engine's numeric equality tolerance.
    fn tolerance(&self) -> f64;
    /// Sign of an expression, when it can be inferred: `-1`, `0`, `1`.
    fn sign_of(&mut self, expr: &Expr) -> Option<i8>;
    /// Numeric approximation, when the expression evaluates to a literal.
    fn numeric_approx(&mut self, expr: &Expr) -> Option<NumericValue>;
}

/// Side condition of a rule.
///
/// Receives the binding map and the engine (through the host seam) and
/// decides whether the rewrite may fire. Implemented by unit structs for
/// library rules; any matching closure works too.
pub trait RuleCondition {
    /// Whether the rule may fire under `bindings`.
    fn holds(&self, bindings: &Substitution, host: &mut dyn RewriteHost) -> bool;
}

impl<F> RuleCondition for F
where
    F: Fn(&Substitution, &mut dyn RewriteHost) -> bool,
{
    fn holds(&self, bindings: &Substitution, host: &mut dyn RewriteHost) -> bool {
        self(bindings, host)
    }
}

/// A match/replace pair with an optional side condition.
#[derive(Clone)]
pub struct Rule {
    pattern: Expr,
    replacement: Expr,
    condition: Option<Rc<dyn RuleCondition>>,
    id: Option<&'static str>,
}

impl Rule {
    /// Unconditional rule.
    pub fn new(pattern: Expr, replacement: Expr) -> Self {
        Rule {
            pattern,
            replacement,
            condition: None,
            id: None,
        }
    }

    /// Attach a side condition.
    #[must_use]
    pub fn when(mut self, condition: impl RuleCondition + 'static) -> Self {
        self.condition = Some(Rc::new(condition));
        self
    }

    /// Attach a diagnostic id.
    #[must_use]
    pub fn with_id(mut self, id: &'static str) -> Self {
        self.id = Some(id);
        self
    }

    /// The match pattern.
    pub fn pattern(&self) -> &Expr {
        &self.pattern
    }

    /// The replacement pattern.
    pub fn replacement(&self) -> &Expr {
        &self.replacement
    }

    /// The diagnostic id, if set.
    pub fn id(&self) -> Option<&'static str> {
        self.id
    }

    /// Evaluate the side condition (vacuously true when absent).
    pub fn condition_holds(&self, bindings: &Substitution, host: &mut dyn RewriteHost) -> bool {
        self.condition
            .as_ref()
            .is_none_or(|c| c.holds(bindings, host))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("conditional", &self.condition.is_some())
            .finish_non_exhaustive()
    }
}

/// An ordered sequence of rules, applied first to last.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Empty rule set.
    pub fn new() -> Self {
        RuleSet { rules: Vec::new() }
    }

    /// Append a rule.
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// The rules, in application order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        RuleSet {
            rules: iter.into_iter().collect(),
        }
    }
}
