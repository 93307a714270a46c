//! Side conditions of the root rules.
//!
//! Each condition is a unit-style struct implementing `RuleCondition`;
//! they receive the binding map and reach engine services (sign queries,
//! canonicalisation) through the host seam.

use sym_ir::{known, Expr, Name, NumericValue};
use sym_rules::{RewriteHost, RuleCondition, Substitution};

/// The capture standing for the unknown must have bound the reserved
/// placeholder symbol itself, and every coefficient capture must be free
/// of it.
pub(crate) struct UnknownAndFree {
    pub placeholder: Name,
    pub free: Vec<Name>,
}

impl UnknownAndFree {
    pub(crate) fn check(&self, bindings: &Substitution) -> bool {
        let unknown_ok = bindings
            .get(self.placeholder)
            .is_some_and(|e| e.symbol_name() == Some(self.placeholder));
        unknown_ok
            && self.free.iter().all(|capture| {
                bindings
                    .get(*capture)
                    .is_none_or(|e| !e.has_symbol(self.placeholder))
            })
    }
}

impl RuleCondition for UnknownAndFree {
    fn holds(&self, bindings: &Substitution, _host: &mut dyn RewriteHost) -> bool {
        self.check(bindings)
    }
}

/// `UnknownAndFree`, plus a nonzero literal exponent.
pub(crate) struct NonZeroExponent {
    pub base: UnknownAndFree,
    pub exponent: Name,
}

impl RuleCondition for NonZeroExponent {
    fn holds(&self, bindings: &Substitution, _host: &mut dyn RewriteHost) -> bool {
        if !self.base.check(bindings) {
            return false;
        }
        bindings
            .get(self.exponent)
            .and_then(Expr::numeric_value)
            .is_some_and(|v| !v.is_zero())
    }
}

/// `UnknownAndFree`, plus `a` nonzero and `-c/a` not provably
/// non-positive (the logarithm's argument must be allowed positive).
pub(crate) struct PositiveLogArgument {
    pub base: UnknownAndFree,
    /// The leading coefficient capture; `None` means the coefficient is 1.
    pub a: Option<Name>,
    /// The constant-term capture.
    pub c: Name,
}

impl RuleCondition for PositiveLogArgument {
    fn holds(&self, bindings: &Substitution, host: &mut dyn RewriteHost) -> bool {
        if !self.base.check(bindings) {
            return false;
        }
        let Some(c) = bindings.get(self.c).cloned() else {
            return false;
        };
        let argument = match self.a.and_then(|a| bindings.get(a).cloned()) {
            Some(a) => {
                if host.sign_of(&a) == Some(0) {
                    return false;
                }
                Expr::apply_symbol(
                    known::DIVIDE,
                    vec![Expr::apply_symbol(known::NEGATE, vec![c]), a],
                )
            }
            None => Expr::apply_symbol(known::NEGATE, vec![c]),
        };
        let argument = host.canonicalize(&argument);
        // Reject only when the argument is provably zero or negative.
        match host.sign_of(&argument) {
            Some(s) => s > 0,
            None => !argument
                .numeric_value()
                .is_some_and(NumericValue::is_nan),
        }
    }
}
