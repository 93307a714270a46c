//! Per-scope assumptions.
//!
//! Assumptions are predicates over symbols consumed by sign and domain
//! queries. They live on the scope: pushing a scope copies the parent's
//! assumptions, so an assumption made inside a nested computation is
//! forgotten when the scope pops.

use rustc_hash::FxHashMap;
use sym_ir::{DomainKind, Name};

/// Sign predicate assumed for a symbol.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SignCondition {
    /// Strictly greater than zero.
    Positive,
    /// Greater than or equal to zero.
    NonNegative,
    /// Exactly zero.
    Zero,
    /// Anything but zero.
    NonZero,
    /// Less than or equal to zero.
    NonPositive,
    /// Strictly less than zero.
    Negative,
}

impl SignCondition {
    /// The definite sign this condition pins down, if it pins one down.
    pub fn definite_sign(self) -> Option<i8> {
        match self {
            SignCondition::Positive => Some(1),
            SignCondition::Zero => Some(0),
            SignCondition::Negative => Some(-1),
            _ => None,
        }
    }

    /// Whether a value of this condition can be zero.
    pub fn admits_zero(self) -> bool {
        matches!(
            self,
            SignCondition::NonNegative | SignCondition::Zero | SignCondition::NonPositive
        )
    }
}

/// The assumptions attached to one scope.
#[derive(Clone, Debug, Default)]
pub struct AssumptionSet {
    signs: FxHashMap<Name, SignCondition>,
    domains: FxHashMap<Name, DomainKind>,
}

impl AssumptionSet {
    /// Empty set.
    pub fn new() -> Self {
        AssumptionSet::default()
    }

    /// Assume a sign condition for a symbol, replacing any previous one.
    pub fn assume_sign(&mut self, symbol: Name, condition: SignCondition) {
        self.signs.insert(symbol, condition);
    }

    /// Assume a domain for a symbol, replacing any previous one.
    pub fn assume_domain(&mut self, symbol: Name, domain: DomainKind) {
        self.domains.insert(symbol, domain);
    }

    /// Drop every assumption about a symbol.
    pub fn forget(&mut self, symbol: Name) {
        self.signs.remove(&symbol);
        self.domains.remove(&symbol);
    }

    /// The assumed sign condition, if any.
    pub fn sign_of(&self, symbol: Name) -> Option<SignCondition> {
        self.signs.get(&symbol).copied()
    }

    /// The assumed domain, if any.
    pub fn domain_of(&self, symbol: Name) -> Option<DomainKind> {
        self.domains.get(&symbol).copied()
    }

    /// Number of assumed facts.
    pub fn len(&self) -> usize {
        self.signs.len() + self.domains.len()
    }

    /// Whether nothing is assumed.
    pub fn is_empty(&self) -> bool {
        self.signs.is_empty() && self.domains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sym_ir::StringInterner;

    #[test]
    fn assumptions_are_per_symbol() {
        let interner = StringInterner::new();
        let (x, y) = (interner.intern("x"), interner.intern("y"));
        let mut set = AssumptionSet::new();
        set.assume_sign(x, SignCondition::Positive);
        set.assume_domain(y, DomainKind::Integers);
        assert_eq!(set.sign_of(x), Some(SignCondition::Positive));
        assert_eq!(set.sign_of(y), None);
        assert_eq!(set.domain_of(y), Some(DomainKind::Integers));
        set.forget(x);
        assert!(set.sign_of(x).is_none());
    }
}
