//! Domain lattice.
//!
//! A finite set of named domains with a compatibility partial order.
//! Arithmetic widens operand domains (least upper bound) to infer result
//! domains; signature checks narrow. `Void` is the bottom element and is
//! compatible with everything; `Anything` is the top.

use std::fmt;

/// A domain: a type-like value drawn from a fixed lattice.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DomainKind {
    /// Top of the lattice.
    Anything,
    /// Function values.
    Functions,
    /// All non-function values.
    Values,
    /// Text values.
    Strings,
    /// Boolean values.
    Booleans,
    /// All numeric values.
    Numbers,
    /// Complex numbers plus the infinities.
    ExtendedComplexNumbers,
    /// Finite complex numbers.
    ComplexNumbers,
    /// Pure imaginary numbers.
    ImaginaryNumbers,
    /// Real numbers plus the infinities.
    ExtendedRealNumbers,
    /// Finite real numbers.
    RealNumbers,
    /// Algebraic numbers.
    AlgebraicNumbers,
    /// Rational numbers.
    RationalNumbers,
    /// Integers.
    Integers,
    /// Strictly positive integers.
    PositiveIntegers,
    /// Bottom of the lattice; compatible with everything.
    Void,
}

impl DomainKind {
    /// Immediate parent in the lattice; `None` for `Anything` and `Void`.
    pub fn parent(self) -> Option<DomainKind> {
        use DomainKind::{
            AlgebraicNumbers, Anything, Booleans, ComplexNumbers, ExtendedComplexNumbers,
            ExtendedRealNumbers, Functions, ImaginaryNumbers, Integers, Numbers,
            PositiveIntegers, RationalNumbers, RealNumbers, Strings, Values,
        };
        match self {
            DomainKind::Anything | DomainKind::Void => None,
            Functions | Values => Some(Anything),
            Strings | Booleans | Numbers => Some(Values),
            ExtendedComplexNumbers => Some(Numbers),
            ComplexNumbers => Some(ExtendedComplexNumbers),
            ImaginaryNumbers | ExtendedRealNumbers => Some(ComplexNumbers),
            RealNumbers => Some(ExtendedRealNumbers),
            AlgebraicNumbers => Some(RealNumbers),
            RationalNumbers => Some(AlgebraicNumbers),
            Integers => Some(RationalNumbers),
            PositiveIntegers => Some(Integers),
        }
    }

    /// Whether `self ⊑ sup`: every value of `self` is a value of `sup`.
    pub fn is_compatible(self, sup: DomainKind) -> bool {
        if self == DomainKind::Void || sup == DomainKind::Anything {
            return true;
        }
        let mut cursor = Some(self);
        while let Some(d) = cursor {
            if d == sup {
                return true;
            }
            cursor = d.parent();
        }
        false
    }

    /// Least upper bound of two domains.
    pub fn widen(self, other: DomainKind) -> DomainKind {
        if self == DomainKind::Void {
            return other;
        }
        if other == DomainKind::Void {
            return self;
        }
        let mut cursor = Some(self);
        while let Some(d) = cursor {
            if other.is_compatible(d) {
                return d;
            }
            cursor = d.parent();
        }
        DomainKind::Anything
    }

    /// Greatest lower bound, when one side is compatible with the other.
    /// Incomparable domains meet at `Void`.
    pub fn narrow(self, other: DomainKind) -> DomainKind {
        if self.is_compatible(other) {
            self
        } else if other.is_compatible(self) {
            other
        } else {
            DomainKind::Void
        }
    }

    /// Whether this is a numeric domain.
    pub fn is_numeric(self) -> bool {
        self.is_compatible(DomainKind::Numbers)
    }

    /// Stable display name.
    pub fn as_str(self) -> &'static str {
        match self {
            DomainKind::Anything => "Anything",
            DomainKind::Functions => "Functions",
            DomainKind::Values => "Values",
            DomainKind::Strings => "Strings",
            DomainKind::Booleans => "Booleans",
            DomainKind::Numbers => "Numbers",
            DomainKind::ExtendedComplexNumbers => "ExtendedComplexNumbers",
            DomainKind::ComplexNumbers => "ComplexNumbers",
            DomainKind::ImaginaryNumbers => "ImaginaryNumbers",
            DomainKind::ExtendedRealNumbers => "ExtendedRealNumbers",
            DomainKind::RealNumbers => "RealNumbers",
            DomainKind::AlgebraicNumbers => "AlgebraicNumbers",
            DomainKind::RationalNumbers => "RationalNumbers",
            DomainKind::Integers => "Integers",
            DomainKind::PositiveIntegers => "PositiveIntegers",
            DomainKind::Void => "Void",
        }
    }

    /// Ordinal used by content digests.
    pub(crate) fn ordinal(self) -> u8 {
        match self {
            DomainKind::Anything => 0,
            DomainKind::Functions => 1,
            DomainKind::Values => 2,
            DomainKind::Strings => 3,
            DomainKind::Booleans => 4,
            DomainKind::Numbers => 5,
            DomainKind::ExtendedComplexNumbers => 6,
            DomainKind::ComplexNumbers => 7,
            DomainKind::ImaginaryNumbers => 8,
            DomainKind::ExtendedRealNumbers => 9,
            DomainKind::RealNumbers => 10,
            DomainKind::AlgebraicNumbers => 11,
            DomainKind::RationalNumbers => 12,
            DomainKind::Integers => 13,
            DomainKind::PositiveIntegers => 14,
            DomainKind::Void => 15,
        }
    }
}

impl Default for DomainKind {
    fn default() -> Self {
        DomainKind::Anything
    }
}

impl fmt::Display for DomainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compatibility_follows_the_chain() {
        assert!(DomainKind::Integers.is_compatible(DomainKind::RealNumbers));
        assert!(DomainKind::Integers.is_compatible(DomainKind::Numbers));
        assert!(DomainKind::PositiveIntegers.is_compatible(DomainKind::ComplexNumbers));
        assert!(!DomainKind::RealNumbers.is_compatible(DomainKind::Integers));
        assert!(!DomainKind::Strings.is_compatible(DomainKind::Numbers));
    }

    #[test]
    fn void_and_anything_are_extremes() {
        assert!(DomainKind::Void.is_compatible(DomainKind::Integers));
        assert!(DomainKind::Functions.is_compatible(DomainKind::Anything));
        assert_eq!(
            DomainKind::Void.widen(DomainKind::Integers),
            DomainKind::Integers
        );
    }

    #[test]
    fn widen_is_least_upper_bound() {
        assert_eq!(
            DomainKind::Integers.widen(DomainKind::RationalNumbers),
            DomainKind::RationalNumbers
        );
        assert_eq!(
            DomainKind::ImaginaryNumbers.widen(DomainKind::RealNumbers),
            DomainKind::ComplexNumbers
        );
        assert_eq!(
            DomainKind::Strings.widen(DomainKind::Integers),
            DomainKind::Values
        );
    }

    #[test]
    fn narrow_is_greatest_lower_bound() {
        assert_eq!(
            DomainKind::RealNumbers.narrow(DomainKind::Integers),
            DomainKind::Integers
        );
        assert_eq!(
            DomainKind::Strings.narrow(DomainKind::Integers),
            DomainKind::Void
        );
    }
}
