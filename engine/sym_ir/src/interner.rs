//! String interner for identifier storage.
//!
//! Provides O(1) interning and lookup. The engine is single-threaded by
//! contract, so interior mutability is a plain `RefCell`; interned strings
//! are leaked to obtain a stable `&'static str` for the lifetime of the
//! process (engines are expected to live as long as their expressions).

use crate::Name;
use rustc_hash::FxHashMap;
use std::cell::RefCell;

/// Well-known pre-interned identifiers.
///
/// `StringInterner::new` interns [`PRE_INTERNED`] in declaration order, so
/// each constant here is the `Name` of the string at the same index. The
/// alignment is asserted by a unit test.
///
/// [`PRE_INTERNED`]: self::PRE_INTERNED
pub mod known {
    use crate::Name;

    /// Head of an n-ary sum.
    pub const ADD: Name = Name::from_raw(1);
    /// Binary subtraction (canonicalises into `Add`/`Negate`).
    pub const SUBTRACT: Name = Name::from_raw(2);
    /// Head of an n-ary product.
    pub const MULTIPLY: Name = Name::from_raw(3);
    /// Binary division (canonicalises into `Multiply`/`Power`).
    pub const DIVIDE: Name = Name::from_raw(4);
    /// Unary negation; an involution.
    pub const NEGATE: Name = Name::from_raw(5);
    /// Binary exponentiation.
    pub const POWER: Name = Name::from_raw(6);
    /// Square root.
    pub const SQRT: Name = Name::from_raw(7);
    /// Square.
    pub const SQUARE: Name = Name::from_raw(8);
    /// Natural exponential.
    pub const EXP: Name = Name::from_raw(9);
    /// Natural logarithm.
    pub const LN: Name = Name::from_raw(10);
    /// Absolute value.
    pub const ABS: Name = Name::from_raw(11);
    /// Finite ordered collection.
    pub const LIST: Name = Name::from_raw(12);
    /// Splice marker; never survives canonicalisation as an operand.
    pub const SEQUENCE: Name = Name::from_raw(13);
    /// Evaluation shield.
    pub const HOLD: Name = Name::from_raw(14);
    /// Evaluation shield release.
    pub const RELEASE_HOLD: Name = Name::from_raw(15);
    /// In-band error wrapper head.
    pub const ERROR: Name = Name::from_raw(16);
    /// Anonymous function constructor.
    pub const FUNCTION: Name = Name::from_raw(17);
    /// Equation head.
    pub const EQUAL: Name = Name::from_raw(18);
    /// Sine.
    pub const SIN: Name = Name::from_raw(19);
    /// Cosine.
    pub const COS: Name = Name::from_raw(20);
    /// Tangent.
    pub const TAN: Name = Name::from_raw(21);
    /// The constant pi.
    pub const PI: Name = Name::from_raw(22);
    /// The constant e.
    pub const EXPONENTIAL_E: Name = Name::from_raw(23);
    /// The imaginary unit.
    pub const IMAGINARY_UNIT: Name = Name::from_raw(24);
    /// Positive infinity.
    pub const POSITIVE_INFINITY: Name = Name::from_raw(25);
    /// Negative infinity.
    pub const NEGATIVE_INFINITY: Name = Name::from_raw(26);
    /// Not-a-number.
    pub const NAN: Name = Name::from_raw(27);
    /// Boolean true.
    pub const TRUE: Name = Name::from_raw(28);
    /// Boolean false.
    pub const FALSE: Name = Name::from_raw(29);
    /// The unit/absent value.
    pub const NOTHING: Name = Name::from_raw(30);
    /// Synthesised head of number literals.
    pub const NUMBER: Name = Name::from_raw(31);
    /// Synthesised head of string literals.
    pub const STRING: Name = Name::from_raw(32);
    /// Synthesised head of bare symbols.
    pub const SYMBOL: Name = Name::from_raw(33);
    /// Synthesised head of tensor literals.
    pub const TENSOR: Name = Name::from_raw(34);
    /// Synthesised head of domain literals.
    pub const DOMAIN: Name = Name::from_raw(35);
    /// Arithmetic range collection.
    pub const RANGE: Name = Name::from_raw(36);
    /// Finite set collection.
    pub const SET: Name = Name::from_raw(37);
    /// Symbolic integral (inert here).
    pub const INTEGRATE: Name = Name::from_raw(38);
    /// Numeric integral.
    pub const NINTEGRATE: Name = Name::from_raw(39);
    /// Symbolic limit (inert here).
    pub const LIMIT: Name = Name::from_raw(40);
    /// Numeric limit.
    pub const NLIMIT: Name = Name::from_raw(41);
    /// Numeric-approximation wrapper.
    pub const N: Name = Name::from_raw(42);
}

/// Strings interned at construction, aligned with the [`known`] constants.
pub(crate) const PRE_INTERNED: &[&str] = &[
    "",
    "Add",
    "Subtract",
    "Multiply",
    "Divide",
    "Negate",
    "Power",
    "Sqrt",
    "Square",
    "Exp",
    "Ln",
    "Abs",
    "List",
    "Sequence",
    "Hold",
    "ReleaseHold",
    "Error",
    "Function",
    "Equal",
    "Sin",
    "Cos",
    "Tan",
    "Pi",
    "ExponentialE",
    "ImaginaryUnit",
    "PositiveInfinity",
    "NegativeInfinity",
    "NaN",
    "True",
    "False",
    "Nothing",
    "Number",
    "String",
    "Symbol",
    "Tensor",
    "Domain",
    "Range",
    "Set",
    "Integrate",
    "NIntegrate",
    "Limit",
    "NLimit",
    "N",
];

/// Interner state behind the `RefCell`.
struct InternerState {
    map: FxHashMap<&'static str, Name>,
    strings: Vec<&'static str>,
}

/// String interner owned by one engine.
///
/// Not thread-safe; the engine that owns it is single-threaded by contract.
pub struct StringInterner {
    state: RefCell<InternerState>,
}

impl StringInterner {
    /// Create a new interner with the standard identifiers pre-interned.
    pub fn new() -> Self {
        let mut state = InternerState {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        for &s in PRE_INTERNED {
            let name = Name::from_raw(u32::try_from(state.strings.len()).unwrap_or(u32::MAX));
            state.map.insert(s, name);
            state.strings.push(s);
        }
        StringInterner {
            state: RefCell::new(state),
        }
    }

    /// Intern a string, returning its `Name`.
    pub fn intern(&self, s: &str) -> Name {
        let mut state = self.state.borrow_mut();
        if let Some(&name) = state.map.get(s) {
            return name;
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let name = Name::from_raw(u32::try_from(state.strings.len()).unwrap_or(u32::MAX));
        state.map.insert(leaked, name);
        state.strings.push(leaked);
        name
    }

    /// Look up a previously interned string without interning.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.state.borrow().map.get(s).copied()
    }

    /// Resolve a `Name` back to its string.
    ///
    /// Returns the empty string for a name this interner never produced.
    pub fn resolve(&self, name: Name) -> &'static str {
        self.state
            .borrow()
            .strings
            .get(name.raw() as usize)
            .copied()
            .unwrap_or("")
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.state.borrow().strings.len()
    }

    /// Whether the interner is empty (never true: standard names are
    /// pre-interned).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `s` satisfies the identifier grammar: a letter or underscore
/// followed by letters, digits or underscores.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Whether `s` names a capture variable (`_name` or `__name`) or an
/// implicit anonymous-function parameter (`_`, `_1`, `_2`, ...).
pub fn is_wildcard(s: &str) -> bool {
    s.starts_with('_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_align_with_pre_interned() {
        let interner = StringInterner::new();
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.intern("Add"), known::ADD);
        assert_eq!(interner.intern("Multiply"), known::MULTIPLY);
        assert_eq!(interner.intern("Sequence"), known::SEQUENCE);
        assert_eq!(interner.intern("ReleaseHold"), known::RELEASE_HOLD);
        assert_eq!(interner.intern("NLimit"), known::NLIMIT);
        assert_eq!(interner.intern("N"), known::N);
        assert_eq!(interner.len(), PRE_INTERNED.len());
    }

    #[test]
    fn intern_is_idempotent() {
        let interner = StringInterner::new();
        let a = interner.intern("x");
        let b = interner.intern("x");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "x");
    }

    #[test]
    fn identifier_grammar() {
        assert!(is_valid_identifier("x"));
        assert!(is_valid_identifier("_x"));
        assert!(is_valid_identifier("alpha_2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2x"));
        assert!(!is_valid_identifier("a-b"));
    }
}
