//! Number kernel facade.
//!
//! Wraps the `num-*` kernel crates behind the primitives the engine needs:
//! construction, arithmetic, integer power, sqrt, ln, exp, trigonometry,
//! total comparison, and the classification queries. Three payload shapes:
//!
//! - `Rational` - exact big-rational arithmetic; integers are rationals
//!   with unit denominator
//! - `Float` - machine `f64`
//! - `Complex` - `f64` real and imaginary parts
//!
//! Exactness is preserved where the operation allows it (rational add/mul,
//! integer powers, perfect-square roots); anything irrational falls to the
//! machine representation. Mode policy (when to downcast, when to reject
//! complex results) belongs to the engine, not the kernel.

use crate::Digest;
use num_bigint::BigInt;
use num_complex::Complex64;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

/// A literal numeric value.
#[derive(Clone, Debug)]
pub enum NumericValue {
    /// Machine float.
    Float(f64),
    /// Exact rational; integers have unit denominator.
    Rational(BigRational),
    /// Complex value with machine-precision parts.
    Complex(Complex64),
}

impl NumericValue {
    /// Exact integer.
    pub fn int(n: i64) -> Self {
        NumericValue::Rational(BigRational::from_integer(BigInt::from(n)))
    }

    /// Exact big integer.
    pub fn big_int(n: BigInt) -> Self {
        NumericValue::Rational(BigRational::from_integer(n))
    }

    /// Exact rational; a zero denominator collapses to the corresponding
    /// infinity (or NaN for 0/0).
    pub fn rational(numer: i64, denom: i64) -> Self {
        if denom == 0 {
            return NumericValue::Float(match numer.cmp(&0) {
                Ordering::Greater => f64::INFINITY,
                Ordering::Less => f64::NEG_INFINITY,
                Ordering::Equal => f64::NAN,
            });
        }
        NumericValue::Rational(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    /// Machine float.
    pub fn float(v: f64) -> Self {
        NumericValue::Float(v)
    }

    /// Complex literal.
    pub fn complex(re: f64, im: f64) -> Self {
        NumericValue::Complex(Complex64::new(re, im))
    }

    /// Not-a-number.
    pub fn nan() -> Self {
        NumericValue::Float(f64::NAN)
    }

    // Classification

    /// True for an exact integer or an integral float.
    pub fn is_integer(&self) -> bool {
        match self {
            NumericValue::Rational(r) => r.is_integer(),
            NumericValue::Float(f) => f.is_finite() && f.fract() == 0.0,
            NumericValue::Complex(_) => false,
        }
    }

    /// True for zero in any representation.
    pub fn is_zero(&self) -> bool {
        match self {
            NumericValue::Rational(r) => r.is_zero(),
            NumericValue::Float(f) => *f == 0.0,
            NumericValue::Complex(c) => c.re == 0.0 && c.im == 0.0,
        }
    }

    /// True for one in any representation.
    pub fn is_one(&self) -> bool {
        match self {
            NumericValue::Rational(r) => r.is_integer() && r.numer() == r.denom(),
            NumericValue::Float(f) => *f == 1.0,
            NumericValue::Complex(c) => c.re == 1.0 && c.im == 0.0,
        }
    }

    /// True for negative one.
    pub fn is_negative_one(&self) -> bool {
        match self {
            NumericValue::Rational(r) => r.is_integer() && -r.numer() == *r.denom(),
            NumericValue::Float(f) => *f == -1.0,
            NumericValue::Complex(c) => c.re == -1.0 && c.im == 0.0,
        }
    }

    /// True when the value is finite (both parts, for complex).
    pub fn is_finite(&self) -> bool {
        match self {
            NumericValue::Rational(_) => true,
            NumericValue::Float(f) => f.is_finite(),
            NumericValue::Complex(c) => c.re.is_finite() && c.im.is_finite(),
        }
    }

    /// True for NaN in any part.
    pub fn is_nan(&self) -> bool {
        match self {
            NumericValue::Rational(_) => false,
            NumericValue::Float(f) => f.is_nan(),
            NumericValue::Complex(c) => c.re.is_nan() || c.im.is_nan(),
        }
    }

    /// True when the value has no imaginary part.
    pub fn is_real(&self) -> bool {
        match self {
            NumericValue::Complex(c) => c.im == 0.0,
            _ => true,
        }
    }

    /// Sign of a real value: `-1`, `0` or `1`. `None` for NaN and for
    /// complex values with a nonzero imaginary part.
    pub fn sign(&self) -> Option<i8> {
        match self {
            NumericValue::Rational(r) => Some(if r.is_zero() {
                0
            } else if r.is_negative() {
                -1
            } else {
                1
            }),
            NumericValue::Float(f) => {
                if f.is_nan() {
                    None
                } else if *f == 0.0 {
                    Some(0)
                } else if *f < 0.0 {
                    Some(-1)
                } else {
                    Some(1)
                }
            }
            NumericValue::Complex(c) => {
                if c.im != 0.0 {
                    None
                } else {
                    NumericValue::Float(c.re).sign()
                }
            }
        }
    }

    // Conversion

    /// Real part as `f64`; `None` for a properly complex value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumericValue::Rational(r) => Some(r.to_f64().unwrap_or(f64::NAN)),
            NumericValue::Float(f) => Some(*f),
            NumericValue::Complex(c) => (c.im == 0.0).then_some(c.re),
        }
    }

    /// Exact `i64`, when the value is an integer in range.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NumericValue::Rational(r) if r.is_integer() => r.numer().to_i64(),
            NumericValue::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                (*f >= i64::MIN as f64 && *f <= i64::MAX as f64).then_some(*f as i64)
            }
            _ => None,
        }
    }

    /// Widen to complex.
    pub fn to_complex(&self) -> Complex64 {
        match self {
            NumericValue::Rational(r) => Complex64::new(r.to_f64().unwrap_or(f64::NAN), 0.0),
            NumericValue::Float(f) => Complex64::new(*f, 0.0),
            NumericValue::Complex(c) => *c,
        }
    }

    /// Numerator, for exact rationals.
    pub fn numerator(&self) -> Option<BigInt> {
        match self {
            NumericValue::Rational(r) => Some(r.numer().clone()),
            _ => None,
        }
    }

    /// Denominator, for exact rationals.
    pub fn denominator(&self) -> Option<BigInt> {
        match self {
            NumericValue::Rational(r) => Some(r.denom().clone()),
            _ => None,
        }
    }

    /// Collapse a complex value with zero imaginary part to its real form;
    /// other values pass through unchanged.
    #[must_use]
    pub fn demoted(self) -> Self {
        match self {
            NumericValue::Complex(c) if c.im == 0.0 => NumericValue::Float(c.re),
            other => other,
        }
    }

    /// Downcast an exact rational to machine precision; other values pass
    /// through unchanged.
    #[must_use]
    pub fn to_machine(self) -> Self {
        match self {
            NumericValue::Rational(r) => NumericValue::Float(r.to_f64().unwrap_or(f64::NAN)),
            other => other,
        }
    }

    // Arithmetic

    /// Addition, preserving exactness when both operands are rational.
    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (NumericValue::Rational(a), NumericValue::Rational(b)) => {
                NumericValue::Rational(a + b)
            }
            _ => {
                if self.is_real() && other.is_real() {
                    NumericValue::Float(
                        self.as_f64().unwrap_or(f64::NAN) + other.as_f64().unwrap_or(f64::NAN),
                    )
                } else {
                    NumericValue::Complex(self.to_complex() + other.to_complex()).demoted()
                }
            }
        }
    }

    /// Multiplication, preserving exactness when both operands are rational.
    pub fn mul(&self, other: &Self) -> Self {
        match (self, other) {
            (NumericValue::Rational(a), NumericValue::Rational(b)) => {
                NumericValue::Rational(a * b)
            }
            _ => {
                if self.is_real() && other.is_real() {
                    NumericValue::Float(
                        self.as_f64().unwrap_or(f64::NAN) * other.as_f64().unwrap_or(f64::NAN),
                    )
                } else {
                    NumericValue::Complex(self.to_complex() * other.to_complex()).demoted()
                }
            }
        }
    }

    /// Negation.
    pub fn neg(&self) -> Self {
        match self {
            NumericValue::Rational(r) => NumericValue::Rational(-r),
            NumericValue::Float(f) => NumericValue::Float(-f),
            NumericValue::Complex(c) => NumericValue::Complex(-c),
        }
    }

    /// Division. Division by exact zero yields the signed infinity of the
    /// numerator (NaN for 0/0), matching float semantics.
    pub fn div(&self, other: &Self) -> Self {
        match (self, other) {
            (NumericValue::Rational(a), NumericValue::Rational(b)) if !b.is_zero() => {
                NumericValue::Rational(a / b)
            }
            _ => {
                if self.is_real() && other.is_real() {
                    NumericValue::Float(
                        self.as_f64().unwrap_or(f64::NAN) / other.as_f64().unwrap_or(f64::NAN),
                    )
                } else {
                    NumericValue::Complex(self.to_complex() / other.to_complex()).demoted()
                }
            }
        }
    }

    /// Integer power, exact for rational bases.
    pub fn pow_int(&self, exp: i64) -> Self {
        match self {
            NumericValue::Rational(r) => {
                if exp == 0 {
                    return NumericValue::int(1);
                }
                if r.is_zero() && exp < 0 {
                    return NumericValue::Float(f64::INFINITY);
                }
                let mag = usize::try_from(exp.unsigned_abs()).unwrap_or(usize::MAX);
                let numer = num_traits::pow(r.numer().clone(), mag);
                let denom = num_traits::pow(r.denom().clone(), mag);
                if exp > 0 {
                    NumericValue::Rational(BigRational::new(numer, denom))
                } else {
                    NumericValue::Rational(BigRational::new(denom, numer))
                }
            }
            NumericValue::Float(f) => {
                let clamped = exp.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
                NumericValue::Float(f.powi(clamped))
            }
            NumericValue::Complex(c) => {
                let clamped = exp.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
                NumericValue::Complex(c.powi(clamped)).demoted()
            }
        }
    }

    /// General power. Integer exponents stay exact; a negative real base
    /// with a non-integer exponent moves to the complex plane.
    pub fn pow(&self, exp: &Self) -> Self {
        if let Some(e) = exp.as_i64() {
            return self.pow_int(e);
        }
        match (self, exp) {
            _ if !self.is_real() || !exp.is_real() => {
                NumericValue::Complex(self.to_complex().powc(exp.to_complex())).demoted()
            }
            _ => {
                let base = self.as_f64().unwrap_or(f64::NAN);
                let e = exp.as_f64().unwrap_or(f64::NAN);
                if base < 0.0 {
                    NumericValue::Complex(Complex64::new(base, 0.0).powf(e)).demoted()
                } else {
                    NumericValue::Float(base.powf(e))
                }
            }
        }
    }

    /// Square root. Perfect squares of non-negative rationals stay exact;
    /// negative reals yield a pure imaginary result.
    pub fn sqrt(&self) -> Self {
        match self {
            NumericValue::Rational(r) if !r.is_negative() => {
                let ns = r.numer().sqrt();
                let ds = r.denom().sqrt();
                if &(&ns * &ns) == r.numer() && &(&ds * &ds) == r.denom() {
                    NumericValue::Rational(BigRational::new(ns, ds))
                } else {
                    NumericValue::Float(r.to_f64().unwrap_or(f64::NAN).sqrt())
                }
            }
            NumericValue::Rational(r) => {
                let mag = (-r.to_f64().unwrap_or(f64::NAN)).sqrt();
                NumericValue::Complex(Complex64::new(0.0, mag))
            }
            NumericValue::Float(f) if *f >= 0.0 => NumericValue::Float(f.sqrt()),
            NumericValue::Float(f) if f.is_nan() => NumericValue::Float(f64::NAN),
            NumericValue::Float(f) => NumericValue::Complex(Complex64::new(0.0, (-f).sqrt())),
            NumericValue::Complex(c) => NumericValue::Complex(c.sqrt()).demoted(),
        }
    }

    /// Natural logarithm. Negative reals move to the complex plane;
    /// `ln 0` is negative infinity.
    pub fn ln(&self) -> Self {
        match self {
            _ if self.is_nan() => NumericValue::Float(f64::NAN),
            _ if self.is_zero() => NumericValue::Float(f64::NEG_INFINITY),
            _ if !self.is_real() => NumericValue::Complex(self.to_complex().ln()).demoted(),
            _ => {
                let v = self.as_f64().unwrap_or(f64::NAN);
                if v < 0.0 {
                    NumericValue::Complex(Complex64::new(v, 0.0).ln())
                } else {
                    NumericValue::Float(v.ln())
                }
            }
        }
    }

    /// Natural exponential.
    pub fn exp(&self) -> Self {
        match self {
            NumericValue::Complex(c) => NumericValue::Complex(c.exp()).demoted(),
            _ => NumericValue::Float(self.as_f64().unwrap_or(f64::NAN).exp()),
        }
    }

    /// Sine.
    pub fn sin(&self) -> Self {
        match self {
            NumericValue::Complex(c) => NumericValue::Complex(c.sin()).demoted(),
            _ => NumericValue::Float(self.as_f64().unwrap_or(f64::NAN).sin()),
        }
    }

    /// Cosine.
    pub fn cos(&self) -> Self {
        match self {
            NumericValue::Complex(c) => NumericValue::Complex(c.cos()).demoted(),
            _ => NumericValue::Float(self.as_f64().unwrap_or(f64::NAN).cos()),
        }
    }

    /// Tangent.
    pub fn tan(&self) -> Self {
        match self {
            NumericValue::Complex(c) => NumericValue::Complex(c.tan()).demoted(),
            _ => NumericValue::Float(self.as_f64().unwrap_or(f64::NAN).tan()),
        }
    }

    /// Absolute value; the modulus, for complex values.
    pub fn abs(&self) -> Self {
        match self {
            NumericValue::Rational(r) => NumericValue::Rational(r.abs()),
            NumericValue::Float(f) => NumericValue::Float(f.abs()),
            NumericValue::Complex(c) => NumericValue::Float(c.norm()),
        }
    }

    // Comparison

    /// Total order over numeric values: by real part, then imaginary part.
    /// Rational pairs compare exactly; NaN sorts last (via `f64::total_cmp`).
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        if let (NumericValue::Rational(a), NumericValue::Rational(b)) = (self, other) {
            return a.cmp(b);
        }
        let (ar, ai) = match self {
            NumericValue::Complex(c) => (c.re, c.im),
            _ => (self.as_f64().unwrap_or(f64::NAN), 0.0),
        };
        let (br, bi) = match other {
            NumericValue::Complex(c) => (c.re, c.im),
            _ => (other.as_f64().unwrap_or(f64::NAN), 0.0),
        };
        ar.total_cmp(&br).then_with(|| ai.total_cmp(&bi))
    }

    /// Equality within an absolute tolerance, over the complex plane.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        if let (NumericValue::Rational(a), NumericValue::Rational(b)) = (self, other) {
            if a == b {
                return true;
            }
        }
        let d = self.to_complex() - other.to_complex();
        d.norm() <= tolerance
    }

    /// Fold this value into a content digest.
    pub fn digest_into(&self, digest: &mut Digest) {
        match self {
            NumericValue::Float(f) => {
                digest.write_u8(0);
                digest.write_u64(f.to_bits());
            }
            NumericValue::Rational(r) => {
                digest.write_u8(1);
                let (sign, bytes) = r.numer().to_bytes_le();
                digest.write_u8(match sign {
                    num_bigint::Sign::Minus => 0,
                    num_bigint::Sign::NoSign => 1,
                    num_bigint::Sign::Plus => 2,
                });
                digest.write(&bytes);
                let (_, dbytes) = r.denom().to_bytes_le();
                digest.write(&dbytes);
            }
            NumericValue::Complex(c) => {
                digest.write_u8(2);
                digest.write_u64(c.re.to_bits());
                digest.write_u64(c.im.to_bits());
            }
        }
    }
}

/// Representation equality: exact per-variant comparison, with float parts
/// compared bitwise so the hash law (`is_same ⇒ equal digests`) holds.
/// Mathematical equality across representations is the evaluator's job.
impl PartialEq for NumericValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NumericValue::Float(a), NumericValue::Float(b)) => a.to_bits() == b.to_bits(),
            (NumericValue::Rational(a), NumericValue::Rational(b)) => a == b,
            (NumericValue::Complex(a), NumericValue::Complex(b)) => {
                a.re.to_bits() == b.re.to_bits() && a.im.to_bits() == b.im.to_bits()
            }
            _ => false,
        }
    }
}

impl Eq for NumericValue {}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Rational(r) => {
                if r.is_integer() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            NumericValue::Float(v) => {
                if v.is_nan() {
                    f.write_str("NaN")
                } else if v.is_infinite() {
                    f.write_str(if *v > 0.0 { "Infinity" } else { "-Infinity" })
                } else {
                    write!(f, "{v}")
                }
            }
            NumericValue::Complex(c) => {
                if c.im < 0.0 {
                    write!(f, "({}-{}i)", c.re, -c.im)
                } else {
                    write!(f, "({}+{}i)", c.re, c.im)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rational_arithmetic_stays_exact() {
        let a = NumericValue::rational(2, 3);
        let b = NumericValue::rational(1, 3);
        assert_eq!(a.add(&b), NumericValue::int(1));
        assert_eq!(a.mul(&b), NumericValue::rational(2, 9));
    }

    #[test]
    fn integer_pow_is_exact() {
        let half = NumericValue::rational(1, 2);
        assert_eq!(half.pow_int(3), NumericValue::rational(1, 8));
        assert_eq!(half.pow_int(-2), NumericValue::int(4));
        assert_eq!(NumericValue::int(0).pow_int(0), NumericValue::int(1));
    }

    #[test]
    fn perfect_square_roots_stay_exact() {
        assert_eq!(NumericValue::int(49).sqrt(), NumericValue::int(7));
        assert_eq!(
            NumericValue::rational(9, 4).sqrt(),
            NumericValue::rational(3, 2)
        );
    }

    #[test]
    fn negative_sqrt_is_imaginary() {
        let r = NumericValue::int(-4).sqrt();
        assert!(r.approx_eq(&NumericValue::complex(0.0, 2.0), 1e-12));
        assert!(!r.is_real());
    }

    #[test]
    fn sign_classification() {
        assert_eq!(NumericValue::rational(-3, 7).sign(), Some(-1));
        assert_eq!(NumericValue::int(0).sign(), Some(0));
        assert_eq!(NumericValue::float(2.5).sign(), Some(1));
        assert_eq!(NumericValue::nan().sign(), None);
        assert_eq!(NumericValue::complex(1.0, 1.0).sign(), None);
    }

    #[test]
    fn total_order_is_real_then_imaginary() {
        let two = NumericValue::int(2);
        let e = NumericValue::float(std::f64::consts::E);
        assert_eq!(two.total_cmp(&e), Ordering::Less);
        let i = NumericValue::complex(0.0, 1.0);
        let zero = NumericValue::int(0);
        assert_eq!(zero.total_cmp(&i), Ordering::Less);
    }

    #[test]
    fn demotion_collapses_real_complex() {
        let c = NumericValue::complex(3.0, 0.0).demoted();
        assert_eq!(c, NumericValue::float(3.0));
    }

    #[test]
    fn display_forms() {
        assert_eq!(NumericValue::rational(7, 2).to_string(), "7/2");
        assert_eq!(NumericValue::int(-5).to_string(), "-5");
        assert_eq!(NumericValue::complex(1.0, -2.0).to_string(), "(1-2i)");
        assert_eq!(NumericValue::float(f64::INFINITY).to_string(), "Infinity");
    }
}
