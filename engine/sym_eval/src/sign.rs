//! Sign inference.
//!
//! Combines literal signs, per-scope assumptions, definition sign handlers
//! and the structural rules of the arithmetic heads. Inference is
//! conservative: anything it cannot prove is `Unknown`.

use crate::engine::Engine;
use sym_ir::{known, EngineResult, Expr, ExprKind, NumericValue};

/// Result of the `sgn` query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sgn {
    /// Provably negative.
    Negative,
    /// Provably zero.
    Zero,
    /// Provably positive.
    Positive,
    /// Sign not determinable.
    Unknown,
    /// Provably not a real number.
    NotReal,
}

impl Sgn {
    /// Numeric rendering for handlers: `-1`, `0`, `1`; `None` otherwise.
    pub fn as_i8(self) -> Option<i8> {
        match self {
            Sgn::Negative => Some(-1),
            Sgn::Zero => Some(0),
            Sgn::Positive => Some(1),
            Sgn::Unknown | Sgn::NotReal => None,
        }
    }

    fn from_i8(v: i8) -> Sgn {
        match v {
            0 => Sgn::Zero,
            n if n < 0 => Sgn::Negative,
            _ => Sgn::Positive,
        }
    }

    fn flip(self) -> Sgn {
        match self {
            Sgn::Negative => Sgn::Positive,
            Sgn::Positive => Sgn::Negative,
            other => other,
        }
    }
}

fn literal_sign(v: &NumericValue) -> Sgn {
    if v.is_nan() {
        return Sgn::Unknown;
    }
    if !v.is_real() {
        return Sgn::NotReal;
    }
    v.sign().map_or(Sgn::Unknown, Sgn::from_i8)
}

/// Infer the sign of `expr`.
pub(crate) fn sgn(engine: &mut Engine, expr: &Expr) -> EngineResult<Sgn> {
    engine.should_continue()?;
    match expr.kind() {
        ExprKind::Number(v) => Ok(literal_sign(v)),
        ExprKind::Symbol(name) => {
            if let Some(condition) = engine.assumed_sign(*name) {
                if let Some(s) = condition.definite_sign() {
                    return Ok(Sgn::from_i8(s));
                }
            }
            if let Some(v) = engine.constant_numeric(*name) {
                return Ok(literal_sign(&v));
            }
            Ok(Sgn::Unknown)
        }
        ExprKind::Function { ops, .. } => {
            let Some(name) = expr.head_symbol() else {
                return Ok(Sgn::Unknown);
            };
            // A registered sign handler wins.
            if let Some(def) = engine.lookup_function(name) {
                if let Some(handler) = def.sign_handler() {
                    if let Some(s) = handler(engine, ops)? {
                        return Ok(Sgn::from_i8(s));
                    }
                }
            }
            structural_sign(engine, name, ops)
        }
        _ => Ok(Sgn::Unknown),
    }
}

fn structural_sign(engine: &mut Engine, name: sym_ir::Name, ops: &[Expr]) -> EngineResult<Sgn> {
    if name == known::NEGATE {
        let inner = ops.first().map_or(Ok(Sgn::Unknown), |op| sgn(engine, op))?;
        return Ok(inner.flip());
    }
    if name == known::ABS {
        return Ok(match ops.first().map_or(Ok(Sgn::Unknown), |op| sgn(engine, op))? {
            Sgn::Zero => Sgn::Zero,
            Sgn::Positive | Sgn::Negative => Sgn::Positive,
            _ => Sgn::Unknown,
        });
    }
    if name == known::EXP {
        // Real exponentials are strictly positive.
        return Ok(match ops.first().map_or(Ok(Sgn::Unknown), |op| sgn(engine, op))? {
            Sgn::NotReal => Sgn::NotReal,
            _ => Sgn::Positive,
        });
    }
    if name == known::SQRT {
        return Ok(match ops.first().map_or(Ok(Sgn::Unknown), |op| sgn(engine, op))? {
            Sgn::Positive => Sgn::Positive,
            Sgn::Zero => Sgn::Zero,
            Sgn::Negative => Sgn::NotReal,
            other => other,
        });
    }
    if name == known::MULTIPLY {
        let mut acc = Sgn::Positive;
        for op in ops {
            acc = match (acc, sgn(engine, op)?) {
                (_, Sgn::NotReal) | (Sgn::NotReal, _) => return Ok(Sgn::NotReal),
                (_, Sgn::Zero) => return Ok(Sgn::Zero),
                (Sgn::Unknown, _) | (_, Sgn::Unknown) => Sgn::Unknown,
                (a, Sgn::Negative) => a.flip(),
                (a, _) => a,
            };
        }
        return Ok(acc);
    }
    if name == known::ADD {
        let mut saw_positive = false;
        let mut saw_negative = false;
        let mut all_known = true;
        for op in ops {
            match sgn(engine, op)? {
                Sgn::Positive => saw_positive = true,
                Sgn::Negative => saw_negative = true,
                Sgn::Zero => {}
                Sgn::NotReal => return Ok(Sgn::NotReal),
                Sgn::Unknown => all_known = false,
            }
        }
        return Ok(match (all_known, saw_positive, saw_negative) {
            (true, true, false) => Sgn::Positive,
            (true, false, true) => Sgn::Negative,
            (true, false, false) => Sgn::Zero,
            _ => Sgn::Unknown,
        });
    }
    if name == known::POWER {
        // A positive base keeps a real power positive.
        if let Some(base) = ops.first() {
            if sgn(engine, base)? == Sgn::Positive {
                return Ok(Sgn::Positive);
            }
        }
        return Ok(Sgn::Unknown);
    }
    if name == known::SQUARE {
        return Ok(match ops.first().map_or(Ok(Sgn::Unknown), |op| sgn(engine, op))? {
            Sgn::Zero => Sgn::Zero,
            Sgn::Positive | Sgn::Negative => Sgn::Positive,
            Sgn::NotReal => Sgn::Unknown,
            Sgn::Unknown => Sgn::Unknown,
        });
    }
    Ok(Sgn::Unknown)
}
