//! Numeric short paths of the canonicaliser.
//!
//! `Add`, `Multiply`, `Negate`, `Square`, `Sqrt`, `Divide`, `Power`, `Exp`
//! and `Ln` skip definition dispatch: their canonical forms are built
//! directly here. Literal folding stays **exact** - rationals fold through
//! the kernel, irrational results (`Sqrt 2`, `Exp 1`) stay symbolic and are
//! only approximated by the numeric pass.

use super::{canonical_operand, is_collection, order};
use crate::engine::Engine;
use sym_ir::{
    incompatible_domain, known, missing_operand, unexpected_argument, EngineResult, Expr,
    ExprKind, Name, NumericValue,
};

/// Whether `name` takes a numeric short path.
pub(crate) fn is_short_path(name: Name) -> bool {
    matches!(
        name,
        known::ADD
            | known::MULTIPLY
            | known::NEGATE
            | known::SQUARE
            | known::SQRT
            | known::DIVIDE
            | known::POWER
            | known::EXP
            | known::LN
    )
}

/// Canonicalise a short-path application.
pub(crate) fn canonical_arith(
    engine: &mut Engine,
    name: Name,
    raw_ops: &[Expr],
) -> EngineResult<Expr> {
    let mut ops: Vec<Expr> = Vec::with_capacity(raw_ops.len());
    for op in raw_ops {
        let c = canonical_operand(engine, op, false)?;
        if c.is_function_named(known::SEQUENCE) {
            ops.extend(c.ops().iter().cloned());
        } else {
            ops.push(c);
        }
    }
    // Coerce operand domains: definitively non-numeric operands become
    // in-band errors; unknowns and collections pass (threading resolves
    // collections at evaluation time).
    for op in &mut ops {
        if matches!(op.kind(), ExprKind::Str(_) | ExprKind::Domain(_)) {
            let head = engine.interner().resolve(name).to_owned();
            *op = Expr::error(incompatible_domain(&head, "Numbers", "Values"));
        }
    }
    match name {
        known::ADD => canonical_add(engine, ops),
        known::MULTIPLY => canonical_multiply(engine, ops),
        known::NEGATE => unary(engine, name, ops, canonical_negate),
        known::SQUARE => unary(engine, name, ops, |engine, op| {
            canonical_power(engine, op, Expr::int(2))
        }),
        known::SQRT => unary(engine, name, ops, canonical_sqrt),
        known::DIVIDE => binary(engine, name, ops, canonical_divide),
        known::POWER => binary(engine, name, ops, canonical_power),
        known::EXP => unary(engine, name, ops, canonical_exp),
        _ => unary(engine, name, ops, canonical_ln),
    }
}

/// Arity guard for unary short paths: wraps arity violations in-band.
fn unary(
    engine: &mut Engine,
    name: Name,
    mut ops: Vec<Expr>,
    build: impl FnOnce(&mut Engine, Expr) -> EngineResult<Expr>,
) -> EngineResult<Expr> {
    let head = engine.interner().resolve(name);
    match ops.len() {
        1 => {
            let op = ops.remove(0);
            build(engine, op)
        }
        0 => Ok(Expr::apply_canonical(
            name,
            vec![Expr::error(missing_operand(head))],
            true,
        )),
        n => {
            let mut kept: Vec<Expr> = ops.drain(..1).collect();
            kept.extend((1..n).map(|i| Expr::error(unexpected_argument(head, i))));
            Ok(Expr::apply_canonical(name, kept, true))
        }
    }
}

/// Arity guard for binary short paths.
fn binary(
    engine: &mut Engine,
    name: Name,
    mut ops: Vec<Expr>,
    build: impl FnOnce(&mut Engine, Expr, Expr) -> EngineResult<Expr>,
) -> EngineResult<Expr> {
    let head = engine.interner().resolve(name);
    if ops.len() == 2 {
        let rhs = ops.remove(1);
        let lhs = ops.remove(0);
        return build(engine, lhs, rhs);
    }
    let mut kept = ops;
    while kept.len() < 2 {
        kept.push(Expr::error(missing_operand(head)));
    }
    let surplus = kept.split_off(2);
    kept.extend((0..surplus.len()).map(|i| Expr::error(unexpected_argument(head, 2 + i))));
    Ok(Expr::apply_canonical(name, kept, true))
}

/// `i` as a symbol test.
fn is_imaginary_unit(expr: &Expr) -> bool {
    expr.symbol_name() == Some(known::IMAGINARY_UNIT)
}

/// Split `b * i` (canonical product of a real literal and the imaginary
/// unit) into its coefficient.
fn imaginary_coefficient(expr: &Expr) -> Option<NumericValue> {
    if is_imaginary_unit(expr) {
        return Some(NumericValue::int(1));
    }
    if expr.is_function_named(known::MULTIPLY) && expr.nops() == 2 {
        let (a, b) = (&expr.ops()[0], &expr.ops()[1]);
        if is_imaginary_unit(b) {
            if let Some(v) = a.numeric_value() {
                if v.is_real() {
                    return Some(v.clone());
                }
            }
        }
    }
    None
}

fn canonical_add(engine: &mut Engine, ops: Vec<Expr>) -> EngineResult<Expr> {
    let mut terms: Vec<Expr> = Vec::with_capacity(ops.len());
    let mut sum = NumericValue::int(0);
    let mut imag = NumericValue::int(0);
    for op in ops {
        if op.is_function_named(known::ADD) {
            // Children are canonical, hence already flat; splice.
            for child in op.ops() {
                accumulate_term(child.clone(), &mut terms, &mut sum, &mut imag);
            }
        } else {
            accumulate_term(op, &mut terms, &mut sum, &mut imag);
        }
    }
    // Recognise a + b*i as a complex literal.
    if !imag.is_zero() {
        let im = imag.as_f64().unwrap_or(f64::NAN);
        sum = sum.add(&NumericValue::complex(0.0, im));
    }
    if !sum.is_zero() || terms.is_empty() {
        terms.push(Expr::number(sum));
    }
    terms.sort_by(|a, b| order::compare(engine.interner(), a, b, false));
    if terms.len() == 1 && !is_collection(&terms[0]) {
        return Ok(terms.remove(0));
    }
    Ok(Expr::apply_canonical(known::ADD, terms, true))
}

fn accumulate_term(op: Expr, terms: &mut Vec<Expr>, sum: &mut NumericValue, imag: &mut NumericValue) {
    if let Some(v) = op.numeric_value() {
        *sum = sum.add(v);
        return;
    }
    if let Some(coeff) = imaginary_coefficient(&op) {
        *imag = imag.add(&coeff);
        return;
    }
    terms.push(op);
}

fn canonical_multiply(engine: &mut Engine, ops: Vec<Expr>) -> EngineResult<Expr> {
    let mut factors: Vec<Expr> = Vec::with_capacity(ops.len());
    let mut product = NumericValue::int(1);
    for op in ops {
        if op.is_function_named(known::MULTIPLY) {
            for child in op.ops() {
                accumulate_factor(child.clone(), &mut factors, &mut product);
            }
        } else {
            accumulate_factor(op, &mut factors, &mut product);
        }
    }
    if product.is_zero() {
        return Ok(Expr::int(0));
    }
    let mut out: Vec<Expr> = Vec::with_capacity(factors.len() + 1);
    if !product.is_one() || factors.is_empty() {
        out.push(Expr::number(product));
    }
    out.extend(factors);
    out.sort_by(|a, b| order::compare(engine.interner(), a, b, true));
    if out.len() == 1 && !is_collection(&out[0]) {
        return Ok(out.remove(0));
    }
    Ok(Expr::apply_canonical(known::MULTIPLY, out, true))
}

fn accumulate_factor(op: Expr, factors: &mut Vec<Expr>, product: &mut NumericValue) {
    if let Some(v) = op.numeric_value() {
        *product = product.mul(v);
        return;
    }
    if is_imaginary_unit(&op) {
        *product = product.mul(&NumericValue::complex(0.0, 1.0));
        return;
    }
    factors.push(op);
}

fn canonical_negate(engine: &mut Engine, op: Expr) -> EngineResult<Expr> {
    if let Some(v) = op.numeric_value() {
        return Ok(Expr::number(v.neg()));
    }
    // Involution.
    if op.is_function_named(known::NEGATE) && op.nops() == 1 {
        return Ok(op.ops()[0].clone());
    }
    // A product with a literal coefficient absorbs the sign.
    if op.is_function_named(known::MULTIPLY) {
        if let Some(v) = op.op(0).and_then(Expr::numeric_value) {
            let mut ops = op.ops().to_vec();
            ops[0] = Expr::number(v.neg());
            return canonical_multiply(engine, ops);
        }
    }
    Ok(Expr::apply_canonical(known::NEGATE, vec![op], true))
}

/// Exact square root of a literal, when exactness survives: perfect
/// squares of rationals (either sign), and anything already approximate.
fn exact_sqrt(v: &NumericValue) -> Option<NumericValue> {
    match v {
        NumericValue::Rational(_) => {
            let root = v.sqrt();
            match &root {
                NumericValue::Rational(_) => Some(root),
                NumericValue::Complex(c) if c.im.fract() == 0.0 && c.re == 0.0 => Some(root),
                _ => None,
            }
        }
        NumericValue::Float(_) | NumericValue::Complex(_) => Some(v.sqrt()),
    }
}

fn canonical_sqrt(_engine: &mut Engine, op: Expr) -> EngineResult<Expr> {
    if let Some(v) = op.numeric_value() {
        if let Some(root) = exact_sqrt(v) {
            return Ok(Expr::number(root));
        }
    }
    Ok(Expr::apply_canonical(known::SQRT, vec![op], true))
}

fn canonical_divide(engine: &mut Engine, lhs: Expr, rhs: Expr) -> EngineResult<Expr> {
    if let (Some(a), Some(b)) = (lhs.numeric_value(), rhs.numeric_value()) {
        if !b.is_zero() {
            return Ok(Expr::number(a.div(b)));
        }
    }
    if let Some(b) = rhs.numeric_value() {
        if b.is_one() {
            return Ok(lhs);
        }
    }
    if lhs.numeric_value().is_some_and(NumericValue::is_zero) {
        return Ok(Expr::int(0));
    }
    let inverse = canonical_power(engine, rhs, Expr::int(-1))?;
    canonical_multiply(engine, vec![lhs, inverse])
}

fn canonical_power(engine: &mut Engine, base: Expr, exp: Expr) -> EngineResult<Expr> {
    if let Some(e) = exp.numeric_value() {
        if e.is_zero() {
            return Ok(Expr::int(1));
        }
        if e.is_one() {
            return Ok(base);
        }
        // Base zero folds for any real exponent: 0 when positive,
        // infinity when negative.
        if base.numeric_value().is_some_and(NumericValue::is_zero) {
            match e.sign() {
                Some(s) if s > 0 => return Ok(Expr::int(0)),
                Some(s) if s < 0 => {
                    return Ok(Expr::number(NumericValue::float(f64::INFINITY)));
                }
                _ => {}
            }
        }
        // x^(1/2) is Sqrt.
        if *e == NumericValue::rational(1, 2) {
            return canonical_sqrt(engine, base);
        }
        if let Some(b) = base.numeric_value() {
            // Exponent infinities fold over literal bases.
            if !e.is_finite() && !e.is_nan() {
                return Ok(Expr::number(fold_infinite_exponent(b, e)));
            }
            if let Some(n) = e.as_i64() {
                return Ok(Expr::number(b.pow_int(n)));
            }
            // Approximate bases (or exponents) fold through the kernel.
            if matches!(b, NumericValue::Float(_) | NumericValue::Complex(_))
                || matches!(e, NumericValue::Float(_) | NumericValue::Complex(_))
            {
                return Ok(Expr::number(b.pow(e)));
            }
        }
        if let Some(n) = e.as_i64() {
            // (x^a)^b => x^(a*b) for integer a, b.
            if base.is_function_named(known::POWER) && base.nops() == 2 {
                let inner_base = base.ops()[0].clone();
                let inner_exp = base.ops()[1].clone();
                if let Some(a) = inner_exp.numeric_value().and_then(NumericValue::as_i64) {
                    if !matches!(
                        inner_base.numeric_value(),
                        Some(NumericValue::Complex(_))
                    ) {
                        return canonical_power(
                            engine,
                            inner_base,
                            Expr::int(a.saturating_mul(n)),
                        );
                    }
                }
            }
            // Integer exponents distribute over products.
            if base.is_function_named(known::MULTIPLY) {
                let mut powered = Vec::with_capacity(base.nops());
                for factor in base.ops() {
                    powered.push(canonical_power(engine, factor.clone(), Expr::int(n))?);
                }
                return canonical_multiply(engine, powered);
            }
        }
    }
    if let Some(b) = base.numeric_value() {
        if b.is_one() {
            return Ok(Expr::int(1));
        }
    }
    Ok(Expr::apply_canonical(known::POWER, vec![base, exp], true))
}

fn fold_infinite_exponent(base: &NumericValue, exp: &NumericValue) -> NumericValue {
    let magnitude = match base.abs().as_f64() {
        Some(m) => m,
        None => return NumericValue::nan(),
    };
    let positive = exp.sign() == Some(1);
    if (magnitude > 1.0) == positive && magnitude != 1.0 {
        NumericValue::float(f64::INFINITY)
    } else if magnitude == 1.0 {
        NumericValue::nan()
    } else {
        NumericValue::int(0)
    }
}

fn canonical_exp(_engine: &mut Engine, op: Expr) -> EngineResult<Expr> {
    if let Some(v) = op.numeric_value() {
        if v.is_zero() {
            return Ok(Expr::int(1));
        }
        if v.is_one() {
            return Ok(Expr::symbol(known::EXPONENTIAL_E));
        }
        if matches!(v, NumericValue::Float(_) | NumericValue::Complex(_)) {
            return Ok(Expr::number(v.exp()));
        }
    }
    Ok(Expr::apply_canonical(known::EXP, vec![op], true))
}

fn canonical_ln(_engine: &mut Engine, op: Expr) -> EngineResult<Expr> {
    if op.symbol_name() == Some(known::EXPONENTIAL_E) {
        return Ok(Expr::int(1));
    }
    if let Some(v) = op.numeric_value() {
        if v.is_one() {
            return Ok(Expr::int(0));
        }
        if v.is_zero() {
            return Ok(Expr::number(NumericValue::float(f64::NEG_INFINITY)));
        }
        if matches!(v, NumericValue::Float(_) | NumericValue::Complex(_)) {
            return Ok(Expr::number(v.ln()));
        }
    }
    Ok(Expr::apply_canonical(known::LN, vec![op], true))
}
