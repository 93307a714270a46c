//! Algebraic expansion.
//!
//! Best-effort distribution of products and integer powers over sums.
//! Expansion never fails: when a form would blow up past the term cap it
//! is returned unchanged, and the caller keeps the cheaper of original
//! versus expanded anyway.

use crate::engine::Engine;
use sym_ir::{known, EngineResult, Expr, ExprKind, NumericValue};

/// Cap on the number of distributed terms; past it the original stands.
const TERM_CAP: usize = 512;

/// Largest integer exponent expanded over a sum.
const POWER_CAP: i64 = 8;

/// Expand `expr` bottom-up and return the canonical result.
pub(crate) fn expand(engine: &mut Engine, expr: &Expr) -> EngineResult<Expr> {
    engine.should_continue()?;
    let expr = engine.canonical(expr)?;
    let ExprKind::Function { head, ops } = expr.kind() else {
        return Ok(expr.clone());
    };
    let mut children = Vec::with_capacity(ops.len());
    for op in ops {
        children.push(expand(engine, op)?);
    }
    let rebuilt = engine.canonical(&Expr::apply(head.clone(), children))?;

    match rebuilt.head_symbol() {
        Some(known::MULTIPLY) => distribute_product(engine, &rebuilt),
        Some(known::NEGATE) => distribute_negate(engine, &rebuilt),
        Some(known::POWER) => expand_power(engine, &rebuilt),
        _ => Ok(rebuilt),
    }
}

/// `a * (b + c) * d` => `a*b*d + a*c*d`.
fn distribute_product(engine: &mut Engine, product: &Expr) -> EngineResult<Expr> {
    if !product.ops().iter().any(|op| op.is_function_named(known::ADD)) {
        return Ok(product.clone());
    }
    let mut terms: Vec<Vec<Expr>> = vec![Vec::new()];
    for factor in product.ops() {
        if factor.is_function_named(known::ADD) {
            let mut next = Vec::with_capacity(terms.len() * factor.nops());
            for term in &terms {
                for summand in factor.ops() {
                    let mut extended = term.clone();
                    extended.push(summand.clone());
                    next.push(extended);
                }
            }
            if next.len() > TERM_CAP {
                return Ok(product.clone());
            }
            terms = next;
        } else {
            for term in &mut terms {
                term.push(factor.clone());
            }
        }
    }
    let mut summands = Vec::with_capacity(terms.len());
    for term in terms {
        summands.push(engine.canonical(&Expr::apply_symbol(known::MULTIPLY, term))?);
    }
    engine.canonical(&Expr::apply_symbol(known::ADD, summands))
}

/// `-(a + b)` => `-a + -b`.
fn distribute_negate(engine: &mut Engine, negation: &Expr) -> EngineResult<Expr> {
    let Some(inner) = negation.op(0) else {
        return Ok(negation.clone());
    };
    if !inner.is_function_named(known::ADD) {
        return Ok(negation.clone());
    }
    let negated = inner
        .ops()
        .iter()
        .map(|t| Expr::apply_symbol(known::NEGATE, vec![t.clone()]))
        .collect();
    engine.canonical(&Expr::apply_symbol(known::ADD, negated))
}

/// `(a + b)^n` for a small positive integer `n` => repeated distribution.
fn expand_power(engine: &mut Engine, power: &Expr) -> EngineResult<Expr> {
    let (Some(base), Some(exp)) = (power.op(0), power.op(1)) else {
        return Ok(power.clone());
    };
    if !base.is_function_named(known::ADD) {
        return Ok(power.clone());
    }
    let Some(n) = exp.numeric_value().and_then(NumericValue::as_i64) else {
        return Ok(power.clone());
    };
    if !(2..=POWER_CAP).contains(&n) {
        return Ok(power.clone());
    }
    let mut acc = base.clone();
    for _ in 1..n {
        let product = Expr::apply_symbol(known::MULTIPLY, vec![acc, base.clone()]);
        let raw = engine.canonical(&product)?;
        acc = distribute_product(engine, &raw)?;
        if acc.nops() > TERM_CAP {
            return Ok(power.clone());
        }
    }
    Ok(acc)
}
