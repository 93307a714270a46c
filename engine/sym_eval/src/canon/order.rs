//! Canonical total order for commutative operands.
//!
//! Primary key: the polynomial total degree, used in multiplicative
//! contexts only. Secondary key: a stable serialisation class - numeric
//! literals first (by value), then symbols (by name), then compounds (by
//! head name, then recursive child order). Final tie-break: the content
//! digest, which is deterministic across runs.

use std::cmp::Ordering;
use sym_ir::{known, Expr, ExprKind, Head, StringInterner};

/// Degree sentinel for non-polynomial dependence on the free variables.
const NON_POLYNOMIAL: u64 = u64::MAX;

/// Polynomial total degree of `expr` over the union of its free variables.
/// Zero for constants, [`NON_POLYNOMIAL`] for non-polynomial forms.
pub fn total_degree(expr: &Expr) -> u64 {
    match expr.kind() {
        ExprKind::Number(_) | ExprKind::Str(_) | ExprKind::Domain(_) | ExprKind::Error(_) => 0,
        ExprKind::Symbol(_) => 1,
        ExprKind::Tensor(_) => 0,
        ExprKind::Function { head, ops } => {
            let Some(name) = head.symbol() else {
                return NON_POLYNOMIAL;
            };
            if name == known::ADD {
                ops.iter().map(total_degree).max().unwrap_or(0)
            } else if name == known::MULTIPLY {
                ops.iter().fold(0u64, |acc, op| {
                    let d = total_degree(op);
                    if d == NON_POLYNOMIAL || acc == NON_POLYNOMIAL {
                        NON_POLYNOMIAL
                    } else {
                        acc.saturating_add(d)
                    }
                })
            } else if name == known::NEGATE {
                ops.first().map_or(0, total_degree)
            } else if name == known::POWER {
                power_degree(ops)
            } else if name == known::SQUARE {
                match ops.first().map(total_degree) {
                    Some(NON_POLYNOMIAL) | None => NON_POLYNOMIAL,
                    Some(d) => d.saturating_mul(2),
                }
            } else if ops.iter().all(|op| total_degree(op) == 0) {
                // A function of constants is itself a constant.
                0
            } else {
                NON_POLYNOMIAL
            }
        }
    }
}

fn power_degree(ops: &[Expr]) -> u64 {
    let (Some(base), Some(exp)) = (ops.first(), ops.get(1)) else {
        return NON_POLYNOMIAL;
    };
    let base_degree = total_degree(base);
    if base_degree == 0 {
        return if total_degree(exp) == 0 { 0 } else { NON_POLYNOMIAL };
    }
    match exp.numeric_value().and_then(sym_ir::NumericValue::as_i64) {
        Some(n) if n > 0 => base_degree.saturating_mul(n.unsigned_abs()),
        _ => NON_POLYNOMIAL,
    }
}

/// Compare two canonical expressions. `multiplicative` selects the degree
/// primary key (the commutative sort of `Multiply` uses it; everything
/// else compares degree-free).
pub fn compare(
    interner: &StringInterner,
    a: &Expr,
    b: &Expr,
    multiplicative: bool,
) -> Ordering {
    if multiplicative {
        let by_degree = total_degree(a).cmp(&total_degree(b));
        if by_degree != Ordering::Equal {
            return by_degree;
        }
    }
    lexicographic(interner, a, b).then_with(|| a.content_hash().cmp(&b.content_hash()))
}

/// Serialisation class of a node: numbers, then symbols, then compounds,
/// then the remaining literal kinds.
fn class(expr: &Expr) -> u8 {
    match expr.kind() {
        ExprKind::Number(_) => 0,
        ExprKind::Symbol(_) => 1,
        ExprKind::Function { .. } => 2,
        ExprKind::Str(_) => 3,
        ExprKind::Tensor(_) => 4,
        ExprKind::Domain(_) => 5,
        ExprKind::Error(_) => 6,
    }
}

fn lexicographic(interner: &StringInterner, a: &Expr, b: &Expr) -> Ordering {
    let by_class = class(a).cmp(&class(b));
    if by_class != Ordering::Equal {
        return by_class;
    }
    match (a.kind(), b.kind()) {
        (ExprKind::Number(x), ExprKind::Number(y)) => x.total_cmp(y),
        (ExprKind::Symbol(x), ExprKind::Symbol(y)) => {
            interner.resolve(*x).cmp(interner.resolve(*y))
        }
        (ExprKind::Str(x), ExprKind::Str(y)) => x.cmp(y),
        (ExprKind::Domain(x), ExprKind::Domain(y)) => x.as_str().cmp(y.as_str()),
        (
            ExprKind::Function {
                head: ha, ops: xa, ..
            },
            ExprKind::Function {
                head: hb, ops: xb, ..
            },
        ) => head_str(interner, ha)
            .cmp(head_str(interner, hb))
            .then_with(|| {
                for (x, y) in xa.iter().zip(xb.iter()) {
                    let o = lexicographic(interner, x, y);
                    if o != Ordering::Equal {
                        return o;
                    }
                }
                xa.len().cmp(&xb.len())
            }),
        _ => Ordering::Equal,
    }
}

fn head_str<'a>(interner: &'a StringInterner, head: &Head) -> &'a str {
    match head {
        Head::Symbol(name) => interner.resolve(*name),
        Head::Expr(_) => "",
    }
}
