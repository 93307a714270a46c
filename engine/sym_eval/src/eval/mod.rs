//! Evaluation passes.
//!
//! `evaluate` and the numeric pass share one skeleton: resolve to
//! canonical, thread over collections, gather children per the hold
//! policy, try the registered handler, fall back to reconstructing the
//! node with processed children. The numeric pass is `evaluate` in
//! numeric mode plus the `N(Integrate …)`/`N(Limit …)` pre-rewrites.

pub(crate) mod simplify;

use crate::canon::is_collection;
use crate::engine::{Engine, NumericMode};
use crate::registry::{Definition, FunctionFlags, HoldPolicy};
use rustc_hash::FxHashMap;
use sym_ir::{
    known, missing_operand, unexpected_command, EngineResult, Expr, ExprKind, Head, Name,
    NumericValue,
};
use sym_rules::substitute_symbols;

/// Evaluate `expr`; `numeric` selects numeric mode.
pub(crate) fn evaluate(engine: &mut Engine, expr: &Expr, numeric: bool) -> EngineResult<Expr> {
    engine.should_continue()?;
    let expr = engine.canonical(expr)?;
    let result = match expr.kind() {
        ExprKind::Symbol(name) => eval_symbol(engine, &expr, *name, numeric)?,
        ExprKind::Function { head, ops } => eval_function(engine, &expr, head, ops, numeric)?,
        _ => expr.clone(),
    };
    Ok(post_filter(engine, result, numeric))
}

/// Numeric approximation: rewrite the symbolic calculus heads to their
/// numeric counterparts, then evaluate in numeric mode.
pub(crate) fn numeric_approx(engine: &mut Engine, expr: &Expr) -> EngineResult<Expr> {
    let rewritten = rewrite_numeric_heads(expr);
    evaluate(engine, &rewritten, true)
}

fn rewrite_numeric_heads(expr: &Expr) -> Expr {
    let ExprKind::Function { head, ops } = expr.kind() else {
        return expr.clone();
    };
    let new_head = match head.symbol() {
        Some(known::INTEGRATE) => Head::Symbol(known::NINTEGRATE),
        Some(known::LIMIT) => Head::Symbol(known::NLIMIT),
        _ => head.clone(),
    };
    let new_ops: Vec<Expr> = ops.iter().map(rewrite_numeric_heads).collect();
    Expr::apply(new_head, new_ops)
}

fn eval_symbol(engine: &mut Engine, expr: &Expr, name: Name, numeric: bool) -> EngineResult<Expr> {
    let Some(Definition::Symbol(def)) = engine.lookup(name) else {
        return Ok(expr.clone());
    };
    if numeric {
        if let Some(v) = def.numeric {
            return Ok(Expr::number(v));
        }
    }
    if let Some(value) = def.value {
        // The bound value evaluates in a child scope so that recursion
        // through self-referential bindings hits the recursion limit
        // instead of looping.
        let mut scoped = engine.scoped()?;
        return evaluate(&mut scoped, &value, numeric);
    }
    Ok(expr.clone())
}

fn eval_function(
    engine: &mut Engine,
    expr: &Expr,
    head: &Head,
    ops: &[Expr],
    numeric: bool,
) -> EngineResult<Expr> {
    // Compound heads apply as anonymous functions.
    if let Head::Expr(callee) = head {
        if callee.is_function_named(known::FUNCTION) {
            return apply_anonymous(engine, callee, ops, numeric);
        }
        if callee.is_error() {
            return Ok(Expr::error(unexpected_command("<error>")));
        }
        return Ok(expr.clone());
    }
    let name = head.symbol().unwrap_or(Name::EMPTY);

    // A symbol bound to an anonymous function applies as one too.
    if let Some(Definition::Symbol(def)) = engine.lookup(name) {
        if let Some(value) = &def.value {
            if value.is_function_named(known::FUNCTION) {
                let callee = value.clone();
                return apply_anonymous(engine, &callee, ops, numeric);
            }
        }
    }

    let def = engine.lookup_function(name);
    let flags = def.as_ref().map(|d| d.flags()).unwrap_or_default();
    let hold = def.as_ref().map_or(HoldPolicy::None, |d| d.hold());

    // Threading over indexable collections.
    if flags.contains(FunctionFlags::THREADABLE) && ops.iter().any(is_collection) {
        return thread(engine, name, ops, numeric);
    }

    // Children, per the hold policy. `Hold(x)` is always skipped.
    let mut children = Vec::with_capacity(ops.len());
    for (i, op) in ops.iter().enumerate() {
        if op.is_function_named(known::HOLD) {
            children.push(op.clone());
        } else if hold.holds(i, ops.len()) {
            children.push(op.clone());
        } else {
            children.push(evaluate(engine, op, numeric)?);
        }
    }

    if flags.contains(FunctionFlags::INERT) {
        return Ok(children
            .first()
            .cloned()
            .unwrap_or_else(|| Expr::error(missing_operand(engine.interner().resolve(name)))));
    }

    if let Some(def) = &def {
        if let Some(handler) = def.evaluate_handler() {
            if let Some(result) = handler(engine, &children)? {
                return Ok(result);
            }
        }
        if numeric {
            if let Some(handler) = def.numeric_handler() {
                if let Some(result) = handler(engine, &children)? {
                    return Ok(result);
                }
            }
        }
    }

    // Reconstruct with processed children; canonicalisation folds what
    // the arithmetic builder can fold.
    engine.canonical(&Expr::apply_symbol(name, children))
}

/// Zip a threadable head over its collection operands.
fn thread(engine: &mut Engine, name: Name, ops: &[Expr], numeric: bool) -> EngineResult<Expr> {
    let longest = ops
        .iter()
        .filter(|op| is_collection(op))
        .map(collection_len)
        .max()
        .unwrap_or(0);
    if longest == 0 {
        return Ok(Expr::apply_canonical(known::SEQUENCE, Vec::new(), true));
    }
    let mut elements = Vec::with_capacity(longest);
    for i in 0..longest {
        let tuple: Vec<Expr> = ops
            .iter()
            .map(|op| {
                if is_collection(op) {
                    collection_element(op, i)
                } else {
                    op.clone()
                }
            })
            .collect();
        elements.push(evaluate(
            engine,
            &Expr::apply_symbol(name, tuple),
            numeric,
        )?);
    }
    if elements.len() == 1 {
        return Ok(elements.remove(0));
    }
    engine.canonical(&Expr::apply_symbol(known::LIST, elements))
}

fn collection_len(expr: &Expr) -> usize {
    match expr.kind() {
        ExprKind::Tensor(t) => t.shape().first().copied().unwrap_or(0),
        _ => expr.nops(),
    }
}

/// Element `i` of a collection operand. Length-1 collections broadcast;
/// shorter collections clamp to their last element.
fn collection_element(expr: &Expr, i: usize) -> Expr {
    match expr.kind() {
        ExprKind::Tensor(t) => {
            let list = t.to_list();
            pick(list.ops(), i)
        }
        _ => pick(expr.ops(), i),
    }
}

fn pick(items: &[Expr], i: usize) -> Expr {
    match items {
        [] => Expr::symbol(known::NOTHING),
        [only] => only.clone(),
        _ => items[i.min(items.len() - 1)].clone(),
    }
}

/// Apply `Function(body, params…)` to `args`: substitute parameters into
/// the body, then evaluate in a child scope.
pub(crate) fn apply_anonymous(
    engine: &mut Engine,
    callee: &Expr,
    args: &[Expr],
    numeric: bool,
) -> EngineResult<Expr> {
    let Some(body) = callee.op(0) else {
        return Ok(Expr::error(missing_operand("Function")));
    };
    let params = &callee.ops()[1..];
    let mut map: FxHashMap<Name, Expr> = FxHashMap::default();
    if params.is_empty() {
        // Implicit parameters: `_` and `_1`, `_2`, ... by position.
        for (i, arg) in args.iter().enumerate() {
            let implicit = engine.interner().intern(&format!("_{}", i + 1));
            map.insert(implicit, arg.clone());
        }
        if let Some(first) = args.first() {
            map.insert(engine.interner().intern("_"), first.clone());
        }
    } else {
        for (i, param) in params.iter().enumerate() {
            let Some(param_name) = param.symbol_name() else {
                continue;
            };
            let image = args
                .get(i)
                .cloned()
                .unwrap_or_else(|| Expr::error(missing_operand("Function")));
            map.insert(param_name, image);
        }
    }
    let substituted = substitute_symbols(body, &map);
    let mut scoped = engine.scoped()?;
    evaluate(&mut scoped, &substituted, numeric)
}

/// Numeric-mode result policy: reject complex values in real-only modes,
/// downcast exact values when big-num forms are not wanted.
fn post_filter(engine: &Engine, expr: Expr, numeric: bool) -> Expr {
    let Some(v) = expr.numeric_value() else {
        return expr;
    };
    let mode = engine.config().numeric_mode;
    if !v.is_real() && matches!(mode, NumericMode::Machine | NumericMode::Bignum) {
        return engine.constants().nan.clone();
    }
    let downcast = match mode {
        NumericMode::Machine => true,
        NumericMode::Auto => numeric && !v.is_integer(),
        NumericMode::Bignum | NumericMode::Complex => false,
    };
    if downcast {
        if let NumericValue::Rational(_) = v {
            return Expr::number(v.clone().to_machine());
        }
    }
    expr
}
