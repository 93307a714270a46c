//! The solver driver.

use crate::rules::{harmonization_rules, root_rules};
use rustc_hash::FxHashMap;
use sym_eval::{Engine, SimplifyOptions};
use sym_ir::{known, EngineResult, Expr, Name};
use sym_rules::{match_rules, RuleSet, Substitution};
use tracing::debug;

/// Solve `expr` for the given variables.
///
/// Univariate only: anything but exactly one variable yields no solution.
/// An `Equal` head is rewritten to a left-minus-right difference; the
/// difference is simplified, the variable is replaced by a reserved
/// placeholder, and the root rule library is driven over the result -
/// first directly, then over harmonised forms, then over the expanded
/// expression. Every candidate is evaluated to its canonical value.
pub fn solve(engine: &mut Engine, expr: &Expr, variables: &[Name]) -> EngineResult<Vec<Expr>> {
    let [variable] = variables else {
        debug!(count = variables.len(), "multi-variable systems are unsupported");
        return Ok(Vec::new());
    };

    let equation = if expr.is_function_named(known::EQUAL) && expr.nops() == 2 {
        Expr::apply_symbol(
            known::ADD,
            vec![
                expr.ops()[0].clone(),
                Expr::apply_symbol(known::NEGATE, vec![expr.ops()[1].clone()]),
            ],
        )
    } else {
        expr.clone()
    };
    let simplified = engine.simplify(&equation, &SimplifyOptions::default())?;

    // Structural substitution: the placeholder survives untouched into
    // the canonical subject the patterns are written against.
    let placeholder = engine.fresh_placeholder("x");
    let mut map = FxHashMap::default();
    map.insert(*variable, Expr::symbol(placeholder));
    let substituted = engine.subs(&simplified, &map);
    let subject = engine.canonical(&substituted)?;

    let rules = root_rules(engine.interner(), placeholder);
    let mut candidates = collect_roots(engine, &subject, &rules)?;

    if candidates.is_empty() {
        let harmonizers = harmonization_rules(engine.interner());
        candidates = try_harmonized(engine, &subject, &harmonizers, &rules)?;
        if candidates.is_empty() {
            let expanded = engine.expand(&subject)?;
            if !expanded.is_same(&subject) {
                debug!("retrying root rules over the expanded form");
                candidates = collect_roots(engine, &expanded, &rules)?;
                if candidates.is_empty() {
                    candidates = try_harmonized(engine, &expanded, &harmonizers, &rules)?;
                }
            }
        }
    }

    let mut roots: Vec<Expr> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let value = engine.evaluate(&candidate)?;
        if !roots.iter().any(|seen| seen.is_same(&value)) {
            roots.push(value);
        }
    }
    Ok(roots)
}

/// One `match_rules` pass of the root library. The rules are ordered:
/// only the first rule (by id) that fires contributes candidates - the
/// quadratic's two branches share an id, so both of its roots survive.
fn collect_roots(
    engine: &mut Engine,
    subject: &Expr,
    rules: &RuleSet,
) -> EngineResult<Vec<Expr>> {
    let rewrites = match_rules(subject, rules, engine, &Substitution::new())?;
    let Some(first) = rewrites.first() else {
        return Ok(Vec::new());
    };
    let winner = first.rule_id;
    debug!(rule = winner.unwrap_or("<anonymous>"), "root rule fired");
    Ok(rewrites
        .into_iter()
        .take_while(|r| r.rule_id == winner)
        .map(|r| r.expr)
        .collect())
}

/// Produce equivalent forms (absolute-value split, exponential merges),
/// simplify each, and retry the root rules on every form.
fn try_harmonized(
    engine: &mut Engine,
    subject: &Expr,
    harmonizers: &RuleSet,
    rules: &RuleSet,
) -> EngineResult<Vec<Expr>> {
    let forms = match_rules(subject, harmonizers, engine, &Substitution::new())?;
    let mut candidates = Vec::new();
    for form in forms {
        debug!(
            rule = form.rule_id.unwrap_or("<anonymous>"),
            "retrying root rules over a harmonised form"
        );
        let simplified = engine.simplify(&form.expr, &SimplifyOptions::default())?;
        candidates.extend(collect_roots(engine, &simplified, rules)?);
    }
    Ok(candidates)
}
