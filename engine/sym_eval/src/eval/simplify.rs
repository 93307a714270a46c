//! The simplify pass and the standard simplification rule set.

use crate::engine::Engine;
use crate::expand::expand;
use crate::registry::{FunctionFlags, HoldPolicy};
use std::rc::Rc;
use sym_ir::{known, EngineResult, Expr, Name, StringInterner};
use sym_rules::{Rule, RuleSet, Substitution};
use tracing::trace;

/// Options of the simplify pass.
#[derive(Clone, Default)]
pub struct SimplifyOptions {
    /// Simplify children too (on by default; `Some(false)` restricts the
    /// pass to the root).
    pub recursive: Option<bool>,
    /// Replacement rule set; the standard set when absent.
    pub rules: Option<Rc<RuleSet>>,
}

/// Simplify `expr`: canonicalise, recurse per the hold policy, weigh
/// algebraic expansion, consult the handler, then drive the rule set to
/// fixed point, keeping the cheapest form seen.
pub(crate) fn simplify(
    engine: &mut Engine,
    expr: &Expr,
    options: &SimplifyOptions,
) -> EngineResult<Expr> {
    engine.should_continue()?;
    let canonical = engine.canonical(expr)?;
    let mut best = canonical;

    // Children first, subject to the hold policy.
    if options.recursive.unwrap_or(true) {
        if let Some(name) = best.head_symbol() {
            let ops: Vec<Expr> = best.ops().to_vec();
            let hold = engine
                .lookup_function(name)
                .map_or(HoldPolicy::None, |d| d.hold());
            let mut children = Vec::with_capacity(ops.len());
            let mut changed = false;
            for (i, op) in ops.iter().enumerate() {
                if hold.holds(i, ops.len()) || op.is_function_named(known::HOLD) {
                    children.push(op.clone());
                } else {
                    let simplified = simplify(engine, op, options)?;
                    changed |= !simplified.is_same(op);
                    children.push(simplified);
                }
            }
            if changed {
                best = engine.canonical(&Expr::apply_symbol(name, children))?;
            }
        }
    }

    // Algebraic expansion: keep the cheaper of original vs expanded.
    let expanded = expand(engine, &best)?;
    best = cheaper(engine, best, expanded);

    if let Some(name) = best.head_symbol() {
        if let Some(def) = engine.lookup_function(name) {
            if def.flags().contains(FunctionFlags::INERT) {
                let first = best.op(0).cloned();
                return Ok(first.unwrap_or(best));
            }
            // The handler's result is accepted through the cost rule.
            if let Some(handler) = def.simplify_handler() {
                let ops: Vec<Expr> = best.ops().to_vec();
                if let Some(candidate) = handler(engine, &ops)? {
                    let candidate = engine.canonical(&candidate)?;
                    if accepts(engine, &best, &candidate) {
                        best = candidate;
                    }
                }
            }
        }
    }

    // Standard (or caller-supplied) rules to fixed point.
    let rules = match &options.rules {
        Some(rules) => Rc::clone(rules),
        None => engine.standard_simplify_rules(),
    };
    if let Some(rewritten) = engine.replace_to_fixed_point(&best, &rules)? {
        best = cheaper(engine, best, rewritten);
    }
    Ok(best)
}

/// Cost-rule acceptance: the candidate may cost up to the engine's bias
/// more than the incumbent.
fn accepts(engine: &mut Engine, incumbent: &Expr, candidate: &Expr) -> bool {
    let old = engine.cost(incumbent);
    let new = engine.cost(candidate);
    #[allow(clippy::cast_precision_loss)]
    let within = (new as f64) <= engine.cost_bias() * (old as f64);
    within
}

fn cheaper(engine: &mut Engine, incumbent: Expr, candidate: Expr) -> Expr {
    if candidate.is_same(&incumbent) {
        return incumbent;
    }
    if engine.cost(&candidate) < engine.cost(&incumbent) {
        trace!("simplify kept the cheaper rewritten form");
        candidate
    } else {
        incumbent
    }
}

/// Collect like terms of a sum: `x² + 2x − x² − 2x` => `0`.
///
/// Each term splits into a rational coefficient and a core (`2x` is 2
/// over core `x`; `-t` is -1 over `t`); coefficients accumulate per core.
/// Returns `None` when nothing merges, so the simplify pass falls back
/// to the unchanged form.
pub(crate) fn collect_like_terms(
    engine: &mut Engine,
    ops: &[Expr],
) -> EngineResult<Option<Expr>> {
    use sym_ir::NumericValue;

    let mut literal = NumericValue::int(0);
    let mut cores: Vec<(Expr, NumericValue)> = Vec::with_capacity(ops.len());
    let mut merged = false;
    for op in ops {
        if let Some(v) = op.numeric_value() {
            literal = literal.add(v);
            continue;
        }
        let (coeff, core) = coefficient_and_core(op);
        match cores.iter_mut().find(|(c, _)| c.is_same(&core)) {
            Some((_, acc)) => {
                *acc = acc.add(&coeff);
                merged = true;
            }
            None => cores.push((core, coeff)),
        }
    }
    if !merged {
        return Ok(None);
    }
    let mut terms = Vec::with_capacity(cores.len() + 1);
    if !literal.is_zero() {
        terms.push(Expr::number(literal));
    }
    for (core, coeff) in cores {
        if coeff.is_zero() {
            continue;
        }
        if coeff.is_one() {
            terms.push(core);
        } else {
            terms.push(Expr::apply_symbol(
                known::MULTIPLY,
                vec![Expr::number(coeff), core],
            ));
        }
    }
    engine
        .canonical(&Expr::apply_symbol(known::ADD, terms))
        .map(Some)
}

/// Split a term into its rational coefficient and core.
fn coefficient_and_core(term: &Expr) -> (sym_ir::NumericValue, Expr) {
    use sym_ir::NumericValue;

    if term.is_function_named(known::NEGATE) && term.nops() == 1 {
        let (coeff, core) = coefficient_and_core(&term.ops()[0]);
        return (coeff.neg(), core);
    }
    if term.is_function_named(known::MULTIPLY) && term.nops() >= 2 {
        if let Some(v) = term.ops()[0].numeric_value() {
            let rest = &term.ops()[1..];
            let core = if rest.len() == 1 {
                rest[0].clone()
            } else {
                Expr::apply_canonical(known::MULTIPLY, rest.to_vec(), true)
            };
            return (v.clone(), core);
        }
    }
    (NumericValue::int(1), term.clone())
}

/// Build the standard simplification rule set.
///
/// Algebraic identities expressed over canonical forms; anything the
/// canonicaliser already folds (literal arithmetic, flattening, ordering)
/// has no rule here.
pub(crate) fn standard_rules(interner: &StringInterner) -> RuleSet {
    let a = interner.intern("_a");

    let sym = |name: Name| Expr::symbol(name);
    let f1 = |head: Name, x: Expr| Expr::apply_symbol(head, vec![x]);
    let f2 = |head: Name, x: Expr, y: Expr| Expr::apply_symbol(head, vec![x, y]);

    let mut rules = RuleSet::new();

    // ln(e^a) = a, e^(ln a) = a
    rules.push(
        Rule::new(f1(known::LN, f1(known::EXP, sym(a))), sym(a)).with_id("ln-exp"),
    );
    rules.push(
        Rule::new(f1(known::EXP, f1(known::LN, sym(a))), sym(a)).with_id("exp-ln"),
    );

    // cos²a + sin²a = 1 (canonical order puts the cosine first)
    rules.push(
        Rule::new(
            f2(
                known::ADD,
                f2(known::POWER, f1(known::COS, sym(a)), Expr::int(2)),
                f2(known::POWER, f1(known::SIN, sym(a)), Expr::int(2)),
            ),
            Expr::int(1),
        )
        .with_id("pythagorean"),
    );

    // a + (-a) = 0
    rules.push(
        Rule::new(
            f2(known::ADD, sym(a), f1(known::NEGATE, sym(a))),
            Expr::int(0),
        )
        .with_id("add-inverse"),
    );
    rules.push(
        Rule::new(
            f2(known::ADD, f1(known::NEGATE, sym(a)), sym(a)),
            Expr::int(0),
        )
        .with_id("add-inverse-swapped"),
    );

    // a * a⁻¹ = 1
    rules.push(
        Rule::new(
            f2(
                known::MULTIPLY,
                sym(a),
                f2(known::POWER, sym(a), Expr::int(-1)),
            ),
            Expr::int(1),
        )
        .with_id("mul-inverse"),
    );

    // a + a = 2a, a * a = a²
    rules.push(
        Rule::new(
            f2(known::ADD, sym(a), sym(a)),
            f2(known::MULTIPLY, Expr::int(2), sym(a)),
        )
        .with_id("fold-double"),
    );
    rules.push(
        Rule::new(
            f2(known::MULTIPLY, sym(a), sym(a)),
            f2(known::POWER, sym(a), Expr::int(2)),
        )
        .with_id("fold-square"),
    );

    // |-a| = |a|; |a| = a for provably non-negative a
    rules.push(
        Rule::new(
            f1(known::ABS, f1(known::NEGATE, sym(a))),
            f1(known::ABS, sym(a)),
        )
        .with_id("abs-negate"),
    );
    rules.push(
        Rule::new(f1(known::ABS, sym(a)), sym(a))
            .when(
                move |bindings: &Substitution, host: &mut dyn sym_rules::RewriteHost| {
                    bindings
                        .get(a)
                        .and_then(|e| host.sign_of(e))
                        .is_some_and(|s| s >= 0)
                },
            )
            .with_id("abs-nonnegative"),
    );

    rules
}
