//! Rule application: single-pass collection and fixed-point rewriting.

use crate::matcher::{match_candidates, MatchOptions};
use crate::{RewriteHost, RuleSet, Substitution};
use smallvec::SmallVec;
use sym_ir::{EngineResult, Expr, ExprKind};
use tracing::trace;

/// Options of the fixed-point rewriter.
#[derive(Clone, Copy, Debug)]
pub struct RewriteOptions {
    /// Acceptance bias: a candidate is kept iff
    /// `cost(new) <= cost_bias * cost(old)`. The slack stops oscillation
    /// between equivalent forms of similar cost while still favouring the
    /// rewritten form.
    pub cost_bias: f64,
    /// Upper bound on rewrites across the whole call. Hitting it is not an
    /// error; the partial result stands as a fixed-point approximation.
    pub iteration_limit: u32,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        RewriteOptions {
            cost_bias: 1.2,
            iteration_limit: 1024,
        }
    }
}

/// One successful rewrite produced by [`match_rules`].
#[derive(Clone, Debug)]
pub struct Rewrite {
    /// The rewritten, canonicalised expression.
    pub expr: Expr,
    /// The id of the rule that fired, if it carries one.
    pub rule_id: Option<&'static str>,
}

/// Apply each rule of `rules` once to `subject`, collecting every
/// successful rewrite (a rule set can yield several results, as with the
/// quadratic formula's two branches). `initial` seeds the binding map of
/// every attempt.
pub fn match_rules(
    subject: &Expr,
    rules: &RuleSet,
    host: &mut dyn RewriteHost,
    initial: &Substitution,
) -> EngineResult<Vec<Rewrite>> {
    host.check_continue()?;
    let options = MatchOptions {
        tolerance: host.tolerance(),
        ..MatchOptions::default()
    };
    let mut out = Vec::new();
    for rule in rules.rules() {
        let candidates =
            match_candidates(rule.pattern(), subject, initial, host.interner(), options);
        // A rule fires at most once: the first substitution its side
        // condition accepts instantiates the replacement.
        for bindings in candidates {
            if !rule.condition_holds(&bindings, host) {
                continue;
            }
            let image = bindings.apply(rule.replacement());
            out.push(Rewrite {
                expr: host.canonicalize(&image),
                rule_id: rule.id(),
            });
            break;
        }
    }
    Ok(out)
}

/// Apply `rules` to fixed point, bottom-up.
///
/// Returns the rewritten expression, or `None` when no rule fired
/// anywhere. Terminates when a full pass fires nothing or when the
/// iteration limit runs out; the deadline is polled between iterations.
pub fn replace(
    expr: &Expr,
    rules: &RuleSet,
    host: &mut dyn RewriteHost,
    options: &RewriteOptions,
) -> EngineResult<Option<Expr>> {
    let mut budget = options.iteration_limit;
    rewrite_node(expr, rules, host, options, &mut budget)
}

fn rewrite_node(
    expr: &Expr,
    rules: &RuleSet,
    host: &mut dyn RewriteHost,
    options: &RewriteOptions,
    budget: &mut u32,
) -> EngineResult<Option<Expr>> {
    host.check_continue()?;

    // Children first.
    let mut current = expr.clone();
    let mut changed = false;
    if let ExprKind::Function { head, ops } = expr.kind() {
        let mut new_ops: SmallVec<[Expr; 4]> = SmallVec::with_capacity(ops.len());
        let mut child_changed = false;
        for op in ops {
            match rewrite_node(op, rules, host, options, budget)? {
                Some(rewritten) => {
                    child_changed = true;
                    new_ops.push(rewritten);
                }
                None => new_ops.push(op.clone()),
            }
        }
        if child_changed {
            current = host.canonicalize(&Expr::apply(head.clone(), new_ops.into_vec()));
            changed = true;
        }
    }

    // Then the node itself, re-processing after every accepted rewrite.
    loop {
        if *budget == 0 {
            trace!("rewrite budget exhausted; returning partial fixed point");
            break;
        }
        host.check_continue()?;
        let Some(image) = fire_once(&current, rules, host, options, budget)? else {
            break;
        };
        // The rewritten node may expose fresh redexes below its root.
        current = match rewrite_node(&image, rules, host, options, budget)? {
            Some(deeper) => deeper,
            None => image,
        };
        changed = true;
    }

    Ok(changed.then_some(current))
}

/// Try each rule once against `current`; the first accepted rewrite wins.
fn fire_once(
    current: &Expr,
    rules: &RuleSet,
    host: &mut dyn RewriteHost,
    options: &RewriteOptions,
    budget: &mut u32,
) -> EngineResult<Option<Expr>> {
    let match_options = MatchOptions {
        tolerance: host.tolerance(),
        ..MatchOptions::default()
    };
    for rule in rules.rules() {
        let seed = Substitution::new();
        let candidates =
            match_candidates(rule.pattern(), current, &seed, host.interner(), match_options);
        let Some(bindings) = candidates
            .into_iter()
            .find(|bindings| rule.condition_holds(bindings, host))
        else {
            continue;
        };
        let image = host.canonicalize(&bindings.apply(rule.replacement()));
        if image.is_same(current) {
            continue;
        }
        *budget = budget.saturating_sub(1);
        let old_cost = host.cost(current);
        let new_cost = host.cost(&image);
        #[allow(clippy::cast_precision_loss)]
        let accepted = (new_cost as f64) <= options.cost_bias * (old_cost as f64);
        if accepted {
            trace!(rule = rule.id().unwrap_or("<anonymous>"), "rewrite accepted");
            return Ok(Some(image));
        }
        trace!(
            rule = rule.id().unwrap_or("<anonymous>"),
            old_cost,
            new_cost,
            "rewrite rejected by cost"
        );
    }
    Ok(None)
}

#[cfg(test)]
// Tests use unwrap() to panic on unexpected state, making failures immediately visible
#[allow(clippy::unwrap_used)]
mod tests;
