//! Structural pattern matching.
//!
//! A pattern is an ordinary expression in which symbols whose names start
//! with `_` act as capture variables (`_name` matches one subject; the
//! `__name` form is the same to the matcher - the distinction is carried in
//! the name and consumed by rule conditions). Matching unifies captures
//! left to right: a later occurrence of a bound capture must match a
//! subject structurally equal to the first binding.
//!
//! # Multiplicity
//!
//! A match can succeed under more than one substitution when a
//! commutative node pairs capture variables with operands: canonical
//! ordering sorts children by content, so a pattern's operands cannot
//! always line up positionally with a structurally equivalent subject.
//! [`match_candidates`] enumerates the admissible substitutions (bounded,
//! deterministic, positional assignment first); rule application walks
//! them until a side condition accepts one. Ground patterns - no capture
//! variables - keep the strictly structural, positional contract.

use crate::Substitution;
use sym_ir::{is_wildcard, known, Expr, ExprKind, Head, Name, StringInterner};

/// The heads whose operands may be permuted during matching.
pub const COMMUTATIVE_HEADS: &[Name] = &[known::ADD, known::MULTIPLY, known::SET];

/// Largest operand count eligible for the permutation search.
const PERMUTATION_CAP: usize = 6;

/// Upper bound on enumerated candidate substitutions.
const CANDIDATE_CAP: usize = 16;

/// Matching options.
#[derive(Clone, Copy, Debug)]
pub struct MatchOptions {
    /// Absolute tolerance for numeric leaf comparison.
    pub tolerance: f64,
    /// Heads given the commutative permutation search.
    pub commutative_heads: &'static [Name],
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            tolerance: 1e-10,
            commutative_heads: COMMUTATIVE_HEADS,
        }
    }
}

/// Match `pattern` against `subject`, returning the first substitution on
/// success. Matching an invalid subject (one containing an `Error` node)
/// always fails.
pub fn match_pattern(
    pattern: &Expr,
    subject: &Expr,
    interner: &StringInterner,
    options: MatchOptions,
) -> Option<Substitution> {
    match_candidates(pattern, subject, &Substitution::new(), interner, options)
        .into_iter()
        .next()
}

/// Match with pre-seeded bindings (used by the rule engine to thread an
/// initial substitution); on success the first admissible substitution is
/// written back into `bindings`.
pub fn match_with_bindings(
    pattern: &Expr,
    subject: &Expr,
    bindings: &mut Substitution,
    interner: &StringInterner,
    options: MatchOptions,
) -> bool {
    match match_candidates(pattern, subject, bindings, interner, options)
        .into_iter()
        .next()
    {
        Some(matched) => {
            *bindings = matched;
            true
        }
        None => false,
    }
}

/// Every admissible substitution for `pattern` over `subject`, seeded
/// with `initial`. Deterministic: the positional assignment (when it
/// succeeds) comes first, permuted assignments follow in operand order.
pub fn match_candidates(
    pattern: &Expr,
    subject: &Expr,
    initial: &Substitution,
    interner: &StringInterner,
    options: MatchOptions,
) -> Vec<Substitution> {
    if !subject.is_valid() {
        return Vec::new();
    }
    let mut out = Vec::new();
    matches_into(pattern, subject, initial, interner, options, &mut out);
    out
}

fn matches_into(
    pattern: &Expr,
    subject: &Expr,
    seed: &Substitution,
    interner: &StringInterner,
    options: MatchOptions,
    out: &mut Vec<Substitution>,
) {
    if out.len() >= CANDIDATE_CAP {
        return;
    }
    // Capture variable: bind, or agree with the existing binding.
    if let Some(name) = pattern.symbol_name() {
        if is_wildcard(interner.resolve(name)) {
            match seed.get(name) {
                Some(bound) => {
                    if bound.is_same(subject) {
                        out.push(seed.clone());
                    }
                }
                None => {
                    let mut next = seed.clone();
                    next.bind(name, subject.clone());
                    out.push(next);
                }
            }
            return;
        }
    }

    match (pattern.kind(), subject.kind()) {
        (ExprKind::Number(p), ExprKind::Number(s)) => {
            if p.approx_eq(s, options.tolerance) {
                out.push(seed.clone());
            }
        }
        (ExprKind::Symbol(p), ExprKind::Symbol(s)) => {
            if p == s {
                out.push(seed.clone());
            }
        }
        (ExprKind::Str(p), ExprKind::Str(s)) => {
            if p == s {
                out.push(seed.clone());
            }
        }
        (ExprKind::Domain(p), ExprKind::Domain(s)) => {
            if p == s {
                out.push(seed.clone());
            }
        }
        (ExprKind::Tensor(_), ExprKind::Tensor(_)) => {
            if pattern.is_same(subject) {
                out.push(seed.clone());
            }
        }
        (
            ExprKind::Function {
                head: p_head,
                ops: p_ops,
            },
            ExprKind::Function {
                head: s_head,
                ops: s_ops,
            },
        ) => {
            if p_ops.len() != s_ops.len() {
                return;
            }
            let mut head_states = Vec::new();
            match_head(p_head, s_head, seed, interner, options, &mut head_states);
            for state in head_states {
                let commutative = p_head
                    .symbol()
                    .is_some_and(|name| options.commutative_heads.contains(&name))
                    && p_ops.len() <= PERMUTATION_CAP
                    && p_ops.iter().any(|op| contains_wildcard(op, interner));
                if commutative {
                    // The assignment search includes the identity
                    // permutation, so the positional solution leads.
                    let mut used = vec![false; s_ops.len()];
                    assignments(p_ops, s_ops, 0, &mut used, &state, interner, options, out);
                } else {
                    positional(p_ops, s_ops, &state, interner, options, out);
                }
            }
        }
        // Error patterns never match; mismatched variants never match.
        _ => {}
    }
}

/// Positional operand matching; forks only through nested nodes.
fn positional(
    p_ops: &[Expr],
    s_ops: &[Expr],
    seed: &Substitution,
    interner: &StringInterner,
    options: MatchOptions,
    out: &mut Vec<Substitution>,
) {
    let mut states = vec![seed.clone()];
    for (p, s) in p_ops.iter().zip(s_ops.iter()) {
        let mut next = Vec::new();
        for state in &states {
            matches_into(p, s, state, interner, options, &mut next);
        }
        if next.is_empty() {
            return;
        }
        states = next;
    }
    out.extend(states.into_iter().take(CANDIDATE_CAP.saturating_sub(out.len())));
}

/// Backtracking assignment of pattern operands to unused subject
/// operands; every complete assignment is emitted, in operand order, so
/// the identity assignment (when admissible) comes first.
#[allow(clippy::too_many_arguments)]
fn assignments(
    p_ops: &[Expr],
    s_ops: &[Expr],
    index: usize,
    used: &mut [bool],
    state: &Substitution,
    interner: &StringInterner,
    options: MatchOptions,
    out: &mut Vec<Substitution>,
) {
    if out.len() >= CANDIDATE_CAP {
        return;
    }
    if index == p_ops.len() {
        out.push(state.clone());
        return;
    }
    // Identity position first, then the remaining subject operands.
    let order = std::iter::once(index)
        .chain((0..s_ops.len()).filter(|&j| j != index));
    for j in order {
        if used[j] {
            continue;
        }
        let mut forks = Vec::new();
        matches_into(&p_ops[index], &s_ops[j], state, interner, options, &mut forks);
        if forks.is_empty() {
            continue;
        }
        used[j] = true;
        for fork in &forks {
            assignments(p_ops, s_ops, index + 1, used, fork, interner, options, out);
        }
        used[j] = false;
    }
}

fn match_head(
    pattern: &Head,
    subject: &Head,
    seed: &Substitution,
    interner: &StringInterner,
    options: MatchOptions,
    out: &mut Vec<Substitution>,
) {
    match (pattern, subject) {
        (Head::Symbol(p), Head::Symbol(s)) => {
            // A capture variable on the head position matches any head.
            if is_wildcard(interner.resolve(*p)) {
                let subject_expr = Expr::symbol(*s);
                match seed.get(*p) {
                    Some(bound) => {
                        if bound.is_same(&subject_expr) {
                            out.push(seed.clone());
                        }
                    }
                    None => {
                        let mut next = seed.clone();
                        next.bind(*p, subject_expr);
                        out.push(next);
                    }
                }
                return;
            }
            if p == s {
                out.push(seed.clone());
            }
        }
        (Head::Symbol(p), Head::Expr(s)) => {
            if is_wildcard(interner.resolve(*p)) {
                match seed.get(*p) {
                    Some(bound) => {
                        if bound.is_same(s) {
                            out.push(seed.clone());
                        }
                    }
                    None => {
                        let mut next = seed.clone();
                        next.bind(*p, s.clone());
                        out.push(next);
                    }
                }
            }
        }
        (Head::Expr(p), Head::Expr(s)) => {
            matches_into(p, s, seed, interner, options, out);
        }
        (Head::Expr(_), Head::Symbol(_)) => {}
    }
}

/// Whether any symbol of the tree is a capture variable.
fn contains_wildcard(expr: &Expr, interner: &StringInterner) -> bool {
    match expr.kind() {
        ExprKind::Symbol(name) => is_wildcard(interner.resolve(*name)),
        ExprKind::Function { head, ops } => {
            let head_wild = match head {
                Head::Symbol(name) => is_wildcard(interner.resolve(*name)),
                Head::Expr(e) => contains_wildcard(e, interner),
            };
            head_wild || ops.iter().any(|op| contains_wildcard(op, interner))
        }
        _ => false,
    }
}

#[cfg(test)]
// Tests use unwrap() to panic on unexpected state, making failures immediately visible
#[allow(clippy::unwrap_used)]
mod tests;
