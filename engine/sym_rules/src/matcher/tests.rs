use super::{match_pattern, MatchOptions};
use pretty_assertions::assert_eq;
use sym_ir::{known, missing_operand, Expr, StringInterner};

fn opts() -> MatchOptions {
    MatchOptions::default()
}

#[test]
fn capture_binds_a_single_subject() {
    let it = StringInterner::new();
    let x = it.intern("x");
    let cap = it.intern("_a");
    let pattern = Expr::apply_symbol(known::ADD, vec![Expr::symbol(cap), Expr::int(1)]);
    let subject = Expr::apply_symbol(known::ADD, vec![Expr::symbol(x), Expr::int(1)]);
    let sub = match_pattern(&pattern, &subject, &it, opts()).unwrap();
    assert_eq!(sub.len(), 1);
    assert!(sub.get(cap).is_some_and(|e| e.is_same(&Expr::symbol(x))));
}

#[test]
fn repeated_captures_must_agree() {
    let it = StringInterner::new();
    let cap = it.intern("_a");
    let pattern = Expr::apply_symbol(
        known::MULTIPLY,
        vec![Expr::symbol(cap), Expr::symbol(cap)],
    );
    let same = Expr::apply_symbol(known::MULTIPLY, vec![Expr::int(3), Expr::int(3)]);
    let different = Expr::apply_symbol(known::MULTIPLY, vec![Expr::int(3), Expr::int(4)]);
    assert!(match_pattern(&pattern, &same, &it, opts()).is_some());
    assert!(match_pattern(&pattern, &different, &it, opts()).is_none());
}

#[test]
fn matching_is_structural_not_mathematical() {
    let it = StringInterner::new();
    let x = it.intern("x");
    let pattern = Expr::apply_symbol(known::ADD, vec![Expr::int(1), Expr::symbol(x)]);
    let swapped = Expr::apply_symbol(known::ADD, vec![Expr::symbol(x), Expr::int(1)]);
    assert!(match_pattern(&pattern, &swapped, &it, opts()).is_none());
}

#[test]
fn numeric_leaves_match_within_tolerance() {
    let it = StringInterner::new();
    let pattern = Expr::float(0.5);
    let subject = Expr::rational(1, 2);
    assert!(match_pattern(&pattern, &subject, &it, opts()).is_some());
    assert!(match_pattern(&Expr::float(0.5001), &subject, &it, opts()).is_none());
}

#[test]
fn capture_on_the_head_matches_any_head() {
    let it = StringInterner::new();
    let h = it.intern("_h");
    let cap = it.intern("_a");
    let pattern = Expr::apply_symbol(h, vec![Expr::symbol(cap)]);
    let subject = Expr::apply_symbol(known::SIN, vec![Expr::int(1)]);
    let sub = match_pattern(&pattern, &subject, &it, opts()).unwrap();
    assert!(sub
        .get(h)
        .is_some_and(|e| e.is_same(&Expr::symbol(known::SIN))));
}

#[test]
fn operand_counts_must_match() {
    let it = StringInterner::new();
    let cap = it.intern("_a");
    let pattern = Expr::apply_symbol(known::LIST, vec![Expr::symbol(cap)]);
    let subject = Expr::apply_symbol(known::LIST, vec![Expr::int(1), Expr::int(2)]);
    assert!(match_pattern(&pattern, &subject, &it, opts()).is_none());
}

#[test]
fn invalid_subjects_never_match() {
    let it = StringInterner::new();
    let cap = it.intern("_a");
    let subject = Expr::apply_symbol(
        known::ADD,
        vec![Expr::int(1), Expr::error(missing_operand("Divide"))],
    );
    assert!(match_pattern(&Expr::symbol(cap), &subject, &it, opts()).is_none());
}

#[test]
fn pattern_idempotence() {
    // match(p, s) = σ implies match(p, p[σ]) = σ
    let it = StringInterner::new();
    let x = it.intern("x");
    let (a, b) = (it.intern("_a"), it.intern("_b"));
    let pattern = Expr::apply_symbol(
        known::POWER,
        vec![Expr::symbol(a), Expr::symbol(b)],
    );
    let subject = Expr::apply_symbol(known::POWER, vec![Expr::symbol(x), Expr::int(2)]);
    let sigma = match_pattern(&pattern, &subject, &it, opts()).unwrap();
    let instantiated = sigma.apply(&pattern);
    let again = match_pattern(&pattern, &instantiated, &it, opts()).unwrap();
    assert_eq!(again.len(), sigma.len());
    for (name, expr) in sigma.iter() {
        assert!(again.get(name).is_some_and(|e| e.is_same(expr)));
    }
}
