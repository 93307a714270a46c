use super::{add, call1, engine, mul, neg, pow};
use crate::SimplifyOptions;
use pretty_assertions::assert_eq;
use sym_ir::{known, Expr, NumericValue};

fn simplified(e: &mut crate::Engine, expr: &Expr) -> Expr {
    e.simplify(expr, &SimplifyOptions::default()).unwrap()
}

#[test]
fn pythagorean_identity_collapses_to_one() {
    let mut e = engine();
    let x = e.symbol("x");
    let expr = add(vec![
        pow(call1(known::SIN, x.clone()), Expr::int(2)),
        pow(call1(known::COS, x), Expr::int(2)),
    ]);
    assert!(simplified(&mut e, &expr).is_same(&Expr::int(1)));
}

#[test]
fn log_exp_inverses_cancel() {
    let mut e = engine();
    let x = e.symbol("x");
    assert!(simplified(&mut e, &call1(known::LN, call1(known::EXP, x.clone()))).is_same(&x));
    assert!(simplified(&mut e, &call1(known::EXP, call1(known::LN, x.clone()))).is_same(&x));
}

#[test]
fn additive_inverses_cancel() {
    let mut e = engine();
    let x = e.symbol("x");
    let expr = add(vec![x.clone(), neg(x)]);
    assert!(simplified(&mut e, &expr).is_same(&Expr::int(0)));
}

#[test]
fn multiplicative_inverses_cancel() {
    let mut e = engine();
    let x = e.symbol("x");
    let expr = mul(vec![x.clone(), pow(x, Expr::int(-1))]);
    assert!(simplified(&mut e, &expr).is_same(&Expr::int(1)));
}

#[test]
fn like_terms_collect_across_wide_sums() {
    let mut e = engine();
    let x = e.symbol("x");
    // x² + 2x − x² − 2x, written term by term.
    let expr = add(vec![
        pow(x.clone(), Expr::int(2)),
        mul(vec![Expr::int(2), x.clone()]),
        neg(pow(x.clone(), Expr::int(2))),
        neg(mul(vec![Expr::int(2), x])),
    ]);
    assert!(simplified(&mut e, &expr).is_same(&Expr::int(0)));
}

#[test]
fn doubled_terms_fold_into_coefficients() {
    let mut e = engine();
    let x = e.symbol("x");
    let doubled = simplified(&mut e, &add(vec![x.clone(), x.clone()]));
    assert_eq!(
        doubled.display(e.interner()).to_string(),
        "Multiply(2, x)"
    );
    let squared = simplified(&mut e, &mul(vec![x.clone(), x]));
    assert_eq!(squared.display(e.interner()).to_string(), "Power(x, 2)");
}

#[test]
fn abs_simplifies_under_known_signs() {
    let mut e = engine();
    let x = e.symbol("x");
    let folded = simplified(&mut e, &call1(known::ABS, neg(x.clone())));
    assert_eq!(folded.display(e.interner()).to_string(), "Abs(x)");

    let name = e.interner().intern("x");
    e.assume(name, crate::SignCondition::Positive);
    let dropped = simplified(&mut e, &call1(known::ABS, x.clone()));
    assert!(dropped.is_same(&x));
}

#[test]
fn expansion_is_kept_only_when_cheaper() {
    let mut e = engine();
    let x = e.symbol("x");
    // (x+1)² alone: the expansion is costlier, the compact form stays.
    let square = pow(add(vec![x.clone(), Expr::int(1)]), Expr::int(2));
    let kept = simplified(&mut e, &square);
    assert_eq!(kept.head_symbol(), Some(known::POWER));
}

#[test]
fn is_equal_proves_algebraic_identities() {
    let mut e = engine();
    let x = e.symbol("x");
    let lhs = pow(add(vec![x.clone(), Expr::int(1)]), Expr::int(2));
    let rhs = add(vec![
        pow(x.clone(), Expr::int(2)),
        mul(vec![Expr::int(2), x.clone()]),
        Expr::int(1),
    ]);
    assert!(e.is_equal(&lhs, &rhs).unwrap());
    let wrong = add(vec![pow(x.clone(), Expr::int(2)), Expr::int(1)]);
    assert!(!e.is_equal(&lhs, &wrong).unwrap());
}

#[test]
fn expand_distributes_products_and_powers() {
    let mut e = engine();
    let (x, y) = (e.symbol("x"), e.symbol("y"));
    let product = mul(vec![
        Expr::int(2),
        add(vec![x.clone(), y.clone()]),
    ]);
    let expanded = e.expand(&product).unwrap();
    assert_eq!(
        expanded.display(e.interner()).to_string(),
        "Add(Multiply(2, x), Multiply(2, y))"
    );

    let square = pow(add(vec![x.clone(), Expr::int(1)]), Expr::int(2));
    let expanded = e.expand(&square).unwrap();
    assert_eq!(expanded.head_symbol(), Some(known::ADD));
    // x² + 2x + 1: three terms after like-term collection in canonical form.
    assert_eq!(expanded.nops(), 3);
}

#[test]
fn simplify_accepts_custom_rule_sets() {
    use std::rc::Rc;
    use sym_rules::{Rule, RuleSet};

    let mut e = engine();
    let a = e.interner().intern("_a");
    let x = e.symbol("x");
    let mut rules = RuleSet::new();
    rules.push(Rule::new(
        call1(known::SIN, Expr::symbol(a)),
        Expr::symbol(a),
    ));
    let out = e
        .simplify(
            &call1(known::SIN, x.clone()),
            &SimplifyOptions {
                recursive: None,
                rules: Some(Rc::new(rules)),
            },
        )
        .unwrap();
    assert!(out.is_same(&x));
}

#[test]
fn simplified_results_respect_numeric_zero() {
    let mut e = engine();
    let z = simplified(&mut e, &add(vec![Expr::rational(1, 2), Expr::rational(-1, 2)]));
    assert!(z.numeric_value().is_some_and(NumericValue::is_zero));
}
