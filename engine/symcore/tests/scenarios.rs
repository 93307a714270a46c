//! End-to-end scenarios over the public facade.

// Tests use unwrap() to panic on unexpected state, making failures immediately visible
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use symcore::{
    known, solve, Definition, Engine, Expr, FunctionDef, HoldPolicy, NumericValue, Rule, RuleSet,
    Substitution,
};

fn add(ops: Vec<Expr>) -> Expr {
    Expr::apply_symbol(known::ADD, ops)
}

fn mul(ops: Vec<Expr>) -> Expr {
    Expr::apply_symbol(known::MULTIPLY, ops)
}

fn pow(base: Expr, exp: Expr) -> Expr {
    Expr::apply_symbol(known::POWER, vec![base, exp])
}

fn equals(lhs: Expr, rhs: Expr) -> Expr {
    Expr::apply_symbol(known::EQUAL, vec![lhs, rhs])
}

#[test]
fn linear_root() {
    let mut engine = Engine::new();
    let x = engine.interner().intern("x");
    let equation = equals(
        Expr::apply_symbol(
            known::SUBTRACT,
            vec![mul(vec![Expr::int(5), Expr::symbol(x)]), Expr::int(10)],
        ),
        Expr::int(0),
    );
    let roots = solve(&mut engine, &equation, &[x]).unwrap();
    assert_eq!(roots.len(), 1);
    assert!(roots[0].is_same(&Expr::int(2)));
}

#[test]
fn quadratic_with_negative_discriminant() {
    let mut engine = Engine::new();
    let x = engine.interner().intern("x");
    let equation = equals(
        add(vec![pow(Expr::symbol(x), Expr::int(2)), Expr::int(1)]),
        Expr::int(0),
    );
    let roots = solve(&mut engine, &equation, &[x]).unwrap();
    assert!(!roots.is_empty());
    assert!(roots.iter().all(|root| {
        root.numeric_value().is_some_and(|v| {
            v.approx_eq(&NumericValue::complex(0.0, 1.0), 1e-9)
                || v.approx_eq(&NumericValue::complex(0.0, -1.0), 1e-9)
        })
    }));
}

#[test]
fn quadratic_with_real_roots() {
    let mut engine = Engine::new();
    let x = engine.interner().intern("x");
    let equation = equals(
        add(vec![
            mul(vec![Expr::int(2), pow(Expr::symbol(x), Expr::int(2))]),
            mul(vec![Expr::int(6), Expr::symbol(x)]),
            Expr::int(4),
        ]),
        Expr::int(0),
    );
    let roots = solve(&mut engine, &equation, &[x]).unwrap();
    assert_eq!(roots.len(), 2);
    let expected = [Expr::int(-1), Expr::int(-2)];
    for want in &expected {
        assert!(roots.iter().any(|root| root.is_same(want)));
    }
}

#[test]
fn fractional_equation() {
    let mut engine = Engine::new();
    let x = engine.interner().intern("x");
    let equation = equals(
        add(vec![
            mul(vec![Expr::rational(2, 3), Expr::symbol(x)]),
            Expr::rational(1, 3),
        ]),
        Expr::int(5),
    );
    let roots = solve(&mut engine, &equation, &[x]).unwrap();
    assert_eq!(roots.len(), 1);
    assert!(roots[0].is_same(&Expr::int(7)));
}

#[test]
fn quasi_quadratic_is_unsolvable() {
    let mut engine = Engine::new();
    let x = engine.interner().intern("x");
    let equation = equals(
        add(vec![
            pow(Expr::symbol(x), Expr::int(2)),
            mul(vec![Expr::int(3), Expr::symbol(x)]),
            Expr::int(2),
            Expr::apply_symbol(known::SIN, vec![Expr::symbol(x)]),
        ]),
        Expr::int(0),
    );
    let roots = solve(&mut engine, &equation, &[x]).unwrap();
    assert!(roots.is_empty());
}

#[test]
fn canonical_order_of_commutative_factors() {
    let mut engine = Engine::new();
    let (x, y, z) = (
        engine.symbol("x"),
        engine.symbol("y"),
        engine.symbol("z"),
    );
    let raw = mul(vec![y, x, Expr::int(5), z]);
    let canonical = engine.canonical(&raw).unwrap();
    assert_eq!(
        canonical.display(engine.interner()).to_string(),
        "Multiply(5, x, y, z)"
    );
}

#[test]
fn hold_policy_shields_the_first_operand() {
    let mut engine = Engine::new();
    let f = engine
        .declare(
            "deferred",
            Definition::Function(std::rc::Rc::new(
                FunctionDef::new(engine.interner().intern("deferred"))
                    .with_hold(HoldPolicy::First),
            )),
        )
        .unwrap();
    let call = Expr::apply_symbol(
        f,
        vec![
            add(vec![Expr::int(1), Expr::int(1)]),
            add(vec![Expr::int(2), Expr::int(2)]),
        ],
    );
    let result = engine.evaluate(&call).unwrap();
    assert!(result.ops()[0].is_same(&add(vec![Expr::int(1), Expr::int(1)])));
    assert!(result.ops()[1].is_same(&Expr::int(4)));
}

#[test]
fn threading_maps_over_lists() {
    let mut engine = Engine::new();
    let list = Expr::apply_symbol(known::LIST, vec![Expr::int(0), Expr::int(1)]);
    let result = engine
        .evaluate(&Expr::apply_symbol(known::EXP, vec![list]))
        .unwrap();
    assert_eq!(result.head_symbol(), Some(known::LIST));
    assert!(result.ops()[0].is_same(&Expr::int(1)));
    let approx = engine.n(&result.ops()[1].clone()).unwrap();
    let v = approx
        .numeric_value()
        .and_then(NumericValue::as_f64)
        .unwrap();
    assert!((v - std::f64::consts::E).abs() < 1e-9);
}

#[test]
fn vanishing_product_rule_rewrite() {
    let mut engine = Engine::new();
    let x = engine.symbol("x");
    let cap_x = engine.interner().intern("_x");
    let cap_a = engine.interner().intern("__a");
    let mut rules = RuleSet::new();
    rules.push(
        Rule::new(
            mul(vec![Expr::symbol(cap_x), Expr::symbol(cap_a)]),
            Expr::int(0),
        )
        .when(
            move |bindings: &Substitution, _host: &mut dyn symcore::RewriteHost| {
                match (bindings.get(cap_a), bindings.get(cap_x)) {
                    (Some(coeff), Some(unknown)) => !coeff.contains(unknown),
                    _ => false,
                }
            },
        ),
    );
    let subject = mul(vec![Expr::int(5), x]);
    let out = engine.replace(&subject, &rules, None).unwrap();
    assert!(out.is_some_and(|e| e.is_same(&Expr::int(0))));
}
