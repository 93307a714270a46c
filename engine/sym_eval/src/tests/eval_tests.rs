use super::{add, call1, engine, mul, rendered};
use crate::registry::{Definition, FunctionDef, FunctionFlags, HoldPolicy};
use crate::{NumericMode, Sgn, SignCondition};
use pretty_assertions::assert_eq;
use std::rc::Rc;
use sym_ir::{known, EngineError, Expr, Head, NumericValue};

#[test]
fn hold_first_keeps_the_first_operand_unevaluated() {
    let mut e = engine();
    let f = e
        .declare(
            "apply_later",
            Definition::Function(Rc::new(
                FunctionDef::new(e.interner().intern("apply_later"))
                    .with_hold(HoldPolicy::First),
            )),
        )
        .unwrap();
    let raw = Expr::apply_symbol(
        f,
        vec![
            add(vec![Expr::int(1), Expr::int(1)]),
            add(vec![Expr::int(2), Expr::int(2)]),
        ],
    );
    let result = e.evaluate(&raw).unwrap();
    assert_eq!(result.head_symbol(), Some(f));
    assert!(result.ops()[0].is_same(&add(vec![Expr::int(1), Expr::int(1)])));
    assert!(result.ops()[1].is_same(&Expr::int(4)));
}

#[test]
fn threadable_heads_zip_over_lists() {
    let mut e = engine();
    let list = Expr::apply_symbol(known::LIST, vec![Expr::int(0), Expr::int(1)]);
    let result = e.evaluate(&call1(known::EXP, list)).unwrap();
    assert_eq!(result.head_symbol(), Some(known::LIST));
    assert!(result.ops()[0].is_same(&Expr::int(1)));
    assert_eq!(result.ops()[1].symbol_name(), Some(known::EXPONENTIAL_E));
}

#[test]
fn threading_broadcasts_scalars_over_the_longest_operand() {
    let mut e = engine();
    let list = Expr::apply_symbol(
        known::LIST,
        vec![Expr::int(1), Expr::int(2), Expr::int(3)],
    );
    let result = e.evaluate(&add(vec![list, Expr::int(10)])).unwrap();
    assert_eq!(rendered(&e, &result), "List(11, 12, 13)");
}

#[test]
fn threading_collapses_singletons_and_empties() {
    let mut e = engine();
    let single = Expr::apply_symbol(known::LIST, vec![Expr::int(4)]);
    let collapsed = e.evaluate(&call1(known::SQRT, single)).unwrap();
    assert!(collapsed.is_same(&Expr::int(2)));
    let empty = Expr::apply_symbol(known::LIST, vec![]);
    let nothing = e.evaluate(&call1(known::SQRT, empty)).unwrap();
    assert_eq!(nothing.head_symbol(), Some(known::SEQUENCE));
    assert_eq!(nothing.nops(), 0);
}

#[test]
fn inert_heads_return_their_first_operand() {
    let mut e = engine();
    let q = e
        .declare(
            "quote_value",
            Definition::Function(Rc::new(
                FunctionDef::new(e.interner().intern("quote_value"))
                    .with_flags(FunctionFlags::PURE | FunctionFlags::INERT),
            )),
        )
        .unwrap();
    let result = e
        .evaluate(&Expr::apply_symbol(
            q,
            vec![add(vec![Expr::int(1), Expr::int(1)])],
        ))
        .unwrap();
    assert!(result.is_same(&Expr::int(2)));
}

#[test]
fn bound_symbols_evaluate_to_their_values() {
    let mut e = engine();
    let x = e.interner().intern("x");
    e.assign(x, Expr::int(5)).unwrap();
    let result = e.evaluate(&add(vec![Expr::symbol(x), Expr::int(1)])).unwrap();
    assert!(result.is_same(&Expr::int(6)));
}

#[test]
fn self_referential_bindings_hit_the_recursion_limit() {
    let mut e = engine();
    let x = e.interner().intern("x");
    e.assign(x, add(vec![Expr::symbol(x), Expr::int(1)])).unwrap();
    let result = e.evaluate(&Expr::symbol(x));
    assert!(matches!(result, Err(EngineError::RecursionLimit { .. })));
}

#[test]
fn anonymous_functions_apply_with_implicit_parameters() {
    let mut e = engine();
    let underscore = e.symbol("_");
    let body = add(vec![underscore, Expr::int(1)]);
    let lambda = Expr::apply_symbol(known::FUNCTION, vec![body]);
    let call = Expr::apply(Head::Expr(lambda), vec![Expr::int(41)]);
    let result = e.evaluate(&call).unwrap();
    assert!(result.is_same(&Expr::int(42)));
}

#[test]
fn anonymous_functions_apply_with_positional_parameters() {
    let mut e = engine();
    let (a, b) = (e.symbol("a"), e.symbol("b"));
    let body = mul(vec![a.clone(), b.clone()]);
    let lambda = Expr::apply_symbol(known::FUNCTION, vec![body, a, b]);
    let call = Expr::apply(Head::Expr(lambda), vec![Expr::int(3), Expr::int(4)]);
    let result = e.evaluate(&call).unwrap();
    assert!(result.is_same(&Expr::int(12)));
}

#[test]
fn symbols_bound_to_functions_apply_as_functions() {
    let mut e = engine();
    let underscore = e.symbol("_");
    let lambda = Expr::apply_symbol(
        known::FUNCTION,
        vec![mul(vec![underscore, Expr::int(2)])],
    );
    let double = e.interner().intern("double");
    e.assign(double, lambda).unwrap();
    let result = e
        .evaluate(&Expr::apply_symbol(double, vec![Expr::int(21)]))
        .unwrap();
    assert!(result.is_same(&Expr::int(42)));
}

#[test]
fn numeric_pass_approximates_constants_and_roots() {
    let mut e = engine();
    let pi = e.n(&Expr::symbol(known::PI)).unwrap();
    let v = pi.numeric_value().and_then(NumericValue::as_f64).unwrap();
    assert!((v - std::f64::consts::PI).abs() < 1e-12);

    let root = e.n(&call1(known::SQRT, Expr::int(2))).unwrap();
    let v = root.numeric_value().and_then(NumericValue::as_f64).unwrap();
    assert!((v - std::f64::consts::SQRT_2).abs() < 1e-12);

    let third = e
        .n(&Expr::apply_symbol(
            known::DIVIDE,
            vec![Expr::int(1), Expr::int(3)],
        ))
        .unwrap();
    let v = third.numeric_value().and_then(NumericValue::as_f64).unwrap();
    assert!((v - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn numeric_pass_rewrites_calculus_heads() {
    let mut e = engine();
    let x = e.symbol("x");
    let integral = Expr::apply_symbol(known::INTEGRATE, vec![x.clone()]);
    let result = e.n(&integral).unwrap();
    assert_eq!(result.head_symbol(), Some(known::NINTEGRATE));

    let limit = Expr::apply_symbol(known::LIMIT, vec![x]);
    let result = e.n(&limit).unwrap();
    assert_eq!(result.head_symbol(), Some(known::NLIMIT));
}

#[test]
fn machine_mode_collapses_complex_results_to_nan() {
    let mut e = engine();
    e.set_numeric_mode(NumericMode::Machine);
    let result = e.evaluate(&call1(known::SQRT, Expr::int(-4))).unwrap();
    assert!(result.numeric_value().is_some_and(NumericValue::is_nan));
}

#[test]
fn complex_mode_preserves_complex_results() {
    let mut e = engine();
    e.set_numeric_mode(NumericMode::Complex);
    let result = e.evaluate(&call1(known::SQRT, Expr::int(-4))).unwrap();
    let v = result.numeric_value().unwrap();
    assert!(v.approx_eq(&NumericValue::complex(0.0, 2.0), 1e-12));
}

#[test]
fn sign_inference_uses_literals_structure_and_assumptions() {
    let mut e = engine();
    assert_eq!(e.sgn(&Expr::int(5)).unwrap(), Sgn::Positive);
    assert_eq!(e.sgn(&Expr::int(0)).unwrap(), Sgn::Zero);
    assert_eq!(
        e.sgn(&Expr::number(NumericValue::complex(0.0, 1.0))).unwrap(),
        Sgn::NotReal
    );

    let x = e.interner().intern("x");
    assert_eq!(e.sgn(&Expr::symbol(x)).unwrap(), Sgn::Unknown);
    e.assume(x, SignCondition::Positive);
    assert_eq!(e.sgn(&Expr::symbol(x)).unwrap(), Sgn::Positive);
    assert_eq!(
        e.sgn(&Expr::apply_symbol(known::NEGATE, vec![Expr::symbol(x)]))
            .unwrap(),
        Sgn::Negative
    );
    assert_eq!(
        e.sgn(&call1(known::EXP, Expr::symbol(x))).unwrap(),
        Sgn::Positive
    );
    e.forget(x);
    assert_eq!(e.sgn(&Expr::symbol(x)).unwrap(), Sgn::Unknown);
}

#[test]
fn hold_wrapped_operands_never_evaluate() {
    let mut e = engine();
    let held = call1(known::HOLD, add(vec![Expr::int(1), Expr::int(1)]));
    let result = e
        .evaluate(&Expr::apply_symbol(known::LIST, vec![held.clone()]))
        .unwrap();
    assert!(result.ops()[0].is_same(&held));
}
