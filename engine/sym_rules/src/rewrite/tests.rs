use super::{match_rules, replace, RewriteOptions};
use crate::test_helpers::MockHost;
use crate::{RewriteHost, Rule, RuleSet, Substitution};
use pretty_assertions::assert_eq;
use sym_ir::{known, Expr};

fn sub() -> Substitution {
    Substitution::new()
}

#[test]
fn match_rules_collects_every_rewrite() {
    let mut host = MockHost::new();
    let a = host.interner().intern("_a");
    // Two unconditional rules both matching any single expression.
    let mut rules = RuleSet::new();
    rules.push(
        Rule::new(
            Expr::symbol(a),
            Expr::apply_symbol(known::LIST, vec![Expr::symbol(a)]),
        )
        .with_id("wrap"),
    );
    rules.push(Rule::new(Expr::symbol(a), Expr::int(0)).with_id("zero"));
    let out = match_rules(&Expr::int(5), &rules, &mut host, &sub()).unwrap();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].rule_id, Some("wrap"));
    assert_eq!(out[1].rule_id, Some("zero"));
    assert!(out[1].expr.is_same(&Expr::int(0)));
}

#[test]
fn conditions_gate_rewrites() {
    let mut host = MockHost::new();
    let a = host.interner().intern("_a");
    let mut rules = RuleSet::new();
    rules.push(
        Rule::new(Expr::symbol(a), Expr::int(1)).when(
            move |bindings: &Substitution, host: &mut dyn RewriteHost| {
                bindings
                    .get(a)
                    .and_then(|e| host.sign_of(e))
                    .is_some_and(|s| s > 0)
            },
        ),
    );
    assert_eq!(
        match_rules(&Expr::int(5), &rules, &mut host, &sub())
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        match_rules(&Expr::int(-5), &rules, &mut host, &sub())
            .unwrap()
            .len(),
        0
    );
}

#[test]
fn replace_vanishing_product() {
    // Multiply(_x, __a) -> 0 when __a does not contain _x.
    let mut host = MockHost::new();
    let x = host.interner().intern("_x");
    let a = host.interner().intern("__a");
    let sym_x = host.interner().intern("x");
    let mut rules = RuleSet::new();
    rules.push(
        Rule::new(
            Expr::apply_symbol(known::MULTIPLY, vec![Expr::symbol(x), Expr::symbol(a)]),
            Expr::int(0),
        )
        .when(move |bindings: &Substitution, _: &mut dyn RewriteHost| {
            match (bindings.get(a), bindings.get(x)) {
                (Some(coeff), Some(var)) => !coeff.contains(var),
                _ => false,
            }
        }),
    );
    let subject = Expr::apply_symbol(known::MULTIPLY, vec![Expr::int(5), Expr::symbol(sym_x)]);
    let out = replace(&subject, &rules, &mut host, &RewriteOptions::default()).unwrap();
    assert!(out.is_some_and(|e| e.is_same(&Expr::int(0))));
}

#[test]
fn replace_reaches_fixed_point_bottom_up() {
    // Negate(Negate(_a)) -> _a, applied inside a wrapper.
    let mut host = MockHost::new();
    let a = host.interner().intern("_a");
    let y = host.interner().intern("y");
    let mut rules = RuleSet::new();
    rules.push(Rule::new(
        Expr::apply_symbol(
            known::NEGATE,
            vec![Expr::apply_symbol(known::NEGATE, vec![Expr::symbol(a)])],
        ),
        Expr::symbol(a),
    ));
    // Negate^4(y) inside a List collapses to y.
    let mut e = Expr::symbol(y);
    for _ in 0..4 {
        e = Expr::apply_symbol(known::NEGATE, vec![e]);
    }
    let subject = Expr::apply_symbol(known::LIST, vec![e]);
    let out = replace(&subject, &rules, &mut host, &RewriteOptions::default())
        .unwrap()
        .unwrap();
    assert!(out.ops()[0].is_same(&Expr::symbol(y)));
}

#[test]
fn replace_returns_none_when_nothing_fires() {
    let mut host = MockHost::new();
    let rules = RuleSet::new();
    let subject = Expr::int(42);
    assert!(replace(&subject, &rules, &mut host, &RewriteOptions::default())
        .unwrap()
        .is_none());
}

#[test]
fn cost_bias_rejects_expensive_rewrites() {
    let mut host = MockHost::new();
    let mut rules = RuleSet::new();
    // Inflate a bare number into a deep wrapper: 4 nodes from 1, far past
    // the 1.2 bias.
    rules.push(Rule::new(
        Expr::int(7),
        Expr::apply_symbol(
            known::LIST,
            vec![Expr::apply_symbol(
                known::LIST,
                vec![Expr::apply_symbol(known::LIST, vec![Expr::int(7)])],
            )],
        ),
    ));
    let out = replace(&Expr::int(7), &rules, &mut host, &RewriteOptions::default()).unwrap();
    assert!(out.is_none());
}

#[test]
fn iteration_limit_bounds_divergent_rule_sets() {
    let mut host = MockHost::new();
    let a = host.interner().intern("_a");
    // List(_a) -> List(List(_a)) grows forever but stays within the cost
    // bias at each step for larger trees; the budget must stop it.
    let mut rules = RuleSet::new();
    rules.push(Rule::new(
        Expr::apply_symbol(known::LIST, vec![Expr::symbol(a)]),
        Expr::apply_symbol(
            known::LIST,
            vec![Expr::apply_symbol(known::LIST, vec![Expr::symbol(a)])],
        ),
    ));
    let subject = Expr::apply_symbol(
        known::LIST,
        vec![Expr::apply_symbol(
            known::LIST,
            vec![Expr::apply_symbol(
                known::LIST,
                vec![Expr::apply_symbol(known::LIST, vec![Expr::int(1)])],
            )],
        )],
    );
    let options = RewriteOptions {
        cost_bias: 2.0,
        iteration_limit: 16,
    };
    // Terminates despite the divergent rule.
    let out = replace(&subject, &rules, &mut host, &options).unwrap();
    assert!(out.is_some());
}
