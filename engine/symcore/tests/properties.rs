//! Quantified invariants over randomly generated expression trees.

// Tests use unwrap() to panic on unexpected state, making failures immediately visible
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rustc_hash::FxHashMap;
use symcore::{known, Engine, Expr, ExprKind, Name};

/// Generator-side description of an expression tree; materialised
/// against a concrete engine inside each test case.
#[derive(Clone, Debug)]
enum Tree {
    Int(i8),
    Rational(i8, u8),
    Sym(u8),
    Add(Vec<Tree>),
    Mul(Vec<Tree>),
    Neg(Box<Tree>),
    Pow(Box<Tree>, u8),
}

const SYMBOLS: [&str; 3] = ["x", "y", "z"];

fn arb_tree() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        any::<i8>().prop_map(Tree::Int),
        (any::<i8>(), 1u8..9).prop_map(|(n, d)| Tree::Rational(n, d)),
        (0u8..3).prop_map(Tree::Sym),
    ];
    leaf.prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Tree::Add),
            prop::collection::vec(inner.clone(), 0..4).prop_map(Tree::Mul),
            inner.clone().prop_map(|t| Tree::Neg(Box::new(t))),
            (inner, 0u8..4).prop_map(|(t, e)| Tree::Pow(Box::new(t), e)),
        ]
    })
}

fn build(engine: &Engine, tree: &Tree) -> Expr {
    match tree {
        Tree::Int(n) => Expr::int(i64::from(*n)),
        Tree::Rational(n, d) => Expr::rational(i64::from(*n), i64::from(*d)),
        Tree::Sym(i) => engine.symbol(SYMBOLS[usize::from(*i) % SYMBOLS.len()]),
        Tree::Add(ops) => Expr::apply_symbol(
            known::ADD,
            ops.iter().map(|t| build(engine, t)).collect(),
        ),
        Tree::Mul(ops) => Expr::apply_symbol(
            known::MULTIPLY,
            ops.iter().map(|t| build(engine, t)).collect(),
        ),
        Tree::Neg(t) => Expr::apply_symbol(known::NEGATE, vec![build(engine, t)]),
        Tree::Pow(t, e) => Expr::apply_symbol(
            known::POWER,
            vec![build(engine, t), Expr::int(i64::from(*e))],
        ),
    }
}

/// No `Add`-in-`Add`, `Multiply`-in-`Multiply`, or `Sequence` operand
/// anywhere in the tree.
fn is_flat(expr: &Expr) -> bool {
    let ExprKind::Function { ops, .. } = expr.kind() else {
        return true;
    };
    let head = expr.head_symbol();
    for op in ops {
        if op.is_function_named(known::SEQUENCE) {
            return false;
        }
        if matches!(head, Some(name) if (name == known::ADD || name == known::MULTIPLY)
            && op.head_symbol() == head)
        {
            return false;
        }
        if !is_flat(op) {
            return false;
        }
    }
    true
}

fn commutative_children_sorted(engine: &Engine, expr: &Expr) -> bool {
    let ExprKind::Function { ops, .. } = expr.kind() else {
        return true;
    };
    if matches!(expr.head_symbol(), Some(known::ADD | known::MULTIPLY)) {
        let multiplicative = expr.head_symbol() == Some(known::MULTIPLY);
        let sorted = ops.windows(2).all(|pair| {
            sym_eval::compare(engine.interner(), &pair[0], &pair[1], multiplicative)
                != std::cmp::Ordering::Greater
        });
        if !sorted {
            return false;
        }
    }
    ops.iter().all(|op| commutative_children_sorted(engine, op))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn canonicalisation_is_idempotent(tree in arb_tree()) {
        let mut engine = Engine::new();
        let expr = build(&engine, &tree);
        let once = engine.canonical(&expr).unwrap();
        let twice = engine.canonical(&once).unwrap();
        prop_assert!(once.is_same(&twice));
    }

    #[test]
    fn structural_equality_implies_equal_hashes(tree in arb_tree()) {
        let engine = Engine::new();
        let a = build(&engine, &tree);
        let b = build(&engine, &tree);
        prop_assert!(a.is_same(&b));
        prop_assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn canonical_forms_are_flat(tree in arb_tree()) {
        let mut engine = Engine::new();
        let expr = build(&engine, &tree);
        let canonical = engine.canonical(&expr).unwrap();
        prop_assert!(is_flat(&canonical));
    }

    #[test]
    fn commutative_children_are_ordered(tree in arb_tree()) {
        let mut engine = Engine::new();
        let expr = build(&engine, &tree);
        let canonical = engine.canonical(&expr).unwrap();
        prop_assert!(commutative_children_sorted(&engine, &canonical));
    }

    #[test]
    fn substitution_commutes_with_canonicalisation(tree in arb_tree(), value in -9i8..9) {
        let mut engine = Engine::new();
        let expr = build(&engine, &tree);
        let x: Name = engine.interner().intern("x");
        let mut map = FxHashMap::default();
        map.insert(x, Expr::int(i64::from(value)));

        let substituted_first = {
            let raw = engine.subs(&expr, &map);
            engine.canonical(&raw).unwrap()
        };
        let canonicalised_first = {
            let canonical = engine.canonical(&expr).unwrap();
            let raw = engine.subs(&canonical, &map);
            engine.canonical(&raw).unwrap()
        };
        prop_assert!(substituted_first.is_same(&canonicalised_first));
    }

    #[test]
    fn simplification_is_total(tree in arb_tree()) {
        let mut engine = Engine::new();
        let expr = build(&engine, &tree);
        let simplified = engine.simplify(&expr, &symcore::SimplifyOptions::default()).unwrap();
        // And stable: simplifying the result changes nothing structural.
        let again = engine.simplify(&simplified, &symcore::SimplifyOptions::default()).unwrap();
        prop_assert!(simplified.is_same(&again));
    }

    #[test]
    fn threading_distributes_elementwise(values in prop::collection::vec(-20i64..20, 1..6)) {
        let mut engine = Engine::new();
        let list = Expr::apply_symbol(
            known::LIST,
            values.iter().copied().map(Expr::int).collect(),
        );
        let threaded = engine
            .evaluate(&Expr::apply_symbol(known::NEGATE, vec![list]))
            .unwrap();
        if values.len() == 1 {
            prop_assert!(threaded.is_same(&Expr::int(-values[0])));
        } else {
            prop_assert_eq!(threaded.nops(), values.len());
            for (op, v) in threaded.ops().iter().zip(values.iter()) {
                prop_assert!(op.is_same(&Expr::int(-v)));
            }
        }
    }
}
