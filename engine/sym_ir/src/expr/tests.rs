use super::{Expr, Head};
use crate::error::missing_operand;
use crate::interner::known;
use crate::{DomainKind, Name, StringInterner};
use pretty_assertions::assert_eq;

fn interner() -> StringInterner {
    StringInterner::new()
}

#[test]
fn leaves_are_canonical_pure_and_valid() {
    let n = Expr::int(3);
    assert!(n.is_canonical());
    assert!(n.is_pure());
    assert!(n.is_valid());
    assert!(Expr::string("hello").is_canonical());
    assert!(Expr::domain(DomainKind::Integers).is_canonical());
}

#[test]
fn raw_applications_are_not_canonical() {
    let e = Expr::apply_symbol(known::ADD, vec![Expr::int(1), Expr::int(2)]);
    assert!(!e.is_canonical());
    assert!(e.is_pure());
    assert!(e.is_valid());
}

#[test]
fn error_nodes_taint_validity_upward() {
    let err = Expr::error(missing_operand("Divide"));
    assert!(err.is_canonical());
    assert!(!err.is_valid());
    let wrapped = Expr::apply_symbol(known::ADD, vec![Expr::int(1), err]);
    assert!(!wrapped.is_valid());
    assert!(!wrapped.is_pure());
}

#[test]
fn is_same_is_structural() {
    let it = interner();
    let x = it.intern("x");
    let a = Expr::apply_symbol(known::ADD, vec![Expr::int(1), Expr::symbol(x)]);
    let b = Expr::apply_symbol(known::ADD, vec![Expr::int(1), Expr::symbol(x)]);
    let c = Expr::apply_symbol(known::ADD, vec![Expr::symbol(x), Expr::int(1)]);
    assert!(a.is_same(&b));
    assert!(!a.is_same(&c));
}

#[test]
fn same_expressions_share_a_digest() {
    let it = interner();
    let x = it.intern("x");
    let a = Expr::apply_symbol(known::MULTIPLY, vec![Expr::int(5), Expr::symbol(x)]);
    let b = Expr::apply_symbol(known::MULTIPLY, vec![Expr::int(5), Expr::symbol(x)]);
    assert_eq!(a.content_hash(), b.content_hash());
}

#[test]
fn digest_is_order_preserving_for_children() {
    let it = interner();
    let x = it.intern("x");
    let ab = Expr::apply_symbol(known::POWER, vec![Expr::symbol(x), Expr::int(2)]);
    let ba = Expr::apply_symbol(known::POWER, vec![Expr::int(2), Expr::symbol(x)]);
    assert_ne!(ab.content_hash(), ba.content_hash());
}

#[test]
fn head_name_synthesises_literal_heads() {
    assert_eq!(Expr::int(1).head_name(), known::NUMBER);
    assert_eq!(Expr::string("s").head_name(), known::STRING);
    let it = interner();
    let f = it.intern("f");
    assert_eq!(Expr::apply_symbol(f, vec![]).head_name(), f);
}

#[test]
fn compound_heads_are_preserved() {
    let it = interner();
    let body = Expr::symbol(it.intern("t"));
    let lambda = Expr::apply_symbol(known::FUNCTION, vec![body]);
    let call = Expr::apply(Head::Expr(lambda.clone()), vec![Expr::int(1)]);
    assert!(call.head_symbol().is_none());
    assert_eq!(call.head_name(), Name::EMPTY);
    assert!(matches!(call.head(), Some(Head::Expr(e)) if e.is_same(&lambda)));
}

#[test]
fn has_symbol_sees_heads_and_leaves() {
    let it = interner();
    let x = it.intern("x");
    let f = it.intern("f");
    let e = Expr::apply_symbol(f, vec![Expr::symbol(x)]);
    assert!(e.has_symbol(x));
    assert!(e.has_symbol(f));
    assert!(!e.has_symbol(it.intern("y")));
}

#[test]
fn collect_symbols_is_first_occurrence_ordered() {
    let it = interner();
    let (x, y) = (it.intern("x"), it.intern("y"));
    let e = Expr::apply_symbol(
        known::ADD,
        vec![Expr::symbol(y), Expr::symbol(x), Expr::symbol(y)],
    );
    let mut out = Vec::new();
    e.collect_symbols(&mut out);
    assert_eq!(out, vec![y, x]);
}

#[test]
fn display_is_stable() {
    let it = interner();
    let x = it.intern("x");
    let e = Expr::apply_symbol(
        known::ADD,
        vec![Expr::int(1), Expr::rational(1, 2), Expr::symbol(x)],
    );
    assert_eq!(e.display(&it).to_string(), "Add(1, 1/2, x)");
}
