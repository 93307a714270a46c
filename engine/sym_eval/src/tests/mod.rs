//! Engine-level tests, split by pass.

// Tests use unwrap() to panic on unexpected state, making failures immediately visible
#![allow(clippy::unwrap_used)]

mod eval_tests;
mod simplify_tests;

use crate::Engine;
use sym_ir::{known, Expr, Name};

pub(crate) fn engine() -> Engine {
    Engine::new()
}

pub(crate) fn add(ops: Vec<Expr>) -> Expr {
    Expr::apply_symbol(known::ADD, ops)
}

pub(crate) fn mul(ops: Vec<Expr>) -> Expr {
    Expr::apply_symbol(known::MULTIPLY, ops)
}

pub(crate) fn pow(base: Expr, exp: Expr) -> Expr {
    Expr::apply_symbol(known::POWER, vec![base, exp])
}

pub(crate) fn neg(op: Expr) -> Expr {
    Expr::apply_symbol(known::NEGATE, vec![op])
}

pub(crate) fn call1(head: Name, op: Expr) -> Expr {
    Expr::apply_symbol(head, vec![op])
}

pub(crate) fn rendered(engine: &Engine, expr: &Expr) -> String {
    expr.display(engine.interner()).to_string()
}
