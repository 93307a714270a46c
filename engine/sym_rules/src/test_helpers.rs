//! Shared test support: a minimal host standing in for the engine.

use crate::RewriteHost;
use sym_ir::{EngineResult, Expr, ExprKind, NumericValue, StringInterner};

/// Host with identity canonicalisation and a node-count cost function.
///
/// Enough for exercising the matcher and rewriter without the engine:
/// canonicalisation is the identity, cost counts nodes, the deadline
/// never expires.
pub struct MockHost {
    interner: StringInterner,
    pub tolerance: f64,
}

impl MockHost {
    pub fn new() -> Self {
        MockHost {
            interner: StringInterner::new(),
            tolerance: 1e-10,
        }
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

fn node_count(expr: &Expr) -> u64 {
    1 + expr.ops().iter().map(node_count).sum::<u64>()
}

impl RewriteHost for MockHost {
    fn interner(&self) -> &StringInterner {
        &self.interner
    }

    fn canonicalize(&mut self, expr: &Expr) -> Expr {
        expr.clone()
    }

    fn cost(&mut self, expr: &Expr) -> u64 {
        node_count(expr)
    }

    fn check_continue(&mut self) -> EngineResult<()> {
        Ok(())
    }

    fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn sign_of(&mut self, expr: &Expr) -> Option<i8> {
        expr.numeric_value().and_then(NumericValue::sign)
    }

    fn numeric_approx(&mut self, expr: &Expr) -> Option<NumericValue> {
        match expr.kind() {
            ExprKind::Number(v) => Some(v.clone()),
            _ => None,
        }
    }
}
