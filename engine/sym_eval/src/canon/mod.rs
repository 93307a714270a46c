//! Canonicalisation.
//!
//! Turns a raw tree into its canonical form, top-down:
//!
//! 1. Compound heads resolve to a symbol (or the node stays non-canonical).
//! 2. The numeric heads take short paths through the arithmetic builder.
//! 3. Otherwise the function definition drives the pipeline: hold-aware
//!    child canonicalisation, the `canonical` handler (solely responsible
//!    when registered), `Sequence` splicing, associative flattening,
//!    arity/domain checks (in-band errors), involution and idempotence,
//!    and the commutative sort.
//!
//! Canonical nodes are marked at construction, so re-canonicalising is a
//! flag test: `canonical(canonical(e)) == canonical(e)` by construction.

pub(crate) mod arith;
pub(crate) mod order;

use crate::engine::Engine;
use crate::registry::{FunctionDef, FunctionFlags};
use smallvec::SmallVec;
use std::rc::Rc;
use sym_ir::{
    incompatible_domain, known, missing_operand, unexpected_argument, EngineError, EngineResult,
    Expr, ExprKind, Head, Name, Tensor,
};
use tracing::trace;

pub use order::{compare, total_degree};

/// Canonicalise `expr`.
pub(crate) fn canonicalize(engine: &mut Engine, expr: &Expr) -> EngineResult<Expr> {
    if expr.is_canonical() {
        return Ok(expr.clone());
    }
    engine.should_continue()?;
    match expr.kind() {
        // Leaves are canonical at construction; a non-canonical tensor has
        // non-canonical elements.
        ExprKind::Tensor(t) => {
            let mut data = Vec::with_capacity(t.len());
            for e in t.data() {
                data.push(canonicalize(engine, e)?);
            }
            Ok(Tensor::new(t.shape(), t.field(), data)
                .map_or_else(|| expr.clone(), Expr::tensor))
        }
        ExprKind::Function { head, ops } => canonical_function(engine, head, ops),
        _ => Ok(expr.clone()),
    }
}

/// Canonicalise one operand: `ReleaseHold` is stripped and processed
/// regardless of policy, held positions pass through untouched.
pub(crate) fn canonical_operand(
    engine: &mut Engine,
    op: &Expr,
    held: bool,
) -> EngineResult<Expr> {
    if op.is_function_named(known::RELEASE_HOLD) && op.nops() == 1 {
        return canonicalize(engine, &op.ops()[0]);
    }
    if held {
        Ok(op.clone())
    } else {
        canonicalize(engine, op)
    }
}

fn canonical_function(engine: &mut Engine, head: &Head, ops: &[Expr]) -> EngineResult<Expr> {
    // Resolve a compound head to a symbol when it evaluates to one.
    let name = match head {
        Head::Symbol(name) => *name,
        Head::Expr(e) => {
            let resolved = canonicalize(engine, e)?;
            match resolved.symbol_name() {
                Some(name) => name,
                None => {
                    // Anonymous-function heads are applied at evaluation
                    // time; anything else stays, non-canonical.
                    let mut children = Vec::with_capacity(ops.len());
                    for op in ops {
                        children.push(canonicalize(engine, op)?);
                    }
                    return Ok(Expr::apply(Head::Expr(resolved), children));
                }
            }
        }
    };

    if arith::is_short_path(name) {
        return arith::canonical_arith(engine, name, ops);
    }

    let Some(def) = engine.lookup_function(name) else {
        // Unknown head: canonical children, spliced sequences.
        let mut children = Vec::with_capacity(ops.len());
        for op in ops {
            let c = canonical_operand(engine, op, false)?;
            splice(&mut children, c);
        }
        return Ok(Expr::apply_canonical(name, children, true));
    };

    // Hold-aware child canonicalisation.
    let hold = def.hold();
    let mut children: Vec<Expr> = Vec::with_capacity(ops.len());
    for (i, op) in ops.iter().enumerate() {
        let held = hold.holds(i, ops.len());
        children.push(canonical_operand(engine, op, held)?);
    }

    // A registered canonical handler is solely responsible for
    // validation and ordering; its result is returned verbatim.
    if let Some(handler) = def.canonical_handler() {
        match handler(engine, &children) {
            Ok(Some(result)) => return Ok(result),
            Ok(None) => {}
            Err(EngineError::Internal { message }) => {
                trace!(%message, "canonical handler failed; boxing non-canonical");
                return Ok(Expr::apply_symbol(name, children));
            }
            Err(other) => return Err(other),
        }
    }

    let mut spliced = Vec::with_capacity(children.len());
    for child in children {
        splice(&mut spliced, child);
    }
    let mut children = spliced;

    if def.flags().contains(FunctionFlags::ASSOCIATIVE) {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            if child.is_function_named(name) {
                flat.extend(child.ops().iter().cloned());
            } else {
                flat.push(child);
            }
        }
        children = flat;
    }

    check_signature(engine, &def, name, &mut children);

    if def.flags().contains(FunctionFlags::INVOLUTION)
        && children.len() == 1
        && children[0].is_function_named(name)
        && children[0].nops() == 1
    {
        return Ok(children[0].ops()[0].clone());
    }
    if def.flags().contains(FunctionFlags::IDEMPOTENT)
        && children.len() == 1
        && children[0].is_function_named(name)
    {
        return Ok(children[0].clone());
    }

    if def.flags().contains(FunctionFlags::COMMUTATIVE) {
        let multiplicative = name == known::MULTIPLY;
        children.sort_by(|a, b| order::compare(engine.interner(), a, b, multiplicative));
    }

    let pure = def.flags().contains(FunctionFlags::PURE);
    Ok(Expr::apply_canonical(name, children, pure))
}

/// Splice `Sequence` children into the operand list.
fn splice(out: &mut Vec<Expr>, child: Expr) {
    if child.is_function_named(known::SEQUENCE) {
        out.extend(child.ops().iter().cloned());
    } else {
        out.push(child);
    }
}

/// An indexable collection: `List`, `Range`, `Set`, or a tensor literal.
pub(crate) fn is_collection(expr: &Expr) -> bool {
    matches!(
        expr.head_symbol(),
        Some(known::LIST | known::RANGE | known::SET)
    ) || matches!(expr.kind(), ExprKind::Tensor(_))
}

/// Check arity and operand domains against the signature, wrapping
/// violations as in-band errors; canonicalisation itself never fails on
/// them.
fn check_signature(engine: &mut Engine, def: &Rc<FunctionDef>, name: Name, children: &mut Vec<Expr>) {
    let signature = def.signature();
    let head = engine.interner().resolve(name);
    let min = signature.min_arity();
    while children.len() < min {
        children.push(Expr::error(missing_operand(head)));
    }
    if let Some(max) = signature.max_arity() {
        if children.len() > max {
            let surplus: SmallVec<[usize; 4]> = (max..children.len()).collect();
            for i in surplus {
                children[i] = Expr::error(unexpected_argument(head, i));
            }
        }
    }
    let threadable = def.flags().contains(FunctionFlags::THREADABLE);
    for (i, child) in children.iter_mut().enumerate() {
        if child.is_error() {
            continue;
        }
        // Collection operands of threadable heads are zipped at
        // evaluation time; their element domains are checked then.
        if threadable && is_collection(child) {
            continue;
        }
        let Some(expected) = signature.param_at(i) else {
            continue;
        };
        let actual = engine.domain_of(child);
        // Anything-domain operands (unbound symbols, unknown applications)
        // are accepted; they may narrow later.
        if actual == sym_ir::DomainKind::Anything {
            continue;
        }
        if !actual.is_compatible(expected) {
            *child = Expr::error(incompatible_domain(head, expected.as_str(), actual.as_str()));
        }
    }
}
