//! The boxed expression node.
//!
//! # Design
//!
//! A node is an immutable tagged variant behind an `Rc`: cloning an [`Expr`]
//! is a pointer copy, and shared sub-expressions form a DAG (no child ever
//! points back at an ancestor). Three things are fixed at construction and
//! never recomputed:
//!
//! - the **content digest** (deterministic FNV-1a 64; order-preserving over
//!   function children, name-based for symbols), so `is_same(a, b)` implies
//!   `hash(a) == hash(b)`
//! - the **node flags** (`CANONICAL`, `PURE`, `VALID`)
//! - the payload itself
//!
//! Canonicalisation, simplification and evaluation therefore return *new*
//! nodes; the engine memoises derived forms in its own caches rather than
//! in the node.

use crate::interner::known;
use crate::{
    Digest, DomainKind, ExprError, Name, NumericValue, StringInterner, Tensor,
};
use bitflags::bitflags;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

bitflags! {
    /// Per-node properties, computed once at construction.
    #[derive(Copy, Clone, Eq, PartialEq, Debug)]
    pub struct NodeFlags: u8 {
        /// The node is the normalised representative of its equivalence
        /// class.
        const CANONICAL = 1 << 0;
        /// The node and all children have no observable side effects.
        /// Only pure canonical nodes may be cached.
        const PURE = 1 << 1;
        /// No `Error` node anywhere in the tree.
        const VALID = 1 << 2;
    }
}

/// Head of a function application: a symbol name once canonical, or a
/// nested expression still to be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Head {
    /// A symbol name (always the case for canonical nodes).
    Symbol(Name),
    /// A compound head, e.g. an anonymous `Function(...)` expression.
    Expr(Expr),
}

impl Head {
    /// The symbol name, when this head is one.
    #[inline]
    pub fn symbol(&self) -> Option<Name> {
        match self {
            Head::Symbol(name) => Some(*name),
            Head::Expr(_) => None,
        }
    }
}

/// Expression payload variants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// Literal numeric value.
    Number(NumericValue),
    /// Identifier; resolves through the scope stack at evaluation time.
    Symbol(Name),
    /// Opaque text literal.
    Str(Box<str>),
    /// Function application.
    Function {
        /// The applied head.
        head: Head,
        /// Ordered operand sequence.
        ops: Vec<Expr>,
    },
    /// Multi-dimensional array.
    Tensor(Tensor),
    /// Domain literal drawn from the lattice.
    Domain(DomainKind),
    /// In-band failure value.
    Error(ExprError),
}

struct ExprNode {
    kind: ExprKind,
    hash: u64,
    flags: NodeFlags,
}

/// A boxed expression: a shared, immutable expression node.
#[derive(Clone)]
pub struct Expr(Rc<ExprNode>);

impl Expr {
    fn make(kind: ExprKind, flags: NodeFlags) -> Expr {
        let hash = hash_kind(&kind);
        Expr(Rc::new(ExprNode { kind, hash, flags }))
    }

    // Leaf constructors (all leaves are canonical)

    /// Number literal.
    pub fn number(value: NumericValue) -> Expr {
        Expr::make(
            ExprKind::Number(value),
            NodeFlags::CANONICAL | NodeFlags::PURE | NodeFlags::VALID,
        )
    }

    /// Integer literal.
    pub fn int(n: i64) -> Expr {
        Expr::number(NumericValue::int(n))
    }

    /// Rational literal.
    pub fn rational(numer: i64, denom: i64) -> Expr {
        Expr::number(NumericValue::rational(numer, denom))
    }

    /// Float literal.
    pub fn float(v: f64) -> Expr {
        Expr::number(NumericValue::float(v))
    }

    /// Symbol.
    pub fn symbol(name: Name) -> Expr {
        Expr::make(
            ExprKind::Symbol(name),
            NodeFlags::CANONICAL | NodeFlags::PURE | NodeFlags::VALID,
        )
    }

    /// String literal.
    pub fn string(s: impl Into<Box<str>>) -> Expr {
        Expr::make(
            ExprKind::Str(s.into()),
            NodeFlags::CANONICAL | NodeFlags::PURE | NodeFlags::VALID,
        )
    }

    /// Domain literal.
    pub fn domain(d: DomainKind) -> Expr {
        Expr::make(
            ExprKind::Domain(d),
            NodeFlags::CANONICAL | NodeFlags::PURE | NodeFlags::VALID,
        )
    }

    /// In-band error node. Canonical by definition, but never valid and
    /// never pure (it must not be cached as a value).
    pub fn error(e: ExprError) -> Expr {
        Expr::make(ExprKind::Error(e), NodeFlags::CANONICAL)
    }

    /// Tensor literal. Canonical/pure/valid follow the element nodes.
    pub fn tensor(t: Tensor) -> Expr {
        let flags = combine_child_flags(
            NodeFlags::CANONICAL | NodeFlags::PURE | NodeFlags::VALID,
            t.data(),
        );
        Expr::make(ExprKind::Tensor(t), flags)
    }

    // Function constructors

    /// Raw (non-canonical) function application.
    pub fn apply(head: Head, ops: Vec<Expr>) -> Expr {
        let mut base = NodeFlags::PURE | NodeFlags::VALID;
        if let Head::Expr(h) = &head {
            base &= h.flags() | NodeFlags::CANONICAL;
        }
        let flags = combine_child_flags(base, &ops) - NodeFlags::CANONICAL;
        Expr::make(ExprKind::Function { head, ops }, flags)
    }

    /// Raw function application with a symbol head.
    pub fn apply_symbol(head: Name, ops: Vec<Expr>) -> Expr {
        Expr::apply(Head::Symbol(head), ops)
    }

    /// Canonical function application. The caller (the canonicaliser)
    /// vouches for the canonical form - held operand positions may
    /// legitimately stay raw - so the `CANONICAL` flag does not follow
    /// the children's flags. It is still withheld from invalid trees: an
    /// `Error` node is canonical itself but renders every containing
    /// expression non-canonical.
    pub fn apply_canonical(head: Name, ops: Vec<Expr>, pure: bool) -> Expr {
        let mut base = NodeFlags::VALID;
        if pure {
            base |= NodeFlags::PURE;
        }
        let mut flags = combine_child_flags(base, &ops) | NodeFlags::CANONICAL;
        if !flags.contains(NodeFlags::VALID) {
            flags -= NodeFlags::CANONICAL;
        }
        Expr::make(
            ExprKind::Function {
                head: Head::Symbol(head),
                ops,
            },
            flags,
        )
    }

    // Accessors

    /// Payload.
    #[inline]
    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    /// Content digest. Stable: `is_same(a, b)` implies equal digests.
    #[inline]
    pub fn content_hash(&self) -> u64 {
        self.0.hash
    }

    /// Node flags.
    #[inline]
    pub fn flags(&self) -> NodeFlags {
        self.0.flags
    }

    /// Whether this node is the normalised representative of its class.
    #[inline]
    pub fn is_canonical(&self) -> bool {
        self.0.flags.contains(NodeFlags::CANONICAL)
    }

    /// Whether the node and all children are side-effect free.
    #[inline]
    pub fn is_pure(&self) -> bool {
        self.0.flags.contains(NodeFlags::PURE)
    }

    /// Whether no `Error` node occurs anywhere in the tree.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0.flags.contains(NodeFlags::VALID)
    }

    /// Pointer identity (same shared node).
    #[inline]
    pub fn ptr_eq(&self, other: &Expr) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Structural equality.
    pub fn is_same(&self, other: &Expr) -> bool {
        self.ptr_eq(other) || (self.0.hash == other.0.hash && self.0.kind == other.0.kind)
    }

    /// The head of a function node.
    pub fn head(&self) -> Option<&Head> {
        match &self.0.kind {
            ExprKind::Function { head, .. } => Some(head),
            _ => None,
        }
    }

    /// The head's symbol name for a function node with a resolved head.
    pub fn head_symbol(&self) -> Option<Name> {
        self.head().and_then(Head::symbol)
    }

    /// The node's head name: the applied symbol for function nodes, the
    /// synthesised literal head otherwise (`Number`, `String`, ...).
    /// `Name::EMPTY` for a function whose head is still a compound.
    pub fn head_name(&self) -> Name {
        match &self.0.kind {
            ExprKind::Number(_) => known::NUMBER,
            ExprKind::Symbol(_) => known::SYMBOL,
            ExprKind::Str(_) => known::STRING,
            ExprKind::Function { head, .. } => head.symbol().unwrap_or(Name::EMPTY),
            ExprKind::Tensor(_) => known::TENSOR,
            ExprKind::Domain(_) => known::DOMAIN,
            ExprKind::Error(_) => known::ERROR,
        }
    }

    /// Child sequence; empty for leaves.
    pub fn ops(&self) -> &[Expr] {
        match &self.0.kind {
            ExprKind::Function { ops, .. } => ops,
            _ => &[],
        }
    }

    /// Number of children.
    pub fn nops(&self) -> usize {
        self.ops().len()
    }

    /// Child at an index.
    pub fn op(&self, index: usize) -> Option<&Expr> {
        self.ops().get(index)
    }

    /// The symbol name, for symbol nodes.
    pub fn symbol_name(&self) -> Option<Name> {
        match &self.0.kind {
            ExprKind::Symbol(name) => Some(*name),
            _ => None,
        }
    }

    /// The literal value, for number nodes.
    pub fn numeric_value(&self) -> Option<&NumericValue> {
        match &self.0.kind {
            ExprKind::Number(v) => Some(v),
            _ => None,
        }
    }

    /// The string payload, for string nodes.
    pub fn as_str(&self) -> Option<&str> {
        match &self.0.kind {
            ExprKind::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The domain payload, for domain nodes.
    pub fn domain_kind(&self) -> Option<DomainKind> {
        match &self.0.kind {
            ExprKind::Domain(d) => Some(*d),
            _ => None,
        }
    }

    /// The error payload, for error nodes.
    pub fn error_value(&self) -> Option<&ExprError> {
        match &self.0.kind {
            ExprKind::Error(e) => Some(e),
            _ => None,
        }
    }

    /// The tensor payload, for tensor nodes.
    pub fn tensor_value(&self) -> Option<&Tensor> {
        match &self.0.kind {
            ExprKind::Tensor(t) => Some(t),
            _ => None,
        }
    }

    /// Whether this is a function node applying `name`.
    pub fn is_function_named(&self, name: Name) -> bool {
        self.head_symbol() == Some(name)
    }

    /// Whether this is a number node.
    pub fn is_number(&self) -> bool {
        matches!(self.0.kind, ExprKind::Number(_))
    }

    /// Whether this is a symbol node.
    pub fn is_symbol(&self) -> bool {
        matches!(self.0.kind, ExprKind::Symbol(_))
    }

    /// Whether this is a function node.
    pub fn is_function(&self) -> bool {
        matches!(self.0.kind, ExprKind::Function { .. })
    }

    /// Whether this is an error node.
    pub fn is_error(&self) -> bool {
        matches!(self.0.kind, ExprKind::Error(_))
    }

    /// Whether `symbol` occurs anywhere in this tree (as a symbol leaf or
    /// as a function head).
    pub fn has_symbol(&self, symbol: Name) -> bool {
        match &self.0.kind {
            ExprKind::Symbol(name) => *name == symbol,
            ExprKind::Function { head, ops } => {
                let in_head = match head {
                    Head::Symbol(name) => *name == symbol,
                    Head::Expr(e) => e.has_symbol(symbol),
                };
                in_head || ops.iter().any(|op| op.has_symbol(symbol))
            }
            ExprKind::Tensor(t) => t.data().iter().any(|e| e.has_symbol(symbol)),
            _ => false,
        }
    }

    /// Whether `needle` occurs in this tree as a sub-expression (including
    /// the tree itself).
    pub fn contains(&self, needle: &Expr) -> bool {
        if self.is_same(needle) {
            return true;
        }
        match &self.0.kind {
            ExprKind::Function { head, ops } => {
                let in_head = match head {
                    Head::Symbol(name) => needle.symbol_name() == Some(*name),
                    Head::Expr(e) => e.contains(needle),
                };
                in_head || ops.iter().any(|op| op.contains(needle))
            }
            ExprKind::Tensor(t) => t.data().iter().any(|e| e.contains(needle)),
            _ => false,
        }
    }

    /// Collect the free symbols of the tree into `out`, in first-occurrence
    /// order. Function heads do not count as free variables.
    pub fn collect_symbols(&self, out: &mut Vec<Name>) {
        match &self.0.kind {
            ExprKind::Symbol(name) => {
                if !out.contains(name) {
                    out.push(*name);
                }
            }
            ExprKind::Function { head, ops } => {
                if let Head::Expr(e) = head {
                    e.collect_symbols(out);
                }
                for op in ops {
                    op.collect_symbols(out);
                }
            }
            ExprKind::Tensor(t) => {
                for e in t.data() {
                    e.collect_symbols(out);
                }
            }
            _ => {}
        }
    }

    /// Displayable form; names resolve through `interner`.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> ExprDisplay<'a> {
        ExprDisplay {
            expr: self,
            interner,
        }
    }
}

/// Start from `base` and clear whatever the children do not uphold.
fn combine_child_flags(base: NodeFlags, children: &[Expr]) -> NodeFlags {
    let mut flags = base;
    for child in children {
        if !child.is_canonical() {
            flags -= NodeFlags::CANONICAL;
        }
        if !child.is_pure() {
            flags -= NodeFlags::PURE;
        }
        if !child.is_valid() {
            flags -= NodeFlags::VALID;
        }
    }
    flags
}

fn hash_kind(kind: &ExprKind) -> u64 {
    let mut digest = Digest::new();
    match kind {
        ExprKind::Number(v) => {
            digest.write_u8(1);
            v.digest_into(&mut digest);
        }
        ExprKind::Symbol(name) => {
            digest.write_u8(2);
            digest.write_u32(name.raw());
        }
        ExprKind::Str(s) => {
            digest.write_u8(3);
            digest.write(s.as_bytes());
        }
        ExprKind::Function { head, ops } => {
            digest.write_u8(4);
            match head {
                Head::Symbol(name) => digest.write_u32(name.raw()),
                Head::Expr(e) => digest.write_u64(e.content_hash()),
            }
            for op in ops {
                digest.write_u64(op.content_hash());
            }
        }
        ExprKind::Tensor(t) => {
            digest.write_u8(5);
            t.digest_into(&mut digest);
        }
        ExprKind::Domain(d) => {
            digest.write_u8(6);
            digest.write_u8(d.ordinal());
        }
        ExprKind::Error(e) => {
            digest.write_u8(7);
            digest.write(e.kind.as_str().as_bytes());
            digest.write(e.message.as_bytes());
        }
    }
    digest.finish()
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0.kind, f)
    }
}

/// Display adapter resolving names through an interner.
pub struct ExprDisplay<'a> {
    expr: &'a Expr,
    interner: &'a StringInterner,
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_expr(f, self.expr, self.interner)
    }
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, interner: &StringInterner) -> fmt::Result {
    match expr.kind() {
        ExprKind::Number(v) => write!(f, "{v}"),
        ExprKind::Symbol(name) => f.write_str(interner.resolve(*name)),
        ExprKind::Str(s) => write!(f, "\"{s}\""),
        ExprKind::Function { head, ops } => {
            match head {
                Head::Symbol(name) => f.write_str(interner.resolve(*name))?,
                Head::Expr(e) => write_expr(f, e, interner)?,
            }
            f.write_str("(")?;
            for (i, op) in ops.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_expr(f, op, interner)?;
            }
            f.write_str(")")
        }
        ExprKind::Tensor(t) => {
            f.write_str("Tensor[")?;
            for (i, dim) in t.shape().iter().enumerate() {
                if i > 0 {
                    f.write_str("x")?;
                }
                write!(f, "{dim}")?;
            }
            f.write_str("](")?;
            for (i, e) in t.data().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_expr(f, e, interner)?;
            }
            f.write_str(")")
        }
        ExprKind::Domain(d) => f.write_str(d.as_str()),
        ExprKind::Error(e) => write!(f, "Error({}, \"{}\")", e.kind, e.message),
    }
}

#[cfg(test)]
mod tests;
