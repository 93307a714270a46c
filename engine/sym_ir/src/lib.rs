//! Symcore IR - the boxed expression model.
//!
//! This crate defines the normalised in-memory representation shared by
//! every stage of the engine:
//!
//! - [`Expr`] / [`ExprKind`] - immutable, reference-counted expression nodes
//! - [`NumericValue`] - the number kernel facade (exact rational, machine
//!   float, complex)
//! - [`DomainKind`] - the numeric/functional type lattice
//! - [`Name`] / [`StringInterner`] - compact interned identifiers
//! - [`ExprError`] / [`EngineError`] - the in-band and out-of-band error
//!   surfaces
//!
//! # Pipeline Position
//!
//! ```text
//! **sym_ir** → sym_rules → sym_eval → sym_solve
//! ```
//!
//! Nodes are immutable after construction; canonicalisation, simplification
//! and evaluation each produce a *new* node. Structural identity is cheap:
//! every node carries a deterministic 64-bit content digest computed at
//! construction, so `is_same` is a digest compare plus a verifying walk.
//!
//! # Thread Safety
//!
//! None, by contract. Nodes are `Rc`-shared and engines are single-threaded
//! cooperative; concurrent use must route through distinct engine instances.

mod digest;
mod domain;
mod error;
mod expr;
mod interner;
mod name;
mod num;
mod span;
mod tensor;

pub use digest::Digest;
pub use domain::DomainKind;
pub use error::{
    incompatible_domain, iteration_limit, missing_operand, unexpected_argument,
    unexpected_command, EngineError, EngineResult, ErrorKind, ExprError,
};
pub use expr::{Expr, ExprDisplay, ExprKind, Head, NodeFlags};
pub use interner::{is_valid_identifier, is_wildcard, known, StringInterner};
pub use name::Name;
pub use num::NumericValue;
pub use span::Span;
pub use tensor::{Tensor, TensorField};
