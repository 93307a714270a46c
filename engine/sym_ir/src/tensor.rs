//! Multi-dimensional tensor payload.
//!
//! A tensor carries a shape, a base datatype and a flat, contiguous data
//! vector. The equivalent `List`-of-`List` function-application tree is not
//! stored; [`Tensor::to_list`] derives it on demand, and structural
//! comparison of the two forms agrees because the view is built from the
//! same element nodes.

use crate::interner::known;
use crate::{Digest, Expr};
use smallvec::SmallVec;

/// Base datatype of a tensor's elements, narrowest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TensorField {
    /// Boolean elements.
    Booleans,
    /// Integer elements.
    Integers,
    /// Numeric elements of any kind.
    Numbers,
    /// Arbitrary expression elements.
    Expressions,
}

impl TensorField {
    pub(crate) fn ordinal(self) -> u8 {
        match self {
            TensorField::Booleans => 0,
            TensorField::Integers => 1,
            TensorField::Numbers => 2,
            TensorField::Expressions => 3,
        }
    }
}

/// Multi-dimensional array of expressions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tensor {
    shape: SmallVec<[usize; 3]>,
    field: TensorField,
    data: Vec<Expr>,
}

impl Tensor {
    /// Create a tensor. Returns `None` when the shape does not describe the
    /// data length (the product of the dimensions must equal `data.len()`).
    pub fn new(shape: &[usize], field: TensorField, data: Vec<Expr>) -> Option<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() || shape.is_empty() {
            return None;
        }
        Some(Tensor {
            shape: SmallVec::from_slice(shape),
            field,
            data,
        })
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Shape vector.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Base datatype.
    pub fn field(&self) -> TensorField {
        self.field
    }

    /// Flat element storage, row-major.
    pub fn data(&self) -> &[Expr] {
        &self.data
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the tensor has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Element at a multi-index, row-major.
    pub fn get(&self, indices: &[usize]) -> Option<&Expr> {
        if indices.len() != self.shape.len() {
            return None;
        }
        let mut flat = 0usize;
        for (&idx, &dim) in indices.iter().zip(self.shape.iter()) {
            if idx >= dim {
                return None;
            }
            flat = flat * dim + idx;
        }
        self.data.get(flat)
    }

    /// Derive the equivalent nested `List` expression.
    pub fn to_list(&self) -> Expr {
        fn build(shape: &[usize], data: &[Expr]) -> Expr {
            match shape {
                [] | [_] => Expr::apply_canonical(known::LIST, data.to_vec(), true),
                [first, rest @ ..] => {
                    let chunk = data.len() / (*first).max(1);
                    let rows = data
                        .chunks(chunk.max(1))
                        .map(|row| build(rest, row))
                        .collect();
                    Expr::apply_canonical(known::LIST, rows, true)
                }
            }
        }
        build(&self.shape, &self.data)
    }

    pub(crate) fn digest_into(&self, digest: &mut Digest) {
        digest.write_u8(self.field.ordinal());
        for &dim in &self.shape {
            digest.write_u64(dim as u64);
        }
        for e in &self.data {
            digest.write_u64(e.content_hash());
        }
    }
}
