//! Node types and unification.
//!
//! The lattice is closed: a type is a scalar of some dtype, a tensor of some
//! rank and dtype, or an unresolved variable. Unification never coerces.

use crate::dtype::DType;
use crate::error::GraphError;
use crate::shape::Shape;
use std::fmt;

/// An unresolved type placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeVar(pub u32);

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'t{}", self.0)
    }
}

/// The static type of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Scalar(DType),
    Tensor { dims: usize, of: DType },
    Var(TypeVar),
}

impl Type {
    /// A tensor type of the given rank; rank 0 normalizes to a scalar type.
    pub fn tensor(dims: usize, of: DType) -> Self {
        if dims == 0 {
            Type::Scalar(of)
        } else {
            Type::Tensor { dims, of }
        }
    }

    /// The type of a value with `dtype` elements laid out in `shape`.
    ///
    /// ```
    /// use ndgraph::{DType, Shape, Type};
    ///
    /// assert_eq!(Type::of(DType::Float64, &Shape::scalar()), Type::Scalar(DType::Float64));
    /// assert_eq!(Type::of(DType::Int, &Shape::from((2, 3))), Type::tensor(2, DType::Int));
    /// ```
    pub fn of(dtype: DType, shape: &Shape) -> Self {
        Type::tensor(shape.rank(), dtype)
    }

    /// Element dtype; `None` for an unresolved variable.
    pub fn dtype(&self) -> Option<DType> {
        match self {
            Type::Scalar(d) | Type::Tensor { of: d, .. } => Some(*d),
            Type::Var(_) => None,
        }
    }

    /// Rank; `None` for an unresolved variable.
    pub fn dims(&self) -> Option<usize> {
        match self {
            Type::Scalar(_) => Some(0),
            Type::Tensor { dims, .. } => Some(*dims),
            Type::Var(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Type::Scalar(_))
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Type::Var(_))
    }

    /// Check that `shape` is consistent with this type.
    pub(crate) fn check_shape(&self, context: &str, shape: &Shape) -> Result<(), GraphError> {
        match self.dims() {
            Some(dims) if dims != shape.rank() => Err(GraphError::RankMismatch {
                context: context.to_string(),
                expected: dims,
                shape: shape.clone(),
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Scalar(d) => write!(f, "{d}"),
            Type::Tensor { dims, of } => write!(f, "Tensor-{dims} {of}"),
            Type::Var(v) => write!(f, "{v}"),
        }
    }
}

impl From<DType> for Type {
    fn from(dtype: DType) -> Self {
        Type::Scalar(dtype)
    }
}

/// Unify two types.
///
/// A variable unifies with anything and yields the other side; two resolved
/// types unify only when equal.
///
/// # Errors
///
/// Returns `GraphError::TypeMismatch` when the types differ.
pub fn unify(a: &Type, b: &Type) -> Result<Type, GraphError> {
    match (a, b) {
        (Type::Var(_), other) | (other, Type::Var(_)) => Ok(other.clone()),
        _ if a == b => Ok(a.clone()),
        _ => Err(GraphError::type_mismatch("unify", a, b)),
    }
}
