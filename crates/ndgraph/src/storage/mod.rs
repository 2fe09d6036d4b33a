//! Storage types for tensor data.
//!
//! ```text
//! TensorStorage<T> (trait)
//! └── Dense<T>  - contiguous, reference-counted buffer (copy-on-write)
//! ```

mod dense;

use crate::scalar::Scalar;

pub use dense::Dense;

/// Trait for tensor storage types.
///
/// Storage is always a flat vector; shape/strides come from the Tensor wrapper.
pub trait TensorStorage<T: Scalar>: Clone + std::fmt::Debug {
    /// Create storage with given length, zero-initialized.
    fn zeros(len: usize) -> Self;

    /// Create storage from existing vector.
    fn from_vec(data: Vec<T>) -> Self;

    /// Length of storage (number of elements).
    fn len(&self) -> usize;

    /// Check if storage is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get immutable slice of data.
    fn as_slice(&self) -> &[T];

    /// Get mutable slice of data.
    ///
    /// Shared storage is copied first, so writes never leak into other handles.
    fn as_mut_slice(&mut self) -> &mut [T];
}

impl<T: Scalar> TensorStorage<T> for Dense<T> {
    fn zeros(len: usize) -> Self {
        Dense::zeros(len)
    }

    fn from_vec(data: Vec<T>) -> Self {
        Dense::from_vec(data)
    }

    fn len(&self) -> usize {
        Dense::len(self)
    }

    fn as_slice(&self) -> &[T] {
        Dense::as_slice(self)
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        Dense::as_mut_slice(self)
    }
}
