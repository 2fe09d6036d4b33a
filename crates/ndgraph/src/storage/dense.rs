//! Dense storage for tensor data.

use crate::scalar::Scalar;
use std::sync::Arc;

/// Dense storage - contiguous array of elements in row-major order.
///
/// The buffer is reference counted: cloning is cheap, and the first write
/// through a shared handle copies the buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense<ElT: Scalar> {
    data: Arc<Vec<ElT>>,
}

impl<ElT: Scalar> Dense<ElT> {
    /// Create dense storage with given length, zero-initialized.
    pub fn zeros(len: usize) -> Self {
        Self {
            data: Arc::new(vec![ElT::zero(); len]),
        }
    }

    /// Create dense storage from existing vector (takes ownership).
    pub fn from_vec(data: Vec<ElT>) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// Length of storage.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if storage is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get immutable slice of data.
    #[inline]
    pub fn as_slice(&self) -> &[ElT] {
        &self.data
    }

    /// Get mutable slice of data, unsharing the buffer if needed.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [ElT] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }
}

impl<ElT: Scalar> std::ops::Index<usize> for Dense<ElT> {
    type Output = ElT;

    #[inline]
    fn index(&self, i: usize) -> &ElT {
        &self.data[i]
    }
}

impl<ElT: Scalar> std::ops::IndexMut<usize> for Dense<ElT> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut ElT {
        &mut self.as_mut_slice()[i]
    }
}
