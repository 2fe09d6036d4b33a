//! N-dimensional tensor type with pluggable storage.
//!
//! ```text
//! Tensor<ElT, StoreT: TensorStorage<ElT>>
//! └── DenseTensor = Tensor<ElT, Dense<ElT>>
//! ```
//!
//! Values flowing through a graph hold `DenseTensor`s. Element layout is
//! row-major.

use crate::error::TensorError;
use crate::scalar::Scalar;
use crate::storage::{Dense, TensorStorage};
use crate::strides::compute_strides;
use std::marker::PhantomData;

/// A n-dimensional tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<ElT: Scalar, StoreT: TensorStorage<ElT> = Dense<ElT>> {
    storage: StoreT,
    shape: Vec<usize>,
    strides: Vec<usize>,
    _phantom: PhantomData<ElT>,
}

/// Type alias for dense tensors.
pub type DenseTensor<ElT> = Tensor<ElT, Dense<ElT>>;

/// Number of elements addressed by `shape`; the empty shape holds one.
#[inline]
pub(crate) fn elem_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

impl<ElT: Scalar, StoreT: TensorStorage<ElT>> Tensor<ElT, StoreT> {
    /// Create a new tensor with the given shape, zero-initialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndgraph::Tensor;
    ///
    /// let t: Tensor<f64> = Tensor::zeros(&[2, 3, 4]);
    /// assert_eq!(t.shape(), &[2, 3, 4]);
    /// assert_eq!(t.len(), 24);
    /// ```
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            storage: StoreT::zeros(elem_count(shape)),
            shape: shape.to_vec(),
            strides: compute_strides(shape),
            _phantom: PhantomData,
        }
    }

    /// Create tensor from row-major data and shape.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::ShapeMismatch` if data length doesn't match shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndgraph::{DenseTensor, Tensor};
    ///
    /// let t: DenseTensor<f64> = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// assert_eq!(t.get_linear(1), Some(&2.0));
    /// assert_eq!(t.get_linear(3), Some(&4.0));
    /// ```
    pub fn from_vec(data: Vec<ElT>, shape: &[usize]) -> Result<Self, TensorError> {
        let expected = elem_count(shape);
        if data.len() != expected {
            return Err(TensorError::ShapeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            storage: StoreT::from_vec(data),
            shape: shape.to_vec(),
            strides: compute_strides(shape),
            _phantom: PhantomData,
        })
    }

    /// Build a tensor by calling `f` with each linear index.
    pub fn from_fn(shape: &[usize], f: impl FnMut(usize) -> ElT) -> Self {
        let data: Vec<ElT> = (0..elem_count(shape)).map(f).collect();
        Self {
            storage: StoreT::from_vec(data),
            shape: shape.to_vec(),
            strides: compute_strides(shape),
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the rank (number of dimensions).
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Get total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Get underlying data as slice.
    #[inline]
    pub fn data(&self) -> &[ElT] {
        self.storage.as_slice()
    }

    /// Get underlying data as mutable slice, copying shared storage first.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [ElT] {
        self.storage.as_mut_slice()
    }

    /// Get element by linear index.
    #[inline]
    pub fn get_linear(&self, i: usize) -> Option<&ElT> {
        self.storage.as_slice().get(i)
    }

    /// Create a tensor filled with ones.
    pub fn ones(shape: &[usize]) -> Self {
        let mut t = Self::zeros(shape);
        t.storage.as_mut_slice().fill(ElT::one());
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_zeros_generic<T: Scalar>() {
        let t: Tensor<T> = Tensor::zeros(&[2, 3]);
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.ndim(), 2);
        assert_eq!(t.len(), 6);
        assert_eq!(t.strides(), &[3, 1]);
        for i in 0..6 {
            assert_eq!(*t.get_linear(i).unwrap(), T::zero());
        }
    }

    #[test]
    fn test_zeros_f64() {
        test_zeros_generic::<f64>();
    }

    #[test]
    fn test_zeros_int_and_bool() {
        test_zeros_generic::<isize>();
        test_zeros_generic::<i32>();
        test_zeros_generic::<bool>();
    }

    #[test]
    fn test_from_vec_row_major() {
        let t: DenseTensor<f64> =
            Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();

        assert_eq!(t.strides(), &[3, 1]);
        assert_eq!(t.get_linear(2), Some(&3.0));
        assert_eq!(t.get_linear(3), Some(&4.0));
        assert_eq!(t.get_linear(5), Some(&6.0));
    }

    #[test]
    fn test_from_vec_shape_mismatch() {
        let result = Tensor::<f64>::from_vec(vec![1.0, 2.0, 3.0], &[2, 3]);
        assert_eq!(
            result,
            Err(TensorError::ShapeMismatch {
                expected: 6,
                actual: 3
            })
        );
    }

    #[test]
    fn test_get_linear_out_of_bounds() {
        let t: Tensor<f64> = Tensor::zeros(&[2, 3]);
        assert_eq!(t.get_linear(6), None);
    }

    #[test]
    fn test_data_mut_leaves_clone_untouched() {
        let t: Tensor<f64> = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let mut u = t.clone();
        u.data_mut()[0] = 100.0;
        assert_eq!(t.data(), &[1.0, 2.0, 3.0]);
        assert_eq!(u.data(), &[100.0, 2.0, 3.0]);
    }

    #[test]
    fn test_ones() {
        let t: Tensor<i64> = Tensor::ones(&[2, 2]);
        assert_eq!(t.data(), &[1, 1, 1, 1]);
        let b: Tensor<bool> = Tensor::ones(&[3]);
        assert_eq!(b.data(), &[true, true, true]);
    }

    #[test]
    fn test_from_fn() {
        let t: Tensor<f32> = Tensor::from_fn(&[4], |i| i as f32 * 0.5);
        assert_eq!(t.data(), &[0.0, 0.5, 1.0, 1.5]);
    }

    #[test]
    fn test_scalar_tensor() {
        let t: Tensor<f64> = Tensor::zeros(&[]);
        assert_eq!(t.ndim(), 0);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_zero_sized_dim() {
        let t: Tensor<f64> = Tensor::zeros(&[3, 0]);
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
    }
}
