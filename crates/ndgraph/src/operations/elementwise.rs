//! Element-wise tensor operations.

use crate::error::TensorError;
use crate::scalar::{Numeric, Scalar};
use crate::tensor::DenseTensor;

/// Apply `f` to every element, returning a new tensor of the same shape.
///
/// # Example
///
/// ```
/// use ndgraph::Tensor;
/// use ndgraph::operations::map;
///
/// let t = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
/// let even = map(&t, |x: i32| x % 2 == 0);
/// assert_eq!(even.data(), &[false, true, false]);
/// ```
pub fn map<T: Scalar, U: Scalar>(tensor: &DenseTensor<T>, f: impl Fn(T) -> U) -> DenseTensor<U> {
    let data = tensor.data();
    DenseTensor::from_fn(tensor.shape(), |i| f(data[i]))
}

/// Combine two tensors of identical shape element by element.
///
/// # Errors
///
/// Returns `TensorError::IncompatibleShapes` if the shapes differ.
pub fn zip_with<T: Scalar>(
    a: &DenseTensor<T>,
    b: &DenseTensor<T>,
    f: impl Fn(T, T) -> T,
) -> Result<DenseTensor<T>, TensorError> {
    if a.shape() != b.shape() {
        return Err(TensorError::IncompatibleShapes {
            lhs: a.shape().to_vec(),
            rhs: b.shape().to_vec(),
        });
    }
    let (da, db) = (a.data(), b.data());
    Ok(DenseTensor::from_fn(a.shape(), |i| f(da[i], db[i])))
}

/// Multiply all elements by a scalar, returning a new tensor.
///
/// Integer products wrap on overflow.
///
/// # Example
///
/// ```
/// use ndgraph::Tensor;
/// use ndgraph::operations::scale;
///
/// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
/// let ts = scale(&t, 2.0);
/// assert_eq!(ts.data(), &[2.0, 4.0, 6.0]);
/// ```
pub fn scale<T: Numeric>(tensor: &DenseTensor<T>, alpha: T) -> DenseTensor<T> {
    map(tensor, |x| x.wrapping_mul(alpha))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_with() {
        let a = DenseTensor::from_vec(vec![4i64, 5, 6], &[3]).unwrap();
        let b = DenseTensor::from_vec(vec![1i64, 2, 3], &[3]).unwrap();
        assert_eq!(zip_with(&a, &b, |x, y| x - y).unwrap().data(), &[3, 3, 3]);
        assert_eq!(zip_with(&a, &b, |x, y| x * y).unwrap().data(), &[4, 10, 18]);
    }

    #[test]
    fn test_scale_wraps_integers() {
        let t = DenseTensor::from_vec(vec![i32::MAX, 3], &[2]).unwrap();
        assert_eq!(scale(&t, 2).data(), &[-2, 6]);
    }

    #[test]
    fn test_zip_shape_mismatch() {
        let a: DenseTensor<f64> = DenseTensor::zeros(&[5]);
        let b: DenseTensor<f64> = DenseTensor::zeros(&[6]);
        assert_eq!(
            zip_with(&a, &b, |x, y| x + y).unwrap_err(),
            TensorError::IncompatibleShapes {
                lhs: vec![5],
                rhs: vec![6]
            }
        );
    }

    #[test]
    fn test_same_element_count_different_shape() {
        let a: DenseTensor<f32> = DenseTensor::zeros(&[2, 3]);
        let b: DenseTensor<f32> = DenseTensor::zeros(&[3, 2]);
        assert!(zip_with(&a, &b, |x, y| x + y).is_err());
    }

    #[test]
    fn test_map_keeps_shape() {
        let t: DenseTensor<f64> = DenseTensor::ones(&[2, 2]);
        let m = map(&t, |x| -x);
        assert_eq!(m.shape(), &[2, 2]);
        assert_eq!(m.data(), &[-1.0; 4]);
    }
}
