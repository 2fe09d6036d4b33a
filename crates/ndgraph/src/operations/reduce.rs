//! Reductions and their adjoint broadcasts.

use crate::error::TensorError;
use crate::scalar::{Numeric, Scalar};
use crate::strides::{cartesian_to_linear, compute_strides, linear_to_cartesian};
use crate::tensor::DenseTensor;

/// Sum of all elements. Integer sums wrap on overflow.
pub fn sum<T: Numeric>(tensor: &DenseTensor<T>) -> T {
    tensor.data().iter().fold(T::zero(), |acc, &x| acc.wrapping_add(x))
}

fn check_axes(axes: &[usize], ndim: usize) -> Result<(), TensorError> {
    match axes.iter().find(|&&axis| axis >= ndim) {
        Some(&axis) => Err(TensorError::AxisOutOfRange { axis, ndim }),
        None => Ok(()),
    }
}

fn kept_dims(shape: &[usize], axes: &[usize]) -> Vec<usize> {
    shape
        .iter()
        .enumerate()
        .filter(|(i, _)| !axes.contains(i))
        .map(|(_, &d)| d)
        .collect()
}

/// Project a full index onto the kept (non-reduced) dimensions.
fn project(index: &[usize], axes: &[usize]) -> Vec<usize> {
    index
        .iter()
        .enumerate()
        .filter(|(i, _)| !axes.contains(i))
        .map(|(_, &x)| x)
        .collect()
}

/// Sum over `axes`, dropping them from the shape.
///
/// Reducing every axis yields a rank-0 tensor.
///
/// # Example
///
/// ```
/// use ndgraph::Tensor;
/// use ndgraph::operations::sum_axes;
///
/// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// assert_eq!(sum_axes(&t, &[0]).unwrap().data(), &[5.0, 7.0, 9.0]);
/// assert_eq!(sum_axes(&t, &[1]).unwrap().data(), &[6.0, 15.0]);
/// ```
pub fn sum_axes<T: Numeric>(tensor: &DenseTensor<T>, axes: &[usize]) -> Result<DenseTensor<T>, TensorError> {
    check_axes(axes, tensor.ndim())?;

    let out_shape = kept_dims(tensor.shape(), axes);
    let out_strides = compute_strides(&out_shape);
    let mut out: DenseTensor<T> = DenseTensor::zeros(&out_shape);
    let out_data = out.data_mut();

    for (linear, &x) in tensor.data().iter().enumerate() {
        let index = linear_to_cartesian(linear, tensor.shape());
        let target = cartesian_to_linear(&project(&index, axes), &out_strides);
        out_data[target] = out_data[target].wrapping_add(x);
    }
    Ok(out)
}

/// Repeat `tensor` along `axes` so that it takes `shape`.
///
/// This is the adjoint of [`sum_axes`]: `tensor.shape()` must equal `shape`
/// with `axes` removed.
///
/// # Errors
///
/// Returns `TensorError::AxisOutOfRange` for an invalid axis and
/// `TensorError::IncompatibleShapes` if the kept dimensions disagree.
pub fn broadcast_axes<T: Scalar>(
    tensor: &DenseTensor<T>,
    axes: &[usize],
    shape: &[usize],
) -> Result<DenseTensor<T>, TensorError> {
    check_axes(axes, shape.len())?;
    if kept_dims(shape, axes) != tensor.shape() {
        return Err(TensorError::IncompatibleShapes {
            lhs: tensor.shape().to_vec(),
            rhs: shape.to_vec(),
        });
    }

    let data = tensor.data();
    let strides = tensor.strides();
    Ok(DenseTensor::from_fn(shape, |linear| {
        let index = linear_to_cartesian(linear, shape);
        data[cartesian_to_linear(&project(&index, axes), strides)]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t234() -> DenseTensor<f64> {
        DenseTensor::from_fn(&[2, 3, 4], |i| i as f64)
    }

    #[test]
    fn test_sum() {
        assert_eq!(sum(&t234()), (0..24).sum::<usize>() as f64);
        let ints = DenseTensor::from_vec(vec![1i32, -2, 3], &[3]).unwrap();
        assert_eq!(sum(&ints), 2);
    }

    #[test]
    fn test_integer_sums_wrap() {
        let big = DenseTensor::from_vec(vec![i64::MAX, 1], &[2]).unwrap();
        assert_eq!(sum(&big), i64::MIN);

        let cols = DenseTensor::from_vec(vec![i32::MAX, 0, 1, 5], &[2, 2]).unwrap();
        assert_eq!(sum_axes(&cols, &[0]).unwrap().data(), &[i32::MIN, 5]);
    }

    #[test]
    fn test_sum_axes_middle() {
        let s = sum_axes(&t234(), &[1]).unwrap();
        assert_eq!(s.shape(), &[2, 4]);
        // element [0, 0] = t[0,0,0] + t[0,1,0] + t[0,2,0] = 0 + 4 + 8
        assert_eq!(s.data()[0], 12.0);
        assert_eq!(s.data()[7], 15.0 + 19.0 + 23.0);
    }

    #[test]
    fn test_sum_every_axis_is_rank_zero() {
        let s = sum_axes(&t234(), &[0, 1, 2]).unwrap();
        assert_eq!(s.ndim(), 0);
        assert_eq!(s.data(), &[276.0]);
    }

    #[test]
    fn test_sum_axes_invalid() {
        assert_eq!(
            sum_axes(&t234(), &[3]).unwrap_err(),
            TensorError::AxisOutOfRange { axis: 3, ndim: 3 }
        );
    }

    #[test]
    fn test_broadcast_axes() {
        let row = DenseTensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let b = broadcast_axes(&row, &[0], &[2, 3]).unwrap();
        assert_eq!(b.data(), &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);

        let col = DenseTensor::from_vec(vec![1.0, 2.0], &[2]).unwrap();
        let b = broadcast_axes(&col, &[1], &[2, 3]).unwrap();
        assert_eq!(b.data(), &[1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);

        assert!(broadcast_axes(&col, &[0], &[2, 3]).is_err());
    }
}
