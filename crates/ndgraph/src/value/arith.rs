//! Value-level arithmetic.
//!
//! Binary operations accept equal shapes or a scalar on either side. Dtypes
//! must match exactly and `Bool` values reject arithmetic. Integer results
//! wrap on overflow.

use super::{Value, with_dtype, with_numeric_dtype};
use crate::error::GraphError;
use crate::operations;
use crate::scalar::{Numeric, Scalar};
use crate::shape::Shape;
use crate::tensor::DenseTensor;

fn check_dtypes(op: &str, a: &Value, b: &Value) -> Result<(), GraphError> {
    if a.dtype() != b.dtype() {
        return Err(GraphError::type_mismatch(op, &a.type_of(), &b.type_of()));
    }
    Ok(())
}

fn typed_tensor<T: Scalar>(op: &str, v: &Value) -> Result<DenseTensor<T>, GraphError> {
    match v {
        Value::Tensor(t) => T::tensor_ref(t)
            .cloned()
            .ok_or_else(|| GraphError::unsupported(op, v.dtype())),
        Value::Scalar(_) => {
            let x = typed_scalar::<T>(op, v)?;
            Ok(DenseTensor::from_vec(vec![x], &[])?)
        }
    }
}

fn typed_scalar<T: Scalar>(op: &str, v: &Value) -> Result<T, GraphError> {
    v.scalar::<T>()
        .ok_or_else(|| GraphError::unsupported(op, v.dtype()))
}

fn zip_values<T: Numeric>(
    op: &str,
    a: &Value,
    b: &Value,
    f: impl Fn(T, T) -> T,
) -> Result<Value, GraphError> {
    match (a, b) {
        (Value::Scalar(_), Value::Scalar(_)) => {
            Ok(Value::from_tensor(DenseTensor::from_vec(
                vec![f(typed_scalar(op, a)?, typed_scalar(op, b)?)],
                &[],
            )?))
        }
        (Value::Scalar(_), Value::Tensor(_)) => {
            let x = typed_scalar::<T>(op, a)?;
            let t = typed_tensor::<T>(op, b)?;
            Ok(Value::from_tensor(operations::map(&t, |y| f(x, y))))
        }
        (Value::Tensor(_), Value::Scalar(_)) => {
            let t = typed_tensor::<T>(op, a)?;
            let y = typed_scalar::<T>(op, b)?;
            Ok(Value::from_tensor(operations::map(&t, |x| f(x, y))))
        }
        (Value::Tensor(_), Value::Tensor(_)) => {
            let (sa, sb) = (a.shape(), b.shape());
            if sa != sb {
                return Err(GraphError::shape_mismatch(op, &sa, &sb));
            }
            let ta = typed_tensor::<T>(op, a)?;
            let tb = typed_tensor::<T>(op, b)?;
            Ok(Value::from_tensor(operations::zip_with(&ta, &tb, f)?))
        }
    }
}

fn map_value<T: Numeric>(op: &str, v: &Value, f: impl Fn(T) -> T) -> Result<Value, GraphError> {
    let t = typed_tensor::<T>(op, v)?;
    Ok(Value::from_tensor(operations::map(&t, f)))
}

/// `a + b`.
pub fn add(a: &Value, b: &Value) -> Result<Value, GraphError> {
    check_dtypes("add", a, b)?;
    with_numeric_dtype!(a.dtype(), "add", T => zip_values::<T>("add", a, b, <T as Numeric>::wrapping_add))
}

/// `a - b`.
pub fn sub(a: &Value, b: &Value) -> Result<Value, GraphError> {
    check_dtypes("sub", a, b)?;
    with_numeric_dtype!(a.dtype(), "sub", T => zip_values::<T>("sub", a, b, <T as Numeric>::wrapping_sub))
}

/// Element-wise `a * b`.
pub fn mul(a: &Value, b: &Value) -> Result<Value, GraphError> {
    check_dtypes("mul", a, b)?;
    with_numeric_dtype!(a.dtype(), "mul", T => zip_values::<T>("mul", a, b, <T as Numeric>::wrapping_mul))
}

pub fn neg(v: &Value) -> Result<Value, GraphError> {
    with_numeric_dtype!(v.dtype(), "neg", T => map_value::<T>("neg", v, <T as Numeric>::wrapping_neg))
}

pub fn square(v: &Value) -> Result<Value, GraphError> {
    with_numeric_dtype!(v.dtype(), "square", T => map_value::<T>("square", v, |x: T| x.wrapping_mul(x)))
}

/// Multiply every element by `alpha`, converted to the value's dtype.
pub fn scale(v: &Value, alpha: f64) -> Result<Value, GraphError> {
    with_numeric_dtype!(v.dtype(), "scale", T => {
        let alpha = <T as Numeric>::from_f64(alpha).ok_or_else(|| {
            GraphError::InvalidDistribution(format!("{alpha} is not representable as {}", v.dtype()))
        })?;
        let t = typed_tensor::<T>("scale", v)?;
        Ok(Value::from_tensor(operations::scale(&t, alpha)))
    })
}

/// Sum of every element, as a scalar.
pub fn sum_all(v: &Value) -> Result<Value, GraphError> {
    with_numeric_dtype!(v.dtype(), "sum", T => {
        let t = typed_tensor::<T>("sum", v)?;
        Ok(Value::Scalar(operations::sum(&t).into_scalar_value()))
    })
}

/// Sum over `axes`. Duplicate axes are ignored.
///
/// # Errors
///
/// Returns `GraphError::InvalidAxis` if an axis is not below the rank.
pub fn sum_axes(v: &Value, axes: &[usize]) -> Result<Value, GraphError> {
    let axes = normalize_axes(axes);
    v.shape().check_axes(&axes)?;
    with_numeric_dtype!(v.dtype(), "sum", T => {
        let t = typed_tensor::<T>("sum", v)?;
        Ok(Value::from_tensor(operations::sum_axes(&t, &axes)?))
    })
}

/// Repeat `v` along `axes` until it has `shape`. Adjoint of [`sum_axes`].
pub fn broadcast_axes(v: &Value, axes: &[usize], shape: &Shape) -> Result<Value, GraphError> {
    let axes = normalize_axes(axes);
    shape.check_axes(&axes)?;
    if shape.without_axes(&axes) != v.shape() {
        return Err(GraphError::shape_mismatch("broadcast", &v.shape(), shape));
    }
    with_dtype!(v.dtype(), T => {
        let t = typed_tensor::<T>("broadcast", v)?;
        Ok(Value::from_tensor(operations::broadcast_axes(&t, &axes, shape.dims())?))
    })
}

pub(crate) fn normalize_axes(axes: &[usize]) -> Vec<usize> {
    let mut axes = axes.to_vec();
    axes.sort_unstable();
    axes.dedup();
    axes
}
