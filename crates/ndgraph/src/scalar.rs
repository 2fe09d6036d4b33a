//! Scalar traits for tensor element types.

use crate::dtype::DType;
use crate::tensor::DenseTensor;
use crate::value::{ScalarValue, TensorValue};
use num_traits::NumCast;
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Trait for element types that can be stored in a tensor.
///
/// This is the bridge between Rust's static element types and the runtime
/// [`DType`] tag carried by values: each implementor knows its dtype and how
/// to wrap itself into (or be extracted from) the dtype-tagged value enums.
pub trait Scalar: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    /// The runtime tag for this element type.
    const DTYPE: DType;

    /// Returns the additive identity (zero, or `false`).
    fn zero() -> Self {
        Self::default()
    }

    /// Returns the multiplicative identity (one, or `true`).
    fn one() -> Self;

    /// Wrap into a dtype-tagged scalar value.
    fn into_scalar_value(self) -> ScalarValue;

    /// Borrow from a scalar value of the same dtype.
    fn scalar_ref(value: &ScalarValue) -> Option<&Self>;

    /// Extract from a scalar value of the same dtype.
    fn from_scalar_value(value: &ScalarValue) -> Option<Self> {
        Self::scalar_ref(value).copied()
    }

    /// Wrap a dense tensor into a dtype-tagged tensor value.
    fn into_tensor_value(tensor: DenseTensor<Self>) -> TensorValue;

    /// Borrow the dense tensor inside a tensor value of the same dtype.
    fn tensor_ref(value: &TensorValue) -> Option<&DenseTensor<Self>>;
}

/// Element types with arithmetic: everything except `bool`.
///
/// The `wrapping_*` methods are what graph kernels use. They match the
/// operators for floats and wrap around at the boundary for integers.
pub trait Numeric:
    Scalar
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + NumCast
{
    /// Lossy conversion from `f64`; `None` when the value does not fit.
    fn from_f64(v: f64) -> Option<Self> {
        <Self as NumCast>::from(v)
    }

    /// Conversion from an element count; `None` when it does not fit.
    fn from_usize(n: usize) -> Option<Self> {
        <Self as NumCast>::from(n)
    }

    fn wrapping_add(self, rhs: Self) -> Self {
        self + rhs
    }

    fn wrapping_sub(self, rhs: Self) -> Self {
        self - rhs
    }

    fn wrapping_mul(self, rhs: Self) -> Self {
        self * rhs
    }

    fn wrapping_neg(self) -> Self {
        -self
    }
}

macro_rules! impl_scalar {
    ($t:ty, $variant:ident, $one:expr) => {
        impl Scalar for $t {
            const DTYPE: DType = DType::$variant;

            fn one() -> Self {
                $one
            }

            fn into_scalar_value(self) -> ScalarValue {
                ScalarValue::$variant(self)
            }

            fn scalar_ref(value: &ScalarValue) -> Option<&Self> {
                match value {
                    ScalarValue::$variant(x) => Some(x),
                    _ => None,
                }
            }

            fn into_tensor_value(tensor: DenseTensor<Self>) -> TensorValue {
                TensorValue::$variant(tensor)
            }

            fn tensor_ref(value: &TensorValue) -> Option<&DenseTensor<Self>> {
                match value {
                    TensorValue::$variant(t) => Some(t),
                    _ => None,
                }
            }
        }
    };
}

impl_scalar!(f32, Float32, 1.0);
impl_scalar!(f64, Float64, 1.0);
impl_scalar!(isize, Int, 1);
impl_scalar!(i32, Int32, 1);
impl_scalar!(i64, Int64, 1);
impl_scalar!(bool, Bool, true);

macro_rules! impl_wrapping_numeric {
    ($($t:ty),*) => {
        $(
            impl Numeric for $t {
                fn wrapping_add(self, rhs: Self) -> Self {
                    <$t>::wrapping_add(self, rhs)
                }

                fn wrapping_sub(self, rhs: Self) -> Self {
                    <$t>::wrapping_sub(self, rhs)
                }

                fn wrapping_mul(self, rhs: Self) -> Self {
                    <$t>::wrapping_mul(self, rhs)
                }

                fn wrapping_neg(self) -> Self {
                    <$t>::wrapping_neg(self)
                }
            }
        )*
    };
}

impl Numeric for f32 {}
impl Numeric for f64 {}
impl_wrapping_numeric!(isize, i32, i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_one() {
        assert_eq!(f64::zero(), 0.0);
        assert_eq!(f64::one(), 1.0);
        assert_eq!(f32::one(), 1.0);
        assert_eq!(isize::zero(), 0);
        assert_eq!(i32::one(), 1);
        assert!(!bool::zero());
        assert!(bool::one());
    }

    #[test]
    fn test_dtype_tags() {
        assert_eq!(f32::DTYPE, DType::Float32);
        assert_eq!(f64::DTYPE, DType::Float64);
        assert_eq!(isize::DTYPE, DType::Int);
        assert_eq!(i32::DTYPE, DType::Int32);
        assert_eq!(i64::DTYPE, DType::Int64);
        assert_eq!(bool::DTYPE, DType::Bool);
    }

    #[test]
    fn test_scalar_value_roundtrip() {
        let v = 2.5f32.into_scalar_value();
        assert_eq!(f32::from_scalar_value(&v), Some(2.5));
        assert_eq!(f64::from_scalar_value(&v), None);
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(<i32 as Numeric>::from_f64(3.0), Some(3));
        assert_eq!(<f32 as Numeric>::from_f64(0.5), Some(0.5));
        assert_eq!(<i32 as Numeric>::from_f64(f64::NAN), None);
    }

    #[test]
    fn test_integer_ops_wrap() {
        assert_eq!(Numeric::wrapping_add(i32::MAX, 1), i32::MIN);
        assert_eq!(Numeric::wrapping_sub(i64::MIN, 1), i64::MAX);
        assert_eq!(Numeric::wrapping_mul(isize::MAX, 2), -2);
        assert_eq!(Numeric::wrapping_neg(i32::MIN), i32::MIN);
    }

    #[test]
    fn test_float_ops_are_plain() {
        assert_eq!(Numeric::wrapping_add(f64::MAX, f64::MAX), f64::INFINITY);
        assert_eq!(Numeric::wrapping_sub(1.5f32, 2.0), -0.5);
        assert_eq!(Numeric::wrapping_mul(3.0f64, -2.0), -6.0);
        assert_eq!(Numeric::wrapping_neg(0.25f32), -0.25);
    }
}
