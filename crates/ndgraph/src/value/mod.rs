//! Runtime values.
//!
//! A [`Value`] is either a single dtype-tagged scalar or a dense tensor of
//! rank one or more. Rank-0 tensors are normalized to scalars on the way in,
//! so the value's [`Type`] always follows from its shape.

mod arith;

pub use arith::{add, broadcast_axes, mul, neg, scale, square, sub, sum_all, sum_axes};

use crate::dtype::DType;
use crate::error::GraphError;
use crate::scalar::Scalar;
use crate::shape::Shape;
use crate::tensor::DenseTensor;
use crate::types::Type;
use std::any::Any;
use std::fmt;

/// Run `$body` with `$T` aliased to the Rust type of a numeric `$dtype`.
///
/// `Bool` short-circuits with `UnsupportedDType` for `$op`.
macro_rules! with_numeric_dtype {
    ($dtype:expr, $op:expr, $T:ident => $body:expr) => {
        match $dtype {
            $crate::DType::Float32 => {
                type $T = f32;
                $body
            }
            $crate::DType::Float64 => {
                type $T = f64;
                $body
            }
            $crate::DType::Int => {
                type $T = isize;
                $body
            }
            $crate::DType::Int32 => {
                type $T = i32;
                $body
            }
            $crate::DType::Int64 => {
                type $T = i64;
                $body
            }
            $crate::DType::Bool => Err($crate::GraphError::unsupported($op, $crate::DType::Bool)),
        }
    };
}

/// Run `$body` with `$T` aliased to the Rust type of any `$dtype`.
macro_rules! with_dtype {
    ($dtype:expr, $T:ident => $body:expr) => {
        match $dtype {
            $crate::DType::Float32 => {
                type $T = f32;
                $body
            }
            $crate::DType::Float64 => {
                type $T = f64;
                $body
            }
            $crate::DType::Int => {
                type $T = isize;
                $body
            }
            $crate::DType::Int32 => {
                type $T = i32;
                $body
            }
            $crate::DType::Int64 => {
                type $T = i64;
                $body
            }
            $crate::DType::Bool => {
                type $T = bool;
                $body
            }
        }
    };
}

pub(crate) use {with_dtype, with_numeric_dtype};

/// A single element of some dtype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    Float32(f32),
    Float64(f64),
    Int(isize),
    Int32(i32),
    Int64(i64),
    Bool(bool),
}

impl ScalarValue {
    pub fn dtype(&self) -> DType {
        match self {
            ScalarValue::Float32(_) => DType::Float32,
            ScalarValue::Float64(_) => DType::Float64,
            ScalarValue::Int(_) => DType::Int,
            ScalarValue::Int32(_) => DType::Int32,
            ScalarValue::Int64(_) => DType::Int64,
            ScalarValue::Bool(_) => DType::Bool,
        }
    }

    /// Widen to `f64`; `true` is `1.0`.
    pub fn to_f64(&self) -> f64 {
        match *self {
            ScalarValue::Float32(x) => x as f64,
            ScalarValue::Float64(x) => x,
            ScalarValue::Int(x) => x as f64,
            ScalarValue::Int32(x) => x as f64,
            ScalarValue::Int64(x) => x as f64,
            ScalarValue::Bool(x) => f64::from(u8::from(x)),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Float32(x) => write!(f, "{x}"),
            ScalarValue::Float64(x) => write!(f, "{x}"),
            ScalarValue::Int(x) => write!(f, "{x}"),
            ScalarValue::Int32(x) => write!(f, "{x}"),
            ScalarValue::Int64(x) => write!(f, "{x}"),
            ScalarValue::Bool(x) => write!(f, "{x}"),
        }
    }
}

/// A dense tensor of some dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorValue {
    Float32(DenseTensor<f32>),
    Float64(DenseTensor<f64>),
    Int(DenseTensor<isize>),
    Int32(DenseTensor<i32>),
    Int64(DenseTensor<i64>),
    Bool(DenseTensor<bool>),
}

macro_rules! each_tensor {
    ($value:expr, $t:ident => $body:expr) => {
        match $value {
            TensorValue::Float32($t) => $body,
            TensorValue::Float64($t) => $body,
            TensorValue::Int($t) => $body,
            TensorValue::Int32($t) => $body,
            TensorValue::Int64($t) => $body,
            TensorValue::Bool($t) => $body,
        }
    };
}

impl TensorValue {
    pub fn dtype(&self) -> DType {
        match self {
            TensorValue::Float32(_) => DType::Float32,
            TensorValue::Float64(_) => DType::Float64,
            TensorValue::Int(_) => DType::Int,
            TensorValue::Int32(_) => DType::Int32,
            TensorValue::Int64(_) => DType::Int64,
            TensorValue::Bool(_) => DType::Bool,
        }
    }

    pub fn shape(&self) -> Shape {
        each_tensor!(self, t => Shape::new(t.shape()))
    }

    pub fn len(&self) -> usize {
        each_tensor!(self, t => t.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A node's runtime payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(ScalarValue),
    Tensor(TensorValue),
}

impl Value {
    /// Wrap a dense tensor; rank 0 becomes a scalar.
    pub fn from_tensor<T: Scalar>(tensor: DenseTensor<T>) -> Self {
        match tensor.get_linear(0) {
            Some(&x) if tensor.ndim() == 0 => Value::Scalar(x.into_scalar_value()),
            _ => Value::Tensor(T::into_tensor_value(tensor)),
        }
    }

    /// Build a value from row-major data.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Tensor` if `data` does not fill `shape`.
    ///
    /// ```
    /// use ndgraph::{DType, Value};
    ///
    /// let v = Value::from_vec(vec![1i32, 2, 3, 4], (2, 2)).unwrap();
    /// assert_eq!(v.dtype(), DType::Int32);
    /// assert_eq!(v.shape().dims(), &[2, 2]);
    /// ```
    pub fn from_vec<T: Scalar>(data: Vec<T>, shape: impl Into<Shape>) -> Result<Self, GraphError> {
        let shape = shape.into();
        Ok(Value::from_tensor(DenseTensor::from_vec(data, shape.dims())?))
    }

    /// Convert any supported literal into a value.
    ///
    /// Accepts native scalars (`f32`, `f64`, `isize`, `i32`, `i64`, `bool`),
    /// dense tensors of those, and existing values.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnsupportedValueKind` naming the Rust type of
    /// anything else.
    ///
    /// ```
    /// use ndgraph::{DType, Type, Value};
    ///
    /// let v = Value::from_any(&3.14f64).unwrap();
    /// assert_eq!(v.type_of(), Type::Scalar(DType::Float64));
    /// assert!(Value::from_any(&"three").is_err());
    /// ```
    pub fn from_any<T: Any>(x: &T) -> Result<Self, GraphError> {
        let any = x as &dyn Any;

        macro_rules! try_native {
            ($($t:ty),*) => {
                $(
                    if let Some(&v) = any.downcast_ref::<$t>() {
                        return Ok(Value::Scalar(v.into_scalar_value()));
                    }
                    if let Some(t) = any.downcast_ref::<DenseTensor<$t>>() {
                        return Ok(Value::from_tensor(t.clone()));
                    }
                )*
            };
        }
        try_native!(f32, f64, isize, i32, i64, bool);

        if let Some(v) = any.downcast_ref::<Value>() {
            return Ok(v.clone());
        }
        if let Some(&s) = any.downcast_ref::<ScalarValue>() {
            return Ok(Value::Scalar(s));
        }
        if let Some(t) = any.downcast_ref::<TensorValue>() {
            return Ok(each_tensor!(t, t => Value::from_tensor(t.clone())));
        }
        Err(GraphError::UnsupportedValueKind {
            kind: std::any::type_name::<T>(),
        })
    }

    /// A one-hot vector: `length` zeros with a single one at `index`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::IndexOutOfRange` unless `0 <= index < length`.
    ///
    /// ```
    /// use ndgraph::{DType, Value};
    ///
    /// let v = Value::one_hot(1, 5, DType::Int).unwrap();
    /// assert_eq!(v.to_vec::<isize>().unwrap(), vec![0, 1, 0, 0, 0]);
    /// ```
    pub fn one_hot(index: isize, length: usize, dtype: DType) -> Result<Self, GraphError> {
        let idx = usize::try_from(index)
            .ok()
            .filter(|&i| i < length)
            .ok_or(GraphError::IndexOutOfRange { index, length })?;

        with_dtype!(dtype, T => {
            let mut data = vec![<T as Scalar>::zero(); length];
            data[idx] = <T as Scalar>::one();
            Value::from_vec(data, length)
        })
    }

    /// All-zero (or all-`false`) value.
    pub fn zeros(dtype: DType, shape: &Shape) -> Self {
        with_dtype!(dtype, T => Value::from_tensor(DenseTensor::<T>::zeros(shape.dims())))
    }

    /// Value with every element equal to `x`.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::InvalidDistribution` if `x` is not representable
    /// in `dtype` (for example `NaN` as an integer).
    pub fn full(dtype: DType, shape: &Shape, x: f64) -> Result<Self, GraphError> {
        if dtype == DType::Bool {
            return Value::from_vec(vec![x != 0.0; shape.elem_count()], shape.clone());
        }
        with_numeric_dtype!(dtype, "full", T => {
            let v = <T as crate::scalar::Numeric>::from_f64(x).ok_or_else(|| {
                GraphError::InvalidDistribution(format!("{x} is not representable as {dtype}"))
            })?;
            Value::from_vec(vec![v; shape.elem_count()], shape.clone())
        })
    }

    /// The multiplicative identity of `dtype`, as a scalar.
    pub fn one(dtype: DType) -> Self {
        with_dtype!(dtype, T => Value::Scalar(<T as Scalar>::one().into_scalar_value()))
    }

    pub fn zeros_like(&self) -> Self {
        Value::zeros(self.dtype(), &self.shape())
    }

    pub fn ones_like(&self) -> Self {
        let shape = self.shape();
        with_dtype!(self.dtype(), T => Value::from_tensor(DenseTensor::<T>::ones(shape.dims())))
    }

    pub fn dtype(&self) -> DType {
        match self {
            Value::Scalar(s) => s.dtype(),
            Value::Tensor(t) => t.dtype(),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Value::Scalar(_) => Shape::scalar(),
            Value::Tensor(t) => t.shape(),
        }
    }

    /// The inferred type of this value.
    pub fn type_of(&self) -> Type {
        Type::of(self.dtype(), &self.shape())
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::Tensor(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the elements as `T`; `None` on a dtype mismatch.
    pub fn elems<T: Scalar>(&self) -> Option<&[T]> {
        match self {
            Value::Scalar(s) => T::scalar_ref(s).map(std::slice::from_ref),
            Value::Tensor(t) => T::tensor_ref(t).map(|t| t.data()),
        }
    }

    /// The scalar payload as `T`; `None` for tensors or on a dtype mismatch.
    pub fn scalar<T: Scalar>(&self) -> Option<T> {
        match self {
            Value::Scalar(s) => T::from_scalar_value(s),
            Value::Tensor(_) => None,
        }
    }

    /// Copy the elements out in row-major order.
    pub fn to_vec<T: Scalar>(&self) -> Option<Vec<T>> {
        self.elems::<T>().map(<[T]>::to_vec)
    }

    /// Copy the elements out widened to `f64`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            Value::Scalar(s) => vec![s.to_f64()],
            Value::Tensor(t) => each_tensor!(t, t => t
                .data()
                .iter()
                .map(|&x| x.into_scalar_value().to_f64())
                .collect()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => write!(f, "{s}"),
            Value::Tensor(t) => {
                write!(f, "{}{}[", t.dtype(), t.shape())?;
                each_tensor!(t, t => {
                    for (i, x) in t.data().iter().enumerate() {
                        if i > 0 {
                            f.write_str(" ")?;
                        }
                        write!(f, "{}", x.into_scalar_value())?;
                    }
                });
                f.write_str("]")
            }
        }
    }
}

macro_rules! impl_from_native {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(x: $t) -> Self {
                    Value::Scalar(x.into_scalar_value())
                }
            }

            impl From<DenseTensor<$t>> for Value {
                fn from(t: DenseTensor<$t>) -> Self {
                    Value::from_tensor(t)
                }
            }
        )*
    };
}

impl_from_native!(f32, f64, isize, i32, i64, bool);

impl From<ScalarValue> for Value {
    fn from(s: ScalarValue) -> Self {
        Value::Scalar(s)
    }
}
