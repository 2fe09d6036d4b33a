//! Variable initializers.

use rand::Rng;
use std::fmt;

use crate::dtype::DType;
use crate::error::GraphError;
use crate::operations;
use crate::random::{Distribution, RandomNormal, RandomUniform};
use crate::scalar::Numeric;
use crate::shape::Shape;
use crate::tensor::DenseTensor;
use crate::value::Value;

/// How a variable gets its first value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Initializer {
    Zeroes,
    Ones,
    /// Every element set to the given constant.
    ValuesOf(f64),
    Gaussian { mean: f64, stddev: f64 },
    Uniform { low: f64, high: f64 },
    /// Normal with standard deviation `gain * sqrt(2 / (fan_in + fan_out))`.
    GlorotNormal { gain: f64 },
    /// Uniform on `±gain * sqrt(6 / (fan_in + fan_out))`.
    GlorotUniform { gain: f64 },
}

/// Fan-in and fan-out of a weight of the given shape.
///
/// Dimensions past the second are treated as a receptive field.
fn fans(shape: &Shape) -> Result<(f64, f64), GraphError> {
    let dims = shape.dims();
    let (fan_in, fan_out) = match dims {
        [] => {
            return Err(GraphError::InvalidDistribution(
                "glorot initialization needs at least one dimension".to_string(),
            ));
        }
        [n] => (*n, *n),
        [rows, cols] => (*rows, *cols),
        [out, inp, rest @ ..] => {
            let receptive: usize = rest.iter().product();
            (inp * receptive, out * receptive)
        }
    };
    if fan_in + fan_out == 0 {
        return Err(GraphError::InvalidDistribution(format!(
            "glorot initialization of empty shape {shape}"
        )));
    }
    Ok((fan_in as f64, fan_out as f64))
}

fn glorot_normal<T, R>(shape: &Shape, stddev: f64, rng: &mut R) -> Result<Value, GraphError>
where
    T: Numeric + RandomNormal,
    R: Rng + ?Sized,
{
    let stddev = <T as Numeric>::from_f64(stddev)
        .ok_or_else(|| GraphError::InvalidDistribution(format!("stddev {stddev}")))?;
    let t = DenseTensor::<T>::randn_with_rng(shape.dims(), rng);
    Ok(Value::from_tensor(operations::scale(&t, stddev)))
}

fn glorot_uniform<T, R>(shape: &Shape, limit: f64, rng: &mut R) -> Result<Value, GraphError>
where
    T: Numeric + RandomUniform,
    R: Rng + ?Sized,
{
    let (width, low) = match (
        <T as Numeric>::from_f64(2.0 * limit),
        <T as Numeric>::from_f64(-limit),
    ) {
        (Some(w), Some(l)) => (w, l),
        _ => return Err(GraphError::InvalidDistribution(format!("limit {limit}"))),
    };
    let t = DenseTensor::<T>::random_with_rng(shape.dims(), rng);
    Ok(Value::from_tensor(operations::map(&t, |u| u * width + low)))
}

impl Initializer {
    /// Produce a value of `dtype` and `shape`.
    ///
    /// # Errors
    ///
    /// Random initializers fail with `UnsupportedDType` for non-float dtypes
    /// and with `InvalidDistribution` for bad parameters.
    pub fn materialize<R: Rng + ?Sized>(
        &self,
        dtype: DType,
        shape: &Shape,
        rng: &mut R,
    ) -> Result<Value, GraphError> {
        match *self {
            Initializer::Zeroes => Ok(Value::zeros(dtype, shape)),
            Initializer::Ones => Value::full(dtype, shape, 1.0),
            Initializer::ValuesOf(x) => Value::full(dtype, shape, x),
            Initializer::Gaussian { mean, stddev } => {
                Distribution::Gaussian { mean, stddev }.sample(dtype, shape, rng)
            }
            Initializer::Uniform { low, high } => {
                Distribution::Uniform { low, high }.sample(dtype, shape, rng)
            }
            Initializer::GlorotNormal { gain } => {
                let (fan_in, fan_out) = fans(shape)?;
                let stddev = gain * (2.0 / (fan_in + fan_out)).sqrt();
                match dtype {
                    DType::Float32 => glorot_normal::<f32, R>(shape, stddev, rng),
                    DType::Float64 => glorot_normal::<f64, R>(shape, stddev, rng),
                    other => Err(GraphError::unsupported("glorot_normal", other)),
                }
            }
            Initializer::GlorotUniform { gain } => {
                let (fan_in, fan_out) = fans(shape)?;
                let limit = gain * (6.0 / (fan_in + fan_out)).sqrt();
                match dtype {
                    DType::Float32 => glorot_uniform::<f32, R>(shape, limit, rng),
                    DType::Float64 => glorot_uniform::<f64, R>(shape, limit, rng),
                    other => Err(GraphError::unsupported("glorot_uniform", other)),
                }
            }
        }
    }
}

impl fmt::Display for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Initializer::Zeroes => f.write_str("zeroes"),
            Initializer::Ones => f.write_str("ones"),
            Initializer::ValuesOf(x) => write!(f, "values_of({x})"),
            Initializer::Gaussian { mean, stddev } => write!(f, "gaussian({mean}, {stddev})"),
            Initializer::Uniform { low, high } => write!(f, "uniform({low}, {high})"),
            Initializer::GlorotNormal { gain } => write!(f, "glorot_normal({gain})"),
            Initializer::GlorotUniform { gain } => write!(f, "glorot_uniform({gain})"),
        }
    }
}
