//! Random tensor construction and the distributions behind random nodes.
//!
//! Every sampler takes its generator explicitly. There is no process-wide
//! generator: reproducibility comes from seeding the caller's RNG.

use rand::Rng;
use rand::distr::{StandardUniform, Uniform};
use rand_distr::{Binomial, Distribution as _, Normal, StandardNormal};
use std::fmt;

use crate::dtype::DType;
use crate::error::GraphError;
use crate::scalar::{Numeric, Scalar};
use crate::shape::Shape;
use crate::storage::Dense;
use crate::tensor::Tensor;
use crate::value::{Value, with_numeric_dtype};

/// Trait for types that can be randomly sampled from a uniform distribution.
pub trait RandomUniform: Scalar {
    /// Sample a random value from the uniform distribution [0, 1).
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl RandomUniform for f32 {
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(StandardUniform)
    }
}

impl RandomUniform for f64 {
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(StandardUniform)
    }
}

/// Trait for types that can be randomly sampled from a normal distribution.
pub trait RandomNormal: Scalar {
    /// Sample a random value from the standard normal distribution.
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self;
}

impl RandomNormal for f32 {
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

impl RandomNormal for f64 {
    fn sample_normal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        rng.sample(StandardNormal)
    }
}

impl<ElT: RandomUniform> Tensor<ElT, Dense<ElT>> {
    /// Create a tensor with uniform random values in [0, 1).
    ///
    /// # Example
    ///
    /// ```
    /// use ndgraph::Tensor;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let t1: Tensor<f64> = Tensor::random_with_rng(&[2, 3], &mut rng);
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let t2: Tensor<f64> = Tensor::random_with_rng(&[2, 3], &mut rng);
    ///
    /// assert_eq!(t1.data(), t2.data());
    /// ```
    pub fn random_with_rng<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Self {
        let mut t = Self::zeros(shape);
        t.data_mut()
            .iter_mut()
            .for_each(|x| *x = ElT::sample_uniform(rng));
        t
    }
}

impl<ElT: RandomNormal> Tensor<ElT, Dense<ElT>> {
    /// Create a tensor with standard normal random values.
    ///
    /// # Example
    ///
    /// ```
    /// use ndgraph::Tensor;
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let t: Tensor<f32> = Tensor::randn_with_rng(&[2, 3], &mut rng);
    /// assert_eq!(t.shape(), &[2, 3]);
    /// ```
    pub fn randn_with_rng<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Self {
        let mut t = Self::zeros(shape);
        for x in t.data_mut() {
            *x = ElT::sample_normal(rng);
        }
        t
    }
}

/// A named distribution that random nodes draw from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distribution {
    /// Normal distribution. Float dtypes only.
    Gaussian { mean: f64, stddev: f64 },
    /// Uniform on `[low, high)`. Float dtypes only.
    Uniform { low: f64, high: f64 },
    /// Number of successes in `trials` Bernoulli draws. Any numeric dtype.
    Binomial { trials: u64, prob: f64 },
}

fn invalid(err: impl fmt::Display) -> GraphError {
    GraphError::InvalidDistribution(err.to_string())
}

impl Distribution {
    fn name(&self) -> &'static str {
        match self {
            Distribution::Gaussian { .. } => "gaussian",
            Distribution::Uniform { .. } => "uniform",
            Distribution::Binomial { .. } => "binomial",
        }
    }

    /// Check parameters and that `dtype` can hold draws.
    pub fn validate(&self, dtype: DType) -> Result<(), GraphError> {
        let supported = match self {
            Distribution::Binomial { .. } => dtype.is_numeric(),
            _ => dtype.is_float(),
        };
        if !supported {
            return Err(GraphError::unsupported(self.name(), dtype));
        }
        match *self {
            Distribution::Gaussian { mean, stddev } => {
                if !mean.is_finite() {
                    return Err(invalid(format_args!("gaussian mean {mean} is not finite")));
                }
                if !stddev.is_finite() || stddev < 0.0 {
                    return Err(invalid(format_args!(
                        "gaussian stddev {stddev} must be finite and non-negative"
                    )));
                }
                Normal::new(mean, stddev).map_err(invalid)?;
            }
            Distribution::Uniform { low, high } => {
                if !(low.is_finite() && high.is_finite() && low < high) {
                    return Err(invalid(format_args!("uniform range [{low}, {high}) is empty or unbounded")));
                }
                Uniform::new(low, high).map_err(invalid)?;
            }
            Distribution::Binomial { trials, prob } => {
                if !(0.0..=1.0).contains(&prob) {
                    return Err(invalid(format_args!("binomial probability {prob} is outside [0, 1]")));
                }
                Binomial::new(trials, prob).map_err(invalid)?;
            }
        }
        Ok(())
    }

    /// Draw an i.i.d. sample of `shape` elements of `dtype`.
    ///
    /// ```
    /// use ndgraph::{DType, Distribution, Shape};
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let d = Distribution::Uniform { low: -1.0, high: 1.0 };
    /// let v = d.sample(DType::Float32, &Shape::from(4), &mut rng).unwrap();
    /// assert!(v.to_vec::<f32>().unwrap().iter().all(|x| (-1.0..1.0).contains(x)));
    /// ```
    pub fn sample<R: Rng + ?Sized>(
        &self,
        dtype: DType,
        shape: &Shape,
        rng: &mut R,
    ) -> Result<Value, GraphError> {
        self.validate(dtype)?;
        let n = shape.elem_count();
        let draws: Vec<f64> = match *self {
            Distribution::Gaussian { mean, stddev } => {
                let d = Normal::new(mean, stddev).map_err(invalid)?;
                (0..n).map(|_| d.sample(rng)).collect()
            }
            Distribution::Uniform { low, high } => {
                let d = Uniform::new(low, high).map_err(invalid)?;
                (0..n).map(|_| d.sample(rng)).collect()
            }
            Distribution::Binomial { trials, prob } => {
                let d = Binomial::new(trials, prob).map_err(invalid)?;
                (0..n).map(|_| d.sample(rng) as f64).collect()
            }
        };
        with_numeric_dtype!(dtype, self.name(), T => cast_draws::<T>(draws, shape))
    }
}

fn cast_draws<T: Numeric>(draws: Vec<f64>, shape: &Shape) -> Result<Value, GraphError> {
    let data = draws
        .into_iter()
        .map(|x| {
            <T as Numeric>::from_f64(x)
                .ok_or_else(|| invalid(format_args!("draw {x} does not fit {}", T::DTYPE)))
        })
        .collect::<Result<Vec<T>, _>>()?;
    Value::from_vec(data, shape.clone())
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Gaussian { mean, stddev } => write!(f, "N({mean}, {stddev})"),
            Distribution::Uniform { low, high } => write!(f, "U({low}, {high})"),
            Distribution::Binomial { trials, prob } => write!(f, "B({trials}, {prob})"),
        }
    }
}
