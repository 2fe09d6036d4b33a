//! Reductions.

use super::{Operation, check_arity};
use crate::error::GraphError;
use crate::shape::Shape;
use crate::types::Type;
use crate::value::{self, Value};

/// Sum over a set of axes; no axes means sum everything to a scalar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sum {
    axes: Vec<usize>,
}

impl Sum {
    /// Full reduction.
    pub fn all() -> Self {
        Self::default()
    }

    /// Reduction along `axes`. Duplicates are ignored.
    pub fn along(axes: &[usize]) -> Self {
        let mut axes = axes.to_vec();
        axes.sort_unstable();
        axes.dedup();
        Self { axes }
    }

    pub fn axes(&self) -> &[usize] {
        &self.axes
    }
}

impl Operation for Sum {
    fn name(&self) -> &str {
        "sum"
    }

    fn arity(&self) -> usize {
        1
    }

    fn infer_type(&self, inputs: &[Type]) -> Result<Type, GraphError> {
        check_arity(self, inputs)?;
        let (Some(dims), Some(dtype)) = (inputs[0].dims(), inputs[0].dtype()) else {
            // Output rank is unknown until the operand resolves.
            return Ok(inputs[0].clone());
        };
        if !dtype.is_numeric() {
            return Err(GraphError::unsupported("sum", dtype));
        }
        if self.axes.is_empty() {
            return Ok(Type::Scalar(dtype));
        }
        if let Some(&axis) = self.axes.iter().find(|&&a| a >= dims) {
            return Err(GraphError::InvalidAxis { axis, rank: dims });
        }
        Ok(Type::tensor(dims - self.axes.len(), dtype))
    }

    fn infer_shape(&self, inputs: &[&Shape]) -> Result<Shape, GraphError> {
        check_arity(self, inputs)?;
        if self.axes.is_empty() {
            return Ok(Shape::scalar());
        }
        inputs[0].check_axes(&self.axes)?;
        Ok(inputs[0].without_axes(&self.axes))
    }

    fn forward(&self, inputs: &[&Value]) -> Result<Value, GraphError> {
        check_arity(self, inputs)?;
        if self.axes.is_empty() {
            value::sum_all(inputs[0])
        } else {
            value::sum_axes(inputs[0], &self.axes)
        }
    }

    fn gradient(
        &self,
        inputs: &[&Value],
        _output: &Value,
        grad_output: &Value,
    ) -> Result<Vec<Value>, GraphError> {
        check_arity(self, inputs)?;
        let x = inputs[0];
        let grad = if self.axes.is_empty() {
            value::mul(&x.ones_like(), grad_output)?
        } else {
            value::broadcast_axes(grad_output, &self.axes, &x.shape())?
        };
        Ok(vec![grad])
    }
}

/// Arithmetic mean of every element. Float dtypes only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mean;

impl Operation for Mean {
    fn name(&self) -> &str {
        "mean"
    }

    fn arity(&self) -> usize {
        1
    }

    fn infer_type(&self, inputs: &[Type]) -> Result<Type, GraphError> {
        check_arity(self, inputs)?;
        match inputs[0].dtype() {
            Some(dtype) if dtype.is_float() => Ok(Type::Scalar(dtype)),
            Some(dtype) => Err(GraphError::unsupported("mean", dtype)),
            None => Ok(inputs[0].clone()),
        }
    }

    fn infer_shape(&self, inputs: &[&Shape]) -> Result<Shape, GraphError> {
        check_arity(self, inputs)?;
        if inputs[0].elem_count() == 0 {
            return Err(empty_mean());
        }
        Ok(Shape::scalar())
    }

    fn forward(&self, inputs: &[&Value]) -> Result<Value, GraphError> {
        check_arity(self, inputs)?;
        let n = inputs[0].len();
        if n == 0 {
            return Err(empty_mean());
        }
        value::scale(&value::sum_all(inputs[0])?, 1.0 / n as f64)
    }

    fn gradient(
        &self,
        inputs: &[&Value],
        _output: &Value,
        grad_output: &Value,
    ) -> Result<Vec<Value>, GraphError> {
        check_arity(self, inputs)?;
        let x = inputs[0];
        if x.is_empty() {
            return Err(empty_mean());
        }
        let per_element = value::scale(grad_output, 1.0 / x.len() as f64)?;
        Ok(vec![value::mul(&x.ones_like(), &per_element)?])
    }
}

fn empty_mean() -> GraphError {
    GraphError::EmptyReduction { op: "mean".into() }
}
