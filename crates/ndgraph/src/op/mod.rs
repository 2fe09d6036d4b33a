//! The operation contract.
//!
//! ```text
//! Operation (trait)
//! ├── arith:  Add, Sub, Mul, Neg, Square
//! └── reduce: Sum { axes }, Mean
//! ```
//!
//! An operation knows how to type-check and shape-check its operands, how to
//! compute its output from operand values, and how to map the gradient of its
//! output to one gradient per operand. Accumulation across the graph is the
//! differentiation engine's job, not the operation's.

mod arith;
mod reduce;

pub use arith::{Add, Mul, Neg, Square, Sub};
pub use reduce::{Mean, Sum};

use crate::error::GraphError;
use crate::shape::Shape;
use crate::types::Type;
use crate::value::Value;
use std::fmt::Debug;

/// An operation applied by a derived node.
pub trait Operation: Debug + Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Number of operands.
    fn arity(&self) -> usize;

    /// Output type for the given operand types.
    fn infer_type(&self, inputs: &[Type]) -> Result<Type, GraphError>;

    /// Output shape for the given operand shapes.
    fn infer_shape(&self, inputs: &[&Shape]) -> Result<Shape, GraphError>;

    /// Compute the output from operand values. Must be pure.
    fn forward(&self, inputs: &[&Value]) -> Result<Value, GraphError>;

    /// Map `grad_output` (dL/d output) to dL/d input, one value per operand
    /// in operand order.
    fn gradient(
        &self,
        inputs: &[&Value],
        output: &Value,
        grad_output: &Value,
    ) -> Result<Vec<Value>, GraphError>;
}

pub(crate) fn check_arity<T>(op: &dyn Operation, inputs: &[T]) -> Result<(), GraphError> {
    if inputs.len() != op.arity() {
        return Err(GraphError::ArityMismatch {
            op: op.name().to_string(),
            expected: op.arity(),
            got: inputs.len(),
        });
    }
    Ok(())
}
