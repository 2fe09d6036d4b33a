//! Element-wise arithmetic operations.

use super::{Operation, check_arity};
use crate::error::GraphError;
use crate::shape::Shape;
use crate::types::{Type, unify};
use crate::value::{self, Value};

/// Type rule shared by the binary element-wise ops.
///
/// Equal types unify directly. A scalar operand broadcasts against a tensor
/// of the same dtype.
fn broadcast_type(op: &str, a: &Type, b: &Type) -> Result<Type, GraphError> {
    let check_numeric = |t: &Type| match t.dtype() {
        Some(dtype) if !dtype.is_numeric() => Err(GraphError::unsupported(op, dtype)),
        _ => Ok(()),
    };
    check_numeric(a)?;
    check_numeric(b)?;

    let mismatch = || GraphError::type_mismatch(op, a, b);
    match (a, b) {
        (Type::Scalar(da), Type::Tensor { .. }) => {
            unify(&Type::Scalar(*da), &Type::Scalar(b.dtype().ok_or_else(mismatch)?))
                .map_err(|_| mismatch())?;
            Ok(b.clone())
        }
        (Type::Tensor { .. }, Type::Scalar(db)) => {
            unify(&Type::Scalar(a.dtype().ok_or_else(mismatch)?), &Type::Scalar(*db))
                .map_err(|_| mismatch())?;
            Ok(a.clone())
        }
        _ => unify(a, b).map_err(|_| mismatch()),
    }
}

fn broadcast_shape(op: &str, a: &Shape, b: &Shape) -> Result<Shape, GraphError> {
    if a == b || b.is_scalar() {
        Ok(a.clone())
    } else if a.is_scalar() {
        Ok(b.clone())
    } else {
        Err(GraphError::shape_mismatch(op, a, b))
    }
}

/// Sum a broadcast gradient back down to the operand's shape.
fn unbroadcast(grad: Value, operand: &Value) -> Result<Value, GraphError> {
    if operand.is_scalar() && !grad.is_scalar() {
        value::sum_all(&grad)
    } else {
        Ok(grad)
    }
}

macro_rules! binary_op {
    ($name:ident, $label:literal, $forward:path) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl Operation for $name {
            fn name(&self) -> &str {
                $label
            }

            fn arity(&self) -> usize {
                2
            }

            fn infer_type(&self, inputs: &[Type]) -> Result<Type, GraphError> {
                check_arity(self, inputs)?;
                broadcast_type($label, &inputs[0], &inputs[1])
            }

            fn infer_shape(&self, inputs: &[&Shape]) -> Result<Shape, GraphError> {
                check_arity(self, inputs)?;
                broadcast_shape($label, inputs[0], inputs[1])
            }

            fn forward(&self, inputs: &[&Value]) -> Result<Value, GraphError> {
                check_arity(self, inputs)?;
                $forward(inputs[0], inputs[1])
            }

            fn gradient(
                &self,
                inputs: &[&Value],
                _output: &Value,
                grad_output: &Value,
            ) -> Result<Vec<Value>, GraphError> {
                check_arity(self, inputs)?;
                let (da, db) = self.partials(inputs[0], inputs[1], grad_output)?;
                Ok(vec![unbroadcast(da, inputs[0])?, unbroadcast(db, inputs[1])?])
            }
        }
    };
}

binary_op!(Add, "add", value::add);
binary_op!(Sub, "sub", value::sub);
binary_op!(Mul, "mul", value::mul);

impl Add {
    fn partials(&self, _a: &Value, _b: &Value, g: &Value) -> Result<(Value, Value), GraphError> {
        Ok((g.clone(), g.clone()))
    }
}

impl Sub {
    fn partials(&self, _a: &Value, _b: &Value, g: &Value) -> Result<(Value, Value), GraphError> {
        Ok((g.clone(), value::neg(g)?))
    }
}

impl Mul {
    fn partials(&self, a: &Value, b: &Value, g: &Value) -> Result<(Value, Value), GraphError> {
        Ok((value::mul(g, b)?, value::mul(g, a)?))
    }
}

fn unary_type(op: &str, inputs: &[Type]) -> Result<Type, GraphError> {
    match inputs[0].dtype() {
        Some(dtype) if !dtype.is_numeric() => Err(GraphError::unsupported(op, dtype)),
        _ => Ok(inputs[0].clone()),
    }
}

/// Element-wise negation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neg;

impl Operation for Neg {
    fn name(&self) -> &str {
        "neg"
    }

    fn arity(&self) -> usize {
        1
    }

    fn infer_type(&self, inputs: &[Type]) -> Result<Type, GraphError> {
        check_arity(self, inputs)?;
        unary_type("neg", inputs)
    }

    fn infer_shape(&self, inputs: &[&Shape]) -> Result<Shape, GraphError> {
        check_arity(self, inputs)?;
        Ok(inputs[0].clone())
    }

    fn forward(&self, inputs: &[&Value]) -> Result<Value, GraphError> {
        check_arity(self, inputs)?;
        value::neg(inputs[0])
    }

    fn gradient(
        &self,
        inputs: &[&Value],
        _output: &Value,
        grad_output: &Value,
    ) -> Result<Vec<Value>, GraphError> {
        check_arity(self, inputs)?;
        Ok(vec![value::neg(grad_output)?])
    }
}

/// Element-wise `x * x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Square;

impl Operation for Square {
    fn name(&self) -> &str {
        "square"
    }

    fn arity(&self) -> usize {
        1
    }

    fn infer_type(&self, inputs: &[Type]) -> Result<Type, GraphError> {
        check_arity(self, inputs)?;
        unary_type("square", inputs)
    }

    fn infer_shape(&self, inputs: &[&Shape]) -> Result<Shape, GraphError> {
        check_arity(self, inputs)?;
        Ok(inputs[0].clone())
    }

    fn forward(&self, inputs: &[&Value]) -> Result<Value, GraphError> {
        check_arity(self, inputs)?;
        value::square(inputs[0])
    }

    fn gradient(
        &self,
        inputs: &[&Value],
        _output: &Value,
        grad_output: &Value,
    ) -> Result<Vec<Value>, GraphError> {
        check_arity(self, inputs)?;
        let two_x = value::scale(inputs[0], 2.0)?;
        Ok(vec![value::mul(&two_x, grad_output)?])
    }
}
