//! Error types for ndgraph.

use crate::dtype::DType;
use crate::graph::NodeId;
use crate::shape::Shape;
use crate::types::Type;
use thiserror::Error;

/// Errors that can occur in tensor storage operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TensorError {
    /// Shape mismatch between data length and expected size.
    #[error("shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Two operands of an element-wise operation have incompatible shapes.
    #[error("incompatible shapes {lhs:?} and {rhs:?}")]
    IncompatibleShapes { lhs: Vec<usize>, rhs: Vec<usize> },

    /// Reduction axis not present in the tensor.
    #[error("axis {axis} out of range for tensor with {ndim} dimensions")]
    AxisOutOfRange { axis: usize, ndim: usize },
}

/// Errors raised while building, running or differentiating a graph.
///
/// Construction-time variants (`TypeMismatch`, `ShapeMismatch`, ...) are
/// always reported before the graph is mutated. Run-time variants abort the
/// current run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Two types failed to unify.
    #[error("type mismatch in {context}: expected {expected}, got {got}")]
    TypeMismatch {
        context: String,
        expected: Type,
        got: Type,
    },

    /// An operation's shape rule rejected its operands.
    #[error("shape mismatch in {context}: {lhs} vs {rhs}")]
    ShapeMismatch {
        context: String,
        lhs: Shape,
        rhs: Shape,
    },

    /// A shape's rank disagrees with the dimensionality of its type.
    #[error("rank mismatch in {context}: expected {expected} dims, got shape {shape}")]
    RankMismatch {
        context: String,
        expected: usize,
        shape: Shape,
    },

    /// An operation was applied to the wrong number of children.
    #[error("{op} takes {expected} operand(s), got {got}")]
    ArityMismatch {
        op: String,
        expected: usize,
        got: usize,
    },

    /// The operation is not defined for this dtype.
    #[error("{op} is not defined for dtype {dtype}")]
    UnsupportedDType { op: String, dtype: DType },

    /// A literal could not be converted into a value.
    #[error("cannot convert a value of type `{kind}` into a graph value")]
    UnsupportedValueKind { kind: &'static str },

    /// One-hot index outside `0..length`.
    #[error("index {index} out of range for length {length}")]
    IndexOutOfRange { index: isize, length: usize },

    /// Reduction axis outside the operand's rank.
    #[error("axis {axis} out of range for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// The reduction has no elements to work on.
    #[error("{op} of an empty operand is undefined")]
    EmptyReduction { op: String },

    /// Distribution or initializer parameters are invalid.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    /// The handle does not belong to this graph.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// Only variables can be rebound.
    #[error("node {node} cannot be bound: {reason}")]
    NotBindable { node: NodeId, reason: &'static str },

    /// The requested edge would close a cycle.
    #[error("edge {parent} -> {child} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    /// The graph cannot be executed (cycle, unresolved type, unbound input).
    #[error("graph not ready: {0}")]
    GraphNotReady(String),

    /// Gradients were requested without valid forward values.
    #[error("stale graph: {0}")]
    StaleGraph(String),

    /// The differentiation target is invalid.
    #[error("not differentiable: {0}")]
    NotDifferentiable(String),

    /// A requested node does not contribute to the loss.
    #[error("node {node} is not connected to loss {loss}")]
    DisconnectedGraph { loss: NodeId, node: NodeId },

    /// The run was aborted through the machine's cancel flag.
    #[error("run cancelled")]
    Cancelled,

    /// Storage-level failure.
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

impl GraphError {
    pub(crate) fn type_mismatch(context: impl Into<String>, expected: &Type, got: &Type) -> Self {
        GraphError::TypeMismatch {
            context: context.into(),
            expected: expected.clone(),
            got: got.clone(),
        }
    }

    pub(crate) fn shape_mismatch(context: impl Into<String>, lhs: &Shape, rhs: &Shape) -> Self {
        GraphError::ShapeMismatch {
            context: context.into(),
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        }
    }

    pub(crate) fn unsupported(op: impl Into<String>, dtype: DType) -> Self {
        GraphError::UnsupportedDType {
            op: op.into(),
            dtype,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = GraphError::IndexOutOfRange {
            index: 10,
            length: 10,
        };
        assert_eq!(err.to_string(), "index 10 out of range for length 10");

        let err = GraphError::shape_mismatch("add", &Shape::from(5), &Shape::from(6));
        assert_eq!(err.to_string(), "shape mismatch in add: (5) vs (6)");
    }

    #[test]
    fn test_tensor_error_converts() {
        let err: GraphError = TensorError::AxisOutOfRange { axis: 2, ndim: 1 }.into();
        assert!(matches!(err, GraphError::Tensor(_)));
        assert_eq!(err.to_string(), "axis 2 out of range for tensor with 1 dimensions");
    }
}
