//! Backward pass.

use super::Gradients;
use crate::error::GraphError;
use crate::graph::{Graph, NodeId};
use crate::value::Value;
use log::trace;

/// Compute the gradient of `loss` with respect to every node it depends on.
///
/// The graph must hold the values of a completed forward pass. `wrt` names
/// the nodes the caller cares about; each must feed into `loss`. The result
/// keeps every accumulated gradient, not just those in `wrt`.
///
/// # Errors
///
/// - `StaleGraph` if `loss` or a node it depends on has no cached value.
/// - `NotDifferentiable` if `loss` is not a floating-point scalar.
/// - `DisconnectedGraph` if a node in `wrt` does not feed into `loss`.
///
/// ```
/// use ndgraph::{DType, Graph, Machine, NodeOpts, backward};
///
/// let mut g = Graph::new();
/// let x = g.new_scalar(DType::Float64, NodeOpts::new().with_value(3.0f64)).unwrap();
/// let y = g.square(x).unwrap();
///
/// let mut m = Machine::new(g);
/// m.forward(&[y]).unwrap();
/// let grads = backward(m.graph(), y, &[x]).unwrap();
/// assert_eq!(grads.get(x).unwrap().scalar::<f64>(), Some(6.0));
/// ```
pub fn backward(graph: &Graph, loss: NodeId, wrt: &[NodeId]) -> Result<Gradients, GraphError> {
    let loss_node = graph.node(loss)?;
    let loss_value = loss_node
        .value()
        .ok_or_else(|| GraphError::StaleGraph(format!("loss {} has not been evaluated", loss_node.label())))?;
    if !loss_value.is_scalar() || !loss_value.dtype().is_float() {
        return Err(GraphError::NotDifferentiable(format!(
            "loss {} must be a floating-point scalar, got {}",
            loss_node.label(),
            loss_node.ty()
        )));
    }

    let order = graph.topological_order(&[loss])?;
    for &id in wrt {
        graph.node(id)?;
        if !order.contains(&id) {
            return Err(GraphError::DisconnectedGraph { loss, node: id });
        }
    }
    for &id in &order {
        let node = graph.node(id)?;
        if node.value().is_none() {
            return Err(GraphError::StaleGraph(format!(
                "node {} has no value from the last forward pass",
                node.label()
            )));
        }
    }

    let mut grads = Gradients::new();
    trace!("seed gradient of {}", loss_node.label());
    grads.accumulate(loss, Value::one(loss_value.dtype()))?;

    // Parents come after children in `order`, so walking it backwards
    // finishes every accumulator before it is propagated.
    for &id in order.iter().rev() {
        let node = graph.node(id)?;
        let Some(op) = node.op() else {
            continue;
        };
        let Some(grad_output) = grads.get(id).cloned() else {
            continue;
        };
        let inputs = node
            .children()
            .iter()
            .map(|&c| {
                graph
                    .value(c)
                    .ok_or_else(|| GraphError::StaleGraph(format!("node {c} has no value")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let output = graph
            .value(id)
            .ok_or_else(|| GraphError::StaleGraph(format!("node {id} has no value")))?;

        let partials = op.gradient(&inputs, output, &grad_output)?;
        trace!("backward {} through {}", node.label(), op.name());
        for (&child, partial) in node.children().iter().zip(partials) {
            grads.accumulate(child, partial)?;
        }
    }
    Ok(grads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::DType;
    use crate::graph::NodeOpts;
    use approx::assert_relative_eq;

    /// Build `l = x^2 + (-x)` with x bound and values filled by hand.
    fn evaluated(x0: f64) -> (Graph, NodeId, NodeId) {
        let mut g = Graph::new();
        let x = g.new_scalar(DType::Float64, NodeOpts::new().with_value(x0)).unwrap();
        let a = g.square(x).unwrap();
        let b = g.neg(x).unwrap();
        let l = g.add(a, b).unwrap();
        g.set_value(a, Value::from(x0 * x0)).unwrap();
        g.set_value(b, Value::from(-x0)).unwrap();
        g.set_value(l, Value::from(x0 * x0 - x0)).unwrap();
        (g, x, l)
    }

    #[test]
    fn test_fan_out_accumulates_once() {
        let (g, x, l) = evaluated(3.0);
        let grads = backward(&g, l, &[x]).unwrap();
        // d/dx (x^2 - x) = 2x - 1
        assert_relative_eq!(grads.get(x).unwrap().scalar::<f64>().unwrap(), 5.0);
        assert_eq!(grads.len(), 4);
        assert_relative_eq!(grads.get(l).unwrap().scalar::<f64>().unwrap(), 1.0);
    }

    #[test]
    fn test_stale_values_rejected() {
        let (mut g, x, l) = evaluated(1.0);
        g.invalidate();
        assert!(matches!(backward(&g, l, &[x]), Err(GraphError::StaleGraph(_))));
    }

    #[test]
    fn test_disconnected_and_non_scalar() {
        let (mut g, x, l) = evaluated(1.0);
        let y = g.new_scalar(DType::Float64, NodeOpts::new().with_value(0.0f64)).unwrap();
        assert_eq!(
            backward(&g, l, &[x, y]).unwrap_err(),
            GraphError::DisconnectedGraph { loss: l, node: y }
        );

        let v = g
            .new_vector(DType::Float64, NodeOpts::new().with_value(Value::from_vec(vec![1.0f64, 2.0], 2).unwrap()))
            .unwrap();
        assert!(matches!(backward(&g, v, &[]), Err(GraphError::NotDifferentiable(_))));

        let i = g.new_scalar(DType::Int, NodeOpts::new().with_value(2isize)).unwrap();
        assert!(matches!(backward(&g, i, &[]), Err(GraphError::NotDifferentiable(_))));
    }
}
