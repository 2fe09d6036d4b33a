//! Gradient storage container.

use crate::error::GraphError;
use crate::graph::NodeId;
use crate::value::{self, Value};
use std::collections::HashMap;

/// Accumulated gradients keyed by node.
#[derive(Debug, Clone, Default)]
pub struct Gradients {
    grads: HashMap<NodeId, Value>,
}

impl Gradients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `grad` into the node's accumulator.
    ///
    /// # Errors
    ///
    /// Fails if `grad` disagrees with the stored gradient in type or shape.
    pub fn accumulate(&mut self, id: NodeId, grad: Value) -> Result<(), GraphError> {
        match self.grads.get_mut(&id) {
            Some(existing) => *existing = value::add(existing, &grad)?,
            None => {
                self.grads.insert(id, grad);
            }
        }
        Ok(())
    }

    /// Gradient of the loss with respect to `id`.
    pub fn get(&self, id: NodeId) -> Option<&Value> {
        self.grads.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.grads.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.grads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &Value)> {
        self.grads.iter()
    }
}
