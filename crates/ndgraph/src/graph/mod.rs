//! The computation graph.
//!
//! ```text
//! Graph
//! └── Vec<Node>            (arena, indexed by NodeId)
//!     ├── Constant         leaf, fixed value
//!     ├── Variable         leaf, bound or initialized
//!     ├── Random           leaf, redrawn per evaluation
//!     └── Derived(op)      children in argument order
//! ```
//!
//! The graph is the sole owner of its nodes. Handles are plain indices and
//! nodes are never removed, so a handle stays valid for the graph's lifetime.
//! Every constructor validates before touching the node table: a failed
//! construction leaves the graph exactly as it was.

mod construct;
mod node;
mod traversal;

pub use node::{Node, NodeId, NodeKind, NodeOpts};

use crate::error::GraphError;
use crate::value::Value;

/// Arena of nodes forming a DAG through their `children` edges.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get node by handle.
    pub fn node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(id.0).ok_or(GraphError::NodeNotFound(id))
    }

    /// All nodes, in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The node's cached value, if any.
    pub fn value(&self, id: NodeId) -> Option<&Value> {
        self.nodes.get(id.0).and_then(|n| n.value.as_ref())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes.get_mut(id.0).ok_or(GraphError::NodeNotFound(id))
    }

    pub(crate) fn set_value(&mut self, id: NodeId, value: Value) -> Result<(), GraphError> {
        self.node_mut(id)?.value = Some(value);
        Ok(())
    }

    /// Drop cached values of derived and random nodes.
    ///
    /// Constants and variables keep theirs.
    pub(crate) fn invalidate(&mut self) {
        for node in &mut self.nodes {
            if matches!(node.kind, NodeKind::Derived(_) | NodeKind::Random(_)) {
                node.value = None;
            }
        }
    }

    fn push(&mut self, node: impl FnOnce(NodeId) -> Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node(id));
        id
    }
}
