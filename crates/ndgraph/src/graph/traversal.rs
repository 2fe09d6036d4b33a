//! Reachability and scheduling.

use super::{Graph, NodeId};
use crate::error::GraphError;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

impl Graph {
    /// Every node reachable from `roots` through child edges, roots included.
    ///
    /// Safe on cyclic graphs.
    pub fn reachable_from(&self, roots: &[NodeId]) -> Result<HashSet<NodeId>, GraphError> {
        let mut seen = HashSet::new();
        let mut stack = Vec::new();
        for &root in roots {
            self.node(root)?;
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            for &child in self.node(id)?.children() {
                if !seen.contains(&child) {
                    stack.push(child);
                }
            }
        }
        Ok(seen)
    }

    /// Whether `target` is `from` or one of its transitive children.
    pub fn depends_on(&self, from: NodeId, target: NodeId) -> Result<bool, GraphError> {
        Ok(self.reachable_from(&[from])?.contains(&target))
    }

    /// Order the nodes needed for `targets` so that every node comes after
    /// all of its children.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::GraphNotReady` if those nodes contain a cycle.
    pub fn topological_order(&self, targets: &[NodeId]) -> Result<Vec<NodeId>, GraphError> {
        let mut needed: Vec<NodeId> = self.reachable_from(targets)?.into_iter().collect();
        // Stable input order keeps schedules reproducible across runs.
        needed.sort_unstable();

        let mut dag: DiGraph<NodeId, ()> = DiGraph::with_capacity(needed.len(), needed.len());
        let mut index: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(needed.len());
        for &id in &needed {
            index.insert(id, dag.add_node(id));
        }
        for &id in &needed {
            for child in self.node(id)?.children() {
                // Edge from operand to consumer (evaluation direction).
                dag.add_edge(index[child], index[&id], ());
            }
        }

        let order = toposort(&dag, None).map_err(|cycle| {
            GraphError::GraphNotReady(format!("cycle through node {}", dag[cycle.node_id()]))
        })?;
        Ok(order.into_iter().map(|ix| dag[ix]).collect())
    }

    /// Every node that consumes `id` as an operand.
    pub fn parents_of(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        self.node(id)?;
        Ok(self
            .nodes
            .iter()
            .filter(|n| n.children.contains(&id))
            .map(|n| n.id)
            .collect())
    }

    /// Nodes that no other node consumes.
    pub fn sinks(&self) -> Vec<NodeId> {
        let consumed: HashSet<NodeId> = self
            .nodes
            .iter()
            .flat_map(|n| n.children.iter().copied())
            .collect();
        self.nodes
            .iter()
            .map(|n| n.id)
            .filter(|id| !consumed.contains(id))
            .collect()
    }
}
