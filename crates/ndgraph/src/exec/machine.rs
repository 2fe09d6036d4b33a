//! The execution machine.

use super::MachineConfig;
use crate::autodiff::{self, Gradients};
use crate::error::GraphError;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::value::Value;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::Ordering;

/// Lifecycle of a machine's cached values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    /// No valid forward values.
    Built,
    /// A forward pass is in progress.
    Running,
    /// Forward values are cached.
    Evaluated,
    /// Forward values and gradients are cached.
    Differentiated,
}

/// Evaluates a graph and differentiates it.
///
/// Every run starts from scratch: derived values are dropped and random
/// sources are redrawn from the machine's generator.
///
/// ```
/// use ndgraph::{DType, Graph, Machine, MachineConfig, NodeOpts, Value};
///
/// let mut g = Graph::new();
/// let a = g.new_vector(DType::Float64, NodeOpts::new().with_shape(3)).unwrap();
/// let b = g.new_constant(Value::from_vec(vec![1.0f64, 2.0, 3.0], 3).unwrap(), NodeOpts::new()).unwrap();
/// let s = g.add(a, b).unwrap();
/// let l = g.sum(s).unwrap();
///
/// let mut m = Machine::with_config(g, MachineConfig::default().with_seed(7).with_loss(l, &[a]));
/// m.bind(a, Value::from_vec(vec![1.0f64, 1.0, 1.0], 3).unwrap()).unwrap();
/// m.run_all().unwrap();
/// assert_eq!(m.value(l).unwrap().scalar::<f64>(), Some(9.0));
/// assert_eq!(m.gradient(a).unwrap().to_vec::<f64>(), Some(vec![1.0; 3]));
/// ```
#[derive(Debug)]
pub struct Machine<R: Rng = StdRng> {
    graph: Graph,
    rng: R,
    config: MachineConfig,
    state: MachineState,
    gradients: Option<Gradients>,
}

impl Machine<StdRng> {
    /// Machine with the default configuration, seeded from the OS.
    pub fn new(graph: Graph) -> Self {
        Self::with_config(graph, MachineConfig::default())
    }

    /// Machine seeded from `config.seed`, or from the OS if unset.
    pub fn with_config(graph: Graph, config: MachineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(graph, rng, config)
    }
}

impl<R: Rng> Machine<R> {
    /// Machine drawing from an explicit generator. `config.seed` is ignored.
    pub fn with_rng(graph: Graph, rng: R, config: MachineConfig) -> Self {
        Self {
            graph,
            rng,
            config,
            state: MachineState::Built,
            gradients: None,
        }
    }

    /// Evaluate every sink of the graph, then differentiate the configured
    /// loss if there is one.
    pub fn run_all(&mut self) -> Result<(), GraphError> {
        let sinks = self.graph.sinks();
        self.forward(&sinks)?;
        if let Some((loss, wrt)) = self.config.loss.clone() {
            self.backward(loss, &wrt)?;
        }
        Ok(())
    }

    /// Evaluate the nodes needed for `outputs`.
    ///
    /// # Errors
    ///
    /// - `GraphNotReady` on a cycle, an unresolved type or an unbound
    ///   variable without initializer.
    /// - `Cancelled` if the cancel flag was raised.
    ///
    /// Any error leaves the machine in [`MachineState::Built`].
    pub fn forward(&mut self, outputs: &[NodeId]) -> Result<(), GraphError> {
        self.reset();
        self.state = MachineState::Running;
        debug!(target: self.config.log_target.as_str(), "forward pass over {} output(s)", outputs.len());

        match self.evaluate_all(outputs) {
            Ok(count) => {
                self.state = MachineState::Evaluated;
                debug!(target: self.config.log_target.as_str(), "forward pass done, {count} node(s) evaluated");
                Ok(())
            }
            Err(err) => {
                debug!(target: self.config.log_target.as_str(), "forward pass aborted: {err}");
                self.reset();
                Err(err)
            }
        }
    }

    fn evaluate_all(&mut self, outputs: &[NodeId]) -> Result<usize, GraphError> {
        let order = self.graph.topological_order(outputs)?;
        for &id in &order {
            if self
                .config
                .cancel
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Relaxed))
            {
                return Err(GraphError::Cancelled);
            }

            let value = evaluate(&self.graph, id, &mut self.rng)?;
            let level = self.config.node_log_level;
            if log::log_enabled!(target: self.config.log_target.as_str(), level) {
                let node = self.graph.node(id)?;
                if self.config.log_values {
                    log::log!(target: self.config.log_target.as_str(), level, "eval {node} -> {value}");
                } else {
                    log::log!(target: self.config.log_target.as_str(), level, "eval {node}");
                }
            }
            self.graph.set_value(id, value)?;
        }
        Ok(order.len())
    }

    /// Differentiate `loss` with respect to `wrt` using the cached forward
    /// values.
    ///
    /// # Errors
    ///
    /// `StaleGraph` unless a forward pass has completed since the last
    /// `bind` or `reset`.
    pub fn backward(&mut self, loss: NodeId, wrt: &[NodeId]) -> Result<&Gradients, GraphError> {
        if !matches!(self.state, MachineState::Evaluated | MachineState::Differentiated) {
            return Err(GraphError::StaleGraph(format!(
                "backward from {loss} requires a completed forward pass"
            )));
        }
        debug!(target: self.config.log_target.as_str(), "backward pass from {loss}");
        let grads = autodiff::backward(&self.graph, loss, wrt)?;
        self.state = MachineState::Differentiated;
        Ok(&*self.gradients.insert(grads))
    }

    /// Cached value of `id` from the last forward pass, or its bound value.
    pub fn value(&self, id: NodeId) -> Option<&Value> {
        self.graph.value(id)
    }

    /// Gradient of the last differentiated loss with respect to `id`.
    pub fn gradient(&self, id: NodeId) -> Option<&Value> {
        self.gradients.as_ref().and_then(|g| g.get(id))
    }

    pub fn gradients(&self) -> Option<&Gradients> {
        self.gradients.as_ref()
    }

    pub fn state(&self) -> MachineState {
        self.state
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Bind a variable and drop every derived value and gradient.
    pub fn bind(&mut self, id: NodeId, value: impl Into<Value>) -> Result<(), GraphError> {
        self.graph.bind(id, value)?;
        self.reset();
        Ok(())
    }

    /// Drop derived values, random draws and gradients.
    pub fn reset(&mut self) {
        self.graph.invalidate();
        self.gradients = None;
        self.state = MachineState::Built;
    }
}

/// Compute the value of one node whose children are already evaluated.
fn evaluate<R: Rng + ?Sized>(graph: &Graph, id: NodeId, rng: &mut R) -> Result<Value, GraphError> {
    let node = graph.node(id)?;
    let not_ready = |what: &str| GraphError::GraphNotReady(format!("node {} {what}", node.label()));

    match node.kind() {
        NodeKind::Constant => node.value().cloned().ok_or_else(|| not_ready("has no value")),
        NodeKind::Variable { init } => {
            if let Some(value) = node.value() {
                return Ok(value.clone());
            }
            match (init, node.dtype()) {
                (Some(init), Some(dtype)) => init.materialize(dtype, node.shape(), rng),
                (Some(_), None) => Err(not_ready("has an unresolved type")),
                (None, _) => Err(not_ready("is unbound")),
            }
        }
        NodeKind::Random(distribution) => {
            let dtype = node.dtype().ok_or_else(|| not_ready("has an unresolved type"))?;
            distribution.sample(dtype, node.shape(), rng)
        }
        NodeKind::Derived(op) => {
            if !node.ty().is_resolved() {
                return Err(not_ready("has an unresolved type"));
            }
            let inputs = node
                .children()
                .iter()
                .map(|&c| graph.value(c).ok_or_else(|| not_ready("has an unevaluated operand")))
                .collect::<Result<Vec<_>, _>>()?;
            let value = op.forward(&inputs)?;
            if &value.shape() != node.shape() {
                return Err(GraphError::shape_mismatch(op.name(), node.shape(), &value.shape()));
            }
            Ok(value)
        }
    }
}
