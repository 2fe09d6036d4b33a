//! Machine configuration.

use crate::graph::NodeId;
use log::Level;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Configuration for a [`Machine`](super::Machine).
///
/// ```
/// use ndgraph::MachineConfig;
///
/// let config = MachineConfig::default()
///     .with_seed(42)
///     .with_node_log_level(log::Level::Debug)
///     .with_value_logging(true);
/// assert_eq!(config.seed, Some(42));
/// ```
#[derive(Debug, Clone)]
pub struct MachineConfig {
    /// Seed for the machine's generator; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Loss and differentiation targets for `run_all`.
    pub loss: Option<(NodeId, Vec<NodeId>)>,
    /// Log target for run and node events (default: `ndgraph::machine`).
    pub log_target: String,
    /// Level of per-node evaluation records (default: `Trace`).
    pub node_log_level: Level,
    /// Include computed values in per-node records.
    pub log_values: bool,
    /// Checked between node evaluations; `true` aborts the run.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            loss: None,
            log_target: "ndgraph::machine".to_string(),
            node_log_level: Level::Trace,
            log_values: false,
            cancel: None,
        }
    }
}

impl MachineConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Differentiate `loss` with respect to `wrt` after every `run_all`.
    pub fn with_loss(mut self, loss: NodeId, wrt: &[NodeId]) -> Self {
        self.loss = Some((loss, wrt.to_vec()));
        self
    }

    pub fn with_log_target(mut self, target: &str) -> Self {
        self.log_target = target.to_string();
        self
    }

    pub fn with_node_log_level(mut self, level: Level) -> Self {
        self.node_log_level = level;
        self
    }

    pub fn with_value_logging(mut self, enabled: bool) -> Self {
        self.log_values = enabled;
        self
    }

    /// Share a cancellation flag with another thread.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }
}
