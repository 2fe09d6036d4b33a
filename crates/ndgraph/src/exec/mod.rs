//! Graph execution.
//!
//! A [`Machine`] owns a graph and a random generator. It evaluates nodes in
//! dependency order, caches their values on the graph, and runs the backward
//! pass on request.

mod config;
mod machine;

pub use config::MachineConfig;
pub use machine::{Machine, MachineState};
