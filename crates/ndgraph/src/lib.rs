//! ndgraph - computation graphs over dense tensors
//!
//! Build a graph of typed, shaped nodes, evaluate it with a [`Machine`], and
//! differentiate a scalar loss in reverse mode.
//!
//! # Architecture
//!
//! ```text
//! Level 1: Graph (graph module)
//!     → constants, variables, random sources, derived nodes
//!     → type and shape inference at construction
//!
//! Level 2: Execution (exec, autodiff modules)
//!     → Machine: forward pass, cached values, cancellation
//!     → backward: reverse-mode gradient accumulation
//!
//! Level 3: Values and kernels (value, op, operations modules)
//!     → Value: dtype-tagged scalars and dense tensors
//!     → Operation trait: Add, Sub, Mul, Neg, Square, Sum, Mean
//! ```
//!
//! # Example
//!
//! ```
//! use ndgraph::{DType, Graph, Machine, MachineConfig, NodeOpts, Value};
//!
//! let mut g = Graph::new();
//! let x = g.new_vector(DType::Float64, NodeOpts::new().with_name("x").with_shape(3)).unwrap();
//! let sq = g.square(x).unwrap();
//! let loss = g.sum(sq).unwrap();
//!
//! let mut m = Machine::with_config(g, MachineConfig::default().with_seed(0));
//! m.bind(x, Value::from_vec(vec![1.0f64, 2.0, 3.0], 3).unwrap()).unwrap();
//! m.forward(&[loss]).unwrap();
//! assert_eq!(m.value(loss).unwrap().scalar::<f64>(), Some(14.0));
//!
//! let grads = m.backward(loss, &[x]).unwrap();
//! assert_eq!(grads.get(x).unwrap().to_vec::<f64>(), Some(vec![2.0, 4.0, 6.0]));
//! ```

pub mod autodiff;
pub mod dtype;
pub mod error;
pub mod exec;
pub mod graph;
pub mod init;
pub mod op;
pub mod operations;
pub mod random;
pub mod scalar;
pub mod shape;
pub mod storage;
pub mod strides;
pub mod tensor;
pub mod types;
pub mod value;

pub use autodiff::{Gradients, backward};
pub use dtype::DType;
pub use error::{GraphError, TensorError};
pub use exec::{Machine, MachineConfig, MachineState};
pub use graph::{Graph, Node, NodeId, NodeKind, NodeOpts};
pub use init::Initializer;
pub use op::{Add, Mean, Mul, Neg, Operation, Square, Sub, Sum};
pub use random::Distribution;
pub use scalar::{Numeric, Scalar};
pub use shape::Shape;
pub use storage::{Dense, TensorStorage};
pub use tensor::{DenseTensor, Tensor};
pub use types::{Type, TypeVar, unify};
pub use value::{ScalarValue, TensorValue, Value};
