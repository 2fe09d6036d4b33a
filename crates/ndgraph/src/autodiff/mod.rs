//! Reverse-mode differentiation over an evaluated graph.
//!
//! ```text
//! Graph (values cached by a forward pass)
//!        │
//!        ▼
//! backward(loss, wrt)
//!   ├── order nodes reachable from loss
//!   ├── seed loss with 1
//!   └── reverse order: Operation::gradient, add into children
//!        │
//!        ▼
//! Gradients (NodeId -> Value)
//! ```
//!
//! Gradients are plain values of the same type and shape as the node they
//! belong to. A node reached along several paths receives the sum of every
//! path's contribution.

mod backward;
mod gradients;

pub use backward::backward;
pub use gradients::Gradients;
