//! Tensor kernels.
//!
//! Free functions over [`DenseTensor`](crate::DenseTensor). The value layer
//! dispatches on dtype and calls into these; nothing here knows about graphs.

mod elementwise;
mod reduce;

pub use elementwise::{map, scale, zip_with};
pub use reduce::{broadcast_axes, sum, sum_axes};
