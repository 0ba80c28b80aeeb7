//! Kernel trait definition

use crate::core::SparseVector;

/// Similarity function between two inputs.
///
/// Implementations must be stateless, deterministic and commutative
/// (`K(x, y) == K(y, x)`), and are called concurrently from multiple worker
/// threads during training.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64;
}
