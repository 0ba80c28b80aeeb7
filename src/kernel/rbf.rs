//! RBF (Gaussian) kernel implementation

use crate::core::SparseVector;
use crate::kernel::linear::dot_product_sparse;
use crate::kernel::Kernel;

/// RBF kernel: K(x, y) = exp(-gamma * ||x - y||^2)
///
/// Gamma controls the reach of each training example; 1.0 / n_features is a
/// reasonable default starting point.
#[derive(Debug, Clone, Copy)]
pub struct RbfKernel {
    gamma: f64,
}

impl RbfKernel {
    /// Create a new RBF kernel with the given gamma parameter
    ///
    /// # Panics
    /// Panics if gamma is not positive
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self { gamma }
    }

    /// RBF kernel with gamma = 1.0 / n_features
    pub fn with_auto_gamma(n_features: usize) -> Self {
        assert!(n_features > 0, "Number of features must be positive");
        Self::new(1.0 / n_features as f64)
    }

    /// Get the gamma parameter
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for RbfKernel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Kernel for RbfKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        // ||x - y||^2 = ||x||^2 + ||y||^2 - 2 x.y
        let dist_sq = x.norm_squared() + y.norm_squared() - 2.0 * dot_product_sparse(x, y);
        (-self.gamma * dist_sq.max(0.0)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rbf_identical_vectors() {
        let kernel = RbfKernel::new(0.5);
        let x = SparseVector::new(vec![0, 1], vec![1.0, 2.0]);

        // Zero distance gives K = 1
        assert_relative_eq!(kernel.compute(&x, &x), 1.0);
    }

    #[test]
    fn test_rbf_known_distance() {
        let kernel = RbfKernel::new(1.0);
        let x = SparseVector::new(vec![0], vec![0.0]);
        let y = SparseVector::new(vec![0], vec![2.0]);

        // ||x - y||^2 = 4
        assert_relative_eq!(kernel.compute(&x, &y), (-4.0_f64).exp(), epsilon = 1e-12);
    }

    #[test]
    fn test_rbf_symmetry() {
        let kernel = RbfKernel::new(0.3);
        let x = SparseVector::new(vec![0, 2], vec![1.0, -1.0]);
        let y = SparseVector::new(vec![1, 2], vec![2.0, 0.5]);

        assert_relative_eq!(kernel.compute(&x, &y), kernel.compute(&y, &x));
    }

    #[test]
    #[should_panic(expected = "Gamma must be positive")]
    fn test_rbf_invalid_gamma() {
        RbfKernel::new(-1.0);
    }
}
