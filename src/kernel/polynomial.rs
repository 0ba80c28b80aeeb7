//! Polynomial kernel implementation

use crate::core::SparseVector;
use crate::kernel::linear::dot_product_sparse;
use crate::kernel::Kernel;

/// Polynomial kernel: K(x, y) = (gamma * x.y + coef0)^degree
#[derive(Debug, Clone, Copy)]
pub struct PolynomialKernel {
    /// Scaling factor for the dot product
    pub gamma: f64,
    /// Independent term
    pub coef0: f64,
    /// Polynomial degree
    pub degree: u32,
}

impl PolynomialKernel {
    /// Create a new polynomial kernel
    ///
    /// # Panics
    /// Panics if degree is zero or gamma is not positive
    pub fn new(degree: u32, gamma: f64, coef0: f64) -> Self {
        assert!(degree > 0, "Polynomial degree must be positive");
        assert!(gamma > 0.0, "Gamma must be positive");
        Self {
            gamma,
            coef0,
            degree,
        }
    }

    /// Quadratic kernel: (x.y + 1)^2
    pub fn quadratic() -> Self {
        Self::new(2, 1.0, 1.0)
    }

    /// Cubic kernel: (x.y + 1)^3
    pub fn cubic() -> Self {
        Self::new(3, 1.0, 1.0)
    }
}

impl Kernel for PolynomialKernel {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        let base = self.gamma * dot_product_sparse(x, y) + self.coef0;
        base.powi(self.degree as i32)
    }
}
