//! Kernel functions consumed by the trainer
//!
//! Kernels are opaque collaborators: the trainer only relies on the
//! `K(x, y) -> f64` contract in [`Kernel`].

pub mod linear;
pub mod polynomial;
pub mod rbf;
pub mod traits;

pub use self::linear::*;
pub use self::polynomial::*;
pub use self::rbf::*;
pub use self::traits::*;

use crate::core::SparseVector;
use serde::{Deserialize, Serialize};

/// Serializable kernel description, used by model persistence and the CLI.
///
/// Dispatches to the concrete kernel implementations; parameters round-trip
/// through the saved model file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KernelSpec {
    Linear,
    Rbf { gamma: f64 },
    Polynomial { degree: u32, gamma: f64, coef0: f64 },
}

impl Default for KernelSpec {
    fn default() -> Self {
        Self::Linear
    }
}

impl Kernel for KernelSpec {
    fn compute(&self, x: &SparseVector, y: &SparseVector) -> f64 {
        match *self {
            KernelSpec::Linear => LinearKernel::new().compute(x, y),
            KernelSpec::Rbf { gamma } => RbfKernel::new(gamma).compute(x, y),
            KernelSpec::Polynomial {
                degree,
                gamma,
                coef0,
            } => PolynomialKernel::new(degree, gamma, coef0).compute(x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_spec_dispatch() {
        let x = SparseVector::new(vec![0], vec![2.0]);
        let y = SparseVector::new(vec![0], vec![3.0]);

        assert_eq!(KernelSpec::Linear.compute(&x, &y), 6.0);
        assert_eq!(
            KernelSpec::Polynomial {
                degree: 2,
                gamma: 1.0,
                coef0: 1.0
            }
            .compute(&x, &y),
            49.0
        );
    }

    #[test]
    fn test_kernel_spec_serde_round_trip() {
        let spec = KernelSpec::Rbf { gamma: 0.25 };
        let json = serde_json::to_string(&spec).unwrap();
        let back: KernelSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
    }
}
