//! Trained binary kernel machine

use crate::core::{ClassPair, OptimizationResult, SparseVector};
use crate::kernel::Kernel;
use crate::multiclass::calibration::PlattScaling;
use serde::{Deserialize, Serialize};

/// One trained binary decision function, immutable once built.
///
/// Only support vectors (samples whose alpha exceeds the retention threshold)
/// are kept; coefficients store `alpha_i * y_i` so the decision function is a
/// plain weighted kernel sum plus bias. The kernel itself is shared at the
/// aggregate-model level rather than stored per machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryMachine {
    descriptor: ClassPair,
    support_vectors: Vec<SparseVector>,
    coefficients: Vec<f64>,
    bias: f64,
    converged: bool,
    iterations: usize,
    calibration: Option<PlattScaling>,
}

impl BinaryMachine {
    /// Build a machine from a subproblem's samples and its optimization result
    pub(crate) fn from_result(
        descriptor: ClassPair,
        features: &[&SparseVector],
        labels: &[f64],
        result: &OptimizationResult,
    ) -> Self {
        let mut support_vectors = Vec::with_capacity(result.support_vectors.len());
        let mut coefficients = Vec::with_capacity(result.support_vectors.len());

        for &sv in &result.support_vectors {
            support_vectors.push(features[sv].clone());
            coefficients.push(result.alpha[sv] * labels[sv]);
        }

        Self {
            descriptor,
            support_vectors,
            coefficients,
            bias: result.b,
            converged: result.converged,
            iterations: result.iterations,
            calibration: None,
        }
    }

    pub(crate) fn set_calibration(&mut self, calibration: PlattScaling) {
        self.calibration = Some(calibration);
    }

    /// Raw decision value `sum(alpha_i * y_i * K(x_i, x)) + b`
    pub fn decision_function<K: Kernel>(&self, kernel: &K, x: &SparseVector) -> f64 {
        let mut result = self.bias;
        for (sv, &coef) in self.support_vectors.iter().zip(self.coefficients.iter()) {
            result += coef * kernel.compute(sv, x);
        }
        result
    }

    /// Calibrated probability of the positive class, if a sigmoid was fitted
    pub fn probability<K: Kernel>(&self, kernel: &K, x: &SparseVector) -> Option<f64> {
        self.calibration
            .as_ref()
            .map(|platt| platt.probability(self.decision_function(kernel, x)))
    }

    /// Which classes this machine separates
    pub fn descriptor(&self) -> ClassPair {
        self.descriptor
    }

    /// Number of retained support vectors
    pub fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    /// Coefficients `alpha_i * y_i`, parallel to the support vectors
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Retained support vectors
    pub fn support_vectors(&self) -> &[SparseVector] {
        &self.support_vectors
    }

    /// Bias term
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Whether the optimizer reached tolerance within its iteration budget
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Working-set iterations spent on this subproblem
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Fitted sigmoid parameters, if probability calibration was requested
    pub fn calibration(&self) -> Option<&PlattScaling> {
        self.calibration.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::LinearKernel;
    use approx::assert_relative_eq;

    fn machine_from_two_svs() -> BinaryMachine {
        let a = SparseVector::new(vec![0], vec![1.0]);
        let b = SparseVector::new(vec![0], vec![-1.0]);
        let features = [&a, &b];
        let labels = [1.0, -1.0];
        let result = OptimizationResult {
            alpha: vec![0.5, 0.5],
            b: 0.0,
            support_vectors: vec![0, 1],
            iterations: 3,
            converged: true,
        };
        BinaryMachine::from_result(ClassPair::one_vs_one(0, 1), &features, &labels, &result)
    }

    #[test]
    fn test_decision_function() {
        let machine = machine_from_two_svs();
        let kernel = LinearKernel::new();

        // f(x) = 0.5*K(1,x) - 0.5*K(-1,x) = x
        let x = SparseVector::new(vec![0], vec![2.0]);
        assert_relative_eq!(machine.decision_function(&kernel, &x), 2.0);

        let y = SparseVector::new(vec![0], vec![-3.0]);
        assert_relative_eq!(machine.decision_function(&kernel, &y), -3.0);
    }

    #[test]
    fn test_only_support_vectors_retained() {
        let a = SparseVector::new(vec![0], vec![1.0]);
        let b = SparseVector::new(vec![0], vec![-1.0]);
        let c = SparseVector::new(vec![0], vec![5.0]);
        let features = [&a, &b, &c];
        let labels = [1.0, -1.0, 1.0];
        let result = OptimizationResult {
            alpha: vec![0.5, 0.5, 0.0],
            b: 0.1,
            support_vectors: vec![0, 1],
            iterations: 1,
            converged: true,
        };

        let machine =
            BinaryMachine::from_result(ClassPair::one_vs_rest(0), &features, &labels, &result);
        assert_eq!(machine.n_support_vectors(), 2);
        assert_eq!(machine.coefficients(), &[0.5, -0.5]);
    }

    #[test]
    fn test_probability_requires_calibration() {
        let mut machine = machine_from_two_svs();
        let kernel = LinearKernel::new();
        let x = SparseVector::new(vec![0], vec![1.0]);

        assert!(machine.probability(&kernel, &x).is_none());

        machine.set_calibration(PlattScaling { a: -2.0, b: 0.0 });
        let p = machine.probability(&kernel, &x).unwrap();
        assert!(p > 0.5);
    }
}
