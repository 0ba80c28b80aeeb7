//! High-level API for multiclass SVM training
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use msvm::api::Svm;
//! use msvm::data::LibSvmDataset;
//! use msvm::Dataset;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = LibSvmDataset::from_file("train.libsvm")?;
//!
//! let model = Svm::new()
//!     .with_c(1.0)
//!     .with_tolerance(0.001)
//!     .learn(&dataset)?;
//!
//! let label = model.classify(dataset.feature(0))?;
//! println!("predicted class {}", label);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    Dataset, Decomposition, MulticlassConfig, ProgressCallback, Result, TrainerFactory,
};
use crate::kernel::{Kernel, LinearKernel};
use crate::multiclass::{MulticlassModel, MulticlassTrainer};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Builder-style multiclass SVM interface
pub struct Svm<K: Kernel = LinearKernel> {
    kernel: K,
    config: MulticlassConfig,
}

impl Svm<LinearKernel> {
    /// Create a new SVM with linear kernel and default parameters
    pub fn new() -> Self {
        Self {
            kernel: LinearKernel::new(),
            config: MulticlassConfig::default(),
        }
    }
}

impl Default for Svm<LinearKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> Svm<K> {
    /// Create an SVM with a custom kernel
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            config: MulticlassConfig::default(),
        }
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.base.c = c;
        self
    }

    /// Set convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.config.base.tolerance = tolerance;
        self
    }

    /// Set maximum number of working-set iterations per subproblem
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.base.max_iterations = max_iterations;
        self
    }

    /// Set kernel cache size in bytes per subproblem
    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.config.base.cache_size = cache_size;
        self
    }

    /// Set the decomposition strategy
    pub fn with_decomposition(mut self, decomposition: Decomposition) -> Self {
        self.config.decomposition = decomposition;
        self
    }

    /// Bound the worker pool (0 = available hardware concurrency)
    pub fn with_max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.config.max_parallelism = max_parallelism;
        self
    }

    /// Fit Platt sigmoids per machine so the model can emit probabilities
    pub fn with_probabilities(mut self, calibrate: bool) -> Self {
        self.config.calibrate_probabilities = calibrate;
        self
    }

    /// Configure subproblems individually (per-pair hyperparameters or
    /// warm starts)
    pub fn with_trainer_factory(mut self, factory: TrainerFactory) -> Self {
        self.config.trainer_factory = Some(factory);
        self
    }

    /// Invoke a callback after each subproblem finishes
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.config.progress = Some(progress);
        self
    }

    /// Train on a dataset
    pub fn learn<D: Dataset>(self, dataset: &D) -> Result<MulticlassModel<K>> {
        MulticlassTrainer::new(self.kernel, self.config).learn(dataset)
    }

    /// Train with an external cancellation signal
    pub fn learn_cancellable<D: Dataset>(
        self,
        dataset: &D,
        cancel: Arc<AtomicBool>,
    ) -> Result<MulticlassModel<K>> {
        MulticlassTrainer::new(self.kernel, self.config).learn_cancellable(dataset, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseVector;
    use crate::data::VecDataset;

    fn two_class_line() -> VecDataset {
        VecDataset::new(
            vec![
                SparseVector::new(vec![0], vec![2.0]),
                SparseVector::new(vec![0], vec![1.5]),
                SparseVector::new(vec![0], vec![-1.5]),
                SparseVector::new(vec![0], vec![-2.0]),
            ],
            vec![0, 0, 1, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_builder_pattern() {
        let svm = Svm::new()
            .with_c(2.0)
            .with_tolerance(0.01)
            .with_max_iterations(5000)
            .with_decomposition(Decomposition::OneVsRest)
            .with_max_parallelism(2);

        assert_eq!(svm.config.base.c, 2.0);
        assert_eq!(svm.config.base.tolerance, 0.01);
        assert_eq!(svm.config.base.max_iterations, 5000);
        assert_eq!(svm.config.decomposition, Decomposition::OneVsRest);
        assert_eq!(svm.config.max_parallelism, 2);
    }

    #[test]
    fn test_learn_and_classify() {
        let dataset = two_class_line();
        let model = Svm::new().learn(&dataset).expect("training should succeed");

        assert_eq!(
            model
                .classify(&SparseVector::new(vec![0], vec![1.0]))
                .unwrap(),
            0
        );
        assert_eq!(
            model
                .classify(&SparseVector::new(vec![0], vec![-1.0]))
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_learn_with_probabilities() {
        let dataset = two_class_line();
        let model = Svm::new()
            .with_probabilities(true)
            .learn(&dataset)
            .expect("training should succeed");

        assert!(model.is_calibrated());
        let probs = model
            .predict_probabilities(&SparseVector::new(vec![0], vec![2.0]))
            .unwrap();
        assert!(probs[0] > probs[1]);
    }
}
