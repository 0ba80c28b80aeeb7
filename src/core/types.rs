//! Core type definitions for multiclass SVM training

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Sparse vector representation with sorted indices
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    /// Sorted indices of non-zero elements
    pub indices: Vec<usize>,
    /// Values corresponding to indices
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Create a new sparse vector, ensuring indices are sorted
    pub fn new(indices: Vec<usize>, values: Vec<f64>) -> Self {
        assert_eq!(
            indices.len(),
            values.len(),
            "Indices and values must have same length"
        );

        // Sort by indices
        let mut pairs: Vec<_> = indices.into_iter().zip(values).collect();
        pairs.sort_by_key(|&(idx, _)| idx);

        let (indices, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    /// Create an empty sparse vector
    pub fn empty() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Get the value at a specific index (0 if not present)
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Compute squared L2 norm
    pub fn norm_squared(&self) -> f64 {
        self.values.iter().map(|&v| v * v).sum()
    }

    /// Compute L2 norm
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Number of non-zero elements
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Check if vector is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Identifies the binary subproblem a machine was trained on.
///
/// `negative == None` means the machine separates `positive` from the rest
/// of the classes (one-vs-rest); otherwise it separates `positive` (labeled
/// +1) from `negative` (labeled -1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassPair {
    /// Class index relabeled +1
    pub positive: usize,
    /// Class index relabeled -1, or None for "rest"
    pub negative: Option<usize>,
}

impl ClassPair {
    /// One-vs-one pair: `positive` against `negative`
    pub fn one_vs_one(positive: usize, negative: usize) -> Self {
        Self {
            positive,
            negative: Some(negative),
        }
    }

    /// One-vs-rest pair: `positive` against every other class
    pub fn one_vs_rest(positive: usize) -> Self {
        Self {
            positive,
            negative: None,
        }
    }
}

impl fmt::Display for ClassPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.negative {
            Some(neg) => write!(f, "{} vs {}", self.positive, neg),
            None => write!(f, "{} vs rest", self.positive),
        }
    }
}

/// Multiclass decomposition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decomposition {
    /// One binary machine per unordered class pair, k*(k-1)/2 total
    OneVsOne,
    /// One binary machine per class against all others, k total
    OneVsRest,
}

/// Result of one binary dual optimization
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Lagrange multipliers (alpha values), one per subproblem sample
    pub alpha: Vec<f64>,
    /// Bias term (b)
    pub b: f64,
    /// Indices of support vectors (where alpha exceeds the retention threshold)
    pub support_vectors: Vec<usize>,
    /// Number of working-set iterations performed
    pub iterations: usize,
    /// Whether the KKT violation dropped below tolerance within the budget
    pub converged: bool,
}

/// Configuration for one binary subproblem's optimizer
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Stopping tolerance on the maximal KKT violation
    pub tolerance: f64,
    /// Maximum number of working-set iterations
    pub max_iterations: usize,
    /// Kernel cache size in bytes
    pub cache_size: usize,
    /// Optional warm-start alpha vector, one entry per subproblem sample
    pub warm_start: Option<Vec<f64>>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            tolerance: 0.001,
            max_iterations: 10000,
            cache_size: 100_000_000, // 100MB
            warm_start: None,
        }
    }
}

/// Per-subproblem trainer configuration hook.
///
/// Called once per subproblem descriptor before dispatch, allowing different
/// hyperparameters (or warm starts) per class pair.
pub type TrainerFactory = Arc<dyn Fn(&ClassPair) -> OptimizerConfig + Send + Sync>;

/// Callback invoked after each subproblem finishes training.
///
/// Arguments are the finished subproblem's descriptor and the number of
/// subproblems completed so far.
pub type ProgressCallback = Arc<dyn Fn(&ClassPair, usize) + Send + Sync>;

/// Configuration for a full multiclass training run
#[derive(Clone)]
pub struct MulticlassConfig {
    /// Base optimizer configuration, used when no trainer factory is set
    pub base: OptimizerConfig,
    /// Decomposition strategy
    pub decomposition: Decomposition,
    /// Maximum number of worker threads (0 = available hardware concurrency)
    pub max_parallelism: usize,
    /// Fit Platt sigmoids per machine after training
    pub calibrate_probabilities: bool,
    /// Optional per-subproblem configuration hook
    pub trainer_factory: Option<TrainerFactory>,
    /// Optional completion callback
    pub progress: Option<ProgressCallback>,
}

impl Default for MulticlassConfig {
    fn default() -> Self {
        Self {
            base: OptimizerConfig::default(),
            decomposition: Decomposition::OneVsOne,
            max_parallelism: 0,
            calibrate_probabilities: false,
            trainer_factory: None,
            progress: None,
        }
    }
}

impl fmt::Debug for MulticlassConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MulticlassConfig")
            .field("base", &self.base)
            .field("decomposition", &self.decomposition)
            .field("max_parallelism", &self.max_parallelism)
            .field("calibrate_probabilities", &self.calibrate_probabilities)
            .field("trainer_factory", &self.trainer_factory.is_some())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl MulticlassConfig {
    /// Resolve the optimizer configuration for one subproblem
    pub fn config_for(&self, pair: &ClassPair) -> OptimizerConfig {
        match &self.trainer_factory {
            Some(factory) => factory(pair),
            None => self.base.clone(),
        }
    }
}
