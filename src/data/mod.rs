//! Dataset implementations
//!
//! The trainer consumes datasets only through the [`Dataset`] trait; this
//! module provides an in-memory implementation and a LibSVM-format loader.

pub mod libsvm;

pub use self::libsvm::*;

use crate::core::{Dataset, Result, SparseVector, SvmError};

/// In-memory dataset of sparse feature vectors with integer class labels
/// and an optional parallel weight array.
#[derive(Debug, Clone)]
pub struct VecDataset {
    features: Vec<SparseVector>,
    labels: Vec<usize>,
    weights: Option<Vec<f64>>,
}

impl VecDataset {
    /// Create a dataset from features and labels
    pub fn new(features: Vec<SparseVector>, labels: Vec<usize>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(SvmError::InvalidArgument(format!(
                "feature count {} does not match label count {}",
                features.len(),
                labels.len()
            )));
        }
        Ok(Self {
            features,
            labels,
            weights: None,
        })
    }

    /// Create a dataset with per-sample weights
    pub fn with_weights(
        features: Vec<SparseVector>,
        labels: Vec<usize>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        if weights.len() != features.len() {
            return Err(SvmError::InvalidArgument(format!(
                "weight count {} does not match sample count {}",
                weights.len(),
                features.len()
            )));
        }
        let mut dataset = Self::new(features, labels)?;
        dataset.weights = Some(weights);
        Ok(dataset)
    }

    /// All labels, in sample order
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }
}

impl Dataset for VecDataset {
    fn len(&self) -> usize {
        self.features.len()
    }

    fn feature(&self, i: usize) -> &SparseVector {
        &self.features[i]
    }

    fn label(&self, i: usize) -> usize {
        self.labels[i]
    }

    fn weight(&self, i: usize) -> f64 {
        match &self.weights {
            Some(w) => w[i],
            None => 1.0,
        }
    }

    fn has_weights(&self) -> bool {
        self.weights.is_some()
    }
}
