//! Core traits for multiclass SVM training

use crate::core::SparseVector;

/// Read-only multiclass dataset abstraction.
///
/// Labels must be contiguous zero-indexed class integers; this is validated
/// once before training begins, not silently remapped. Implementations are
/// shared across worker threads without locking, so access must be cheap and
/// side-effect free.
pub trait Dataset: Send + Sync {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Feature vector of sample `i`
    ///
    /// # Panics
    /// Panics if index >= len()
    fn feature(&self, i: usize) -> &SparseVector;

    /// Class label of sample `i`, in `[0, n_classes)`
    fn label(&self, i: usize) -> usize;

    /// Per-sample weight scaling the box bound to `C * weight`
    fn weight(&self, _i: usize) -> f64 {
        1.0
    }

    /// Whether a non-default weight array is present
    fn has_weights(&self) -> bool {
        false
    }

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
