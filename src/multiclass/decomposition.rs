//! Multiclass decomposition and parallel subproblem training
//!
//! Splits an n-class dataset into independent binary subproblems (one-vs-one
//! or one-vs-rest), trains them on a bounded rayon pool, and assembles the
//! finished machines into a [`MulticlassModel`]. The aggregate is only ever
//! observed fully trained: the first fatal error cancels outstanding work and
//! no partial model escapes.

use crate::core::{
    ClassPair, Dataset, Decomposition, MulticlassConfig, Result, SvmError,
};
use crate::kernel::Kernel;
use crate::multiclass::calibration::PlattScaling;
use crate::multiclass::machine::BinaryMachine;
use crate::multiclass::model::MulticlassModel;
use crate::solver::SmoSolver;
use log::{info, warn};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// One binary subproblem: dataset indices and derived `{-1,+1}` labels.
/// Feature vectors are never copied; only index lists are materialized.
#[derive(Debug, Clone)]
pub(crate) struct Subproblem {
    pub descriptor: ClassPair,
    pub indices: Vec<usize>,
    pub labels: Vec<f64>,
}

/// Validate the dataset and return the number of classes.
///
/// Labels must be contiguous zero-indexed integers with every class present;
/// anything else is a configuration error, not something to remap silently.
pub(crate) fn validate_dataset<D: Dataset>(dataset: &D) -> Result<usize> {
    if dataset.is_empty() {
        return Err(SvmError::InvalidArgument("empty dataset".to_string()));
    }

    let mut max_label = 0;
    for i in 0..dataset.len() {
        max_label = max_label.max(dataset.label(i));
        let w = dataset.weight(i);
        if !(w > 0.0) {
            return Err(SvmError::InvalidArgument(format!(
                "sample {} has non-positive weight {}",
                i, w
            )));
        }
    }

    let n_classes = max_label + 1;
    if n_classes < 2 {
        return Err(SvmError::InvalidArgument(
            "dataset must contain at least two classes".to_string(),
        ));
    }

    let mut seen = vec![false; n_classes];
    for i in 0..dataset.len() {
        seen[dataset.label(i)] = true;
    }
    if let Some(missing) = seen.iter().position(|&s| !s) {
        return Err(SvmError::InvalidArgument(format!(
            "labels are not contiguous: class {} has no samples (highest label is {})",
            missing, max_label
        )));
    }

    Ok(n_classes)
}

/// Build the subproblem list in deterministic descriptor order
pub(crate) fn build_subproblems<D: Dataset>(
    dataset: &D,
    n_classes: usize,
    decomposition: Decomposition,
) -> Vec<Subproblem> {
    match decomposition {
        Decomposition::OneVsOne => {
            let mut subproblems = Vec::with_capacity(n_classes * (n_classes - 1) / 2);
            for pos in 0..n_classes {
                for neg in (pos + 1)..n_classes {
                    let mut indices = Vec::new();
                    let mut labels = Vec::new();
                    for i in 0..dataset.len() {
                        let label = dataset.label(i);
                        if label == pos {
                            indices.push(i);
                            labels.push(1.0);
                        } else if label == neg {
                            indices.push(i);
                            labels.push(-1.0);
                        }
                    }
                    subproblems.push(Subproblem {
                        descriptor: ClassPair::one_vs_one(pos, neg),
                        indices,
                        labels,
                    });
                }
            }
            subproblems
        }
        Decomposition::OneVsRest => (0..n_classes)
            .map(|pos| {
                let indices: Vec<usize> = (0..dataset.len()).collect();
                let labels: Vec<f64> = indices
                    .iter()
                    .map(|&i| if dataset.label(i) == pos { 1.0 } else { -1.0 })
                    .collect();
                Subproblem {
                    descriptor: ClassPair::one_vs_rest(pos),
                    indices,
                    labels,
                }
            })
            .collect(),
    }
}

/// Coordinates decomposition, parallel training and model assembly
pub struct MulticlassTrainer<K: Kernel> {
    kernel: Arc<K>,
    config: MulticlassConfig,
}

impl<K: Kernel> MulticlassTrainer<K> {
    /// Create a trainer with the given kernel and configuration
    pub fn new(kernel: K, config: MulticlassConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
        }
    }

    /// Train a multiclass model on the dataset
    pub fn learn<D: Dataset>(&self, dataset: &D) -> Result<MulticlassModel<K>> {
        self.learn_cancellable(dataset, Arc::new(AtomicBool::new(false)))
    }

    /// Train with an external cancellation signal.
    ///
    /// The flag is checked at dispatch granularity and once per working-set
    /// iteration inside each solver; setting it aborts in-flight subproblems
    /// promptly and surfaces [`SvmError::Cancelled`].
    pub fn learn_cancellable<D: Dataset>(
        &self,
        dataset: &D,
        cancel: Arc<AtomicBool>,
    ) -> Result<MulticlassModel<K>> {
        // Fail fast before any subproblem is dispatched
        let n_classes = validate_dataset(dataset)?;
        if !(self.config.base.c > 0.0) || !(self.config.base.tolerance > 0.0) {
            return Err(SvmError::InvalidArgument(format!(
                "C and tolerance must be positive (got C={}, tolerance={})",
                self.config.base.c, self.config.base.tolerance
            )));
        }

        let subproblems = build_subproblems(dataset, n_classes, self.config.decomposition);
        info!(
            "training {} binary subproblems ({:?}, {} classes, {} samples)",
            subproblems.len(),
            self.config.decomposition,
            n_classes,
            dataset.len()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_parallelism)
            .build()
            .map_err(|e| SvmError::InvalidArgument(format!("failed to build worker pool: {e}")))?;

        let completed = AtomicUsize::new(0);
        let results: Vec<Result<BinaryMachine>> = pool.install(|| {
            subproblems
                .par_iter()
                .map(|subproblem| {
                    if cancel.load(Ordering::Relaxed) {
                        return Err(SvmError::Cancelled);
                    }
                    let outcome = self.train_subproblem(dataset, subproblem, &cancel);
                    match &outcome {
                        Ok(_) => {
                            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                            if let Some(callback) = &self.config.progress {
                                callback(&subproblem.descriptor, done);
                            }
                        }
                        // A fatal error cancels the remaining siblings
                        Err(SvmError::Cancelled) => {}
                        Err(_) => cancel.store(true, Ordering::Relaxed),
                    }
                    outcome
                })
                .collect()
        });

        // The join barrier above guarantees no worker still runs here.
        // Prefer the first fatal error in subproblem order; a run that only
        // saw cancellations was cancelled externally.
        let mut machines = Vec::with_capacity(results.len());
        let mut cancelled = false;
        for result in results {
            match result {
                Ok(machine) => machines.push(machine),
                Err(SvmError::Cancelled) => cancelled = true,
                Err(fatal) => return Err(fatal),
            }
        }
        if cancelled {
            return Err(SvmError::Cancelled);
        }

        for machine in &machines {
            if !machine.converged() {
                warn!(
                    "subproblem {} hit its iteration budget without reaching tolerance",
                    machine.descriptor()
                );
            }
        }

        MulticlassModel::from_parts(
            Arc::clone(&self.kernel),
            machines,
            self.config.decomposition,
            n_classes,
        )
    }

    fn train_subproblem<D: Dataset>(
        &self,
        dataset: &D,
        subproblem: &Subproblem,
        cancel: &AtomicBool,
    ) -> Result<BinaryMachine> {
        let features: Vec<&crate::core::SparseVector> = subproblem
            .indices
            .iter()
            .map(|&i| dataset.feature(i))
            .collect();
        let weights: Option<Vec<f64>> = if dataset.has_weights() {
            Some(subproblem.indices.iter().map(|&i| dataset.weight(i)).collect())
        } else {
            None
        };

        let config = self.config.config_for(&subproblem.descriptor);
        let solver = SmoSolver::new(Arc::clone(&self.kernel), config);
        let result =
            solver.solve_cancellable(&features, &subproblem.labels, weights.as_deref(), cancel)?;

        let mut machine =
            BinaryMachine::from_result(subproblem.descriptor, &features, &subproblem.labels, &result);

        if self.config.calibrate_probabilities {
            let decisions: Vec<f64> = features
                .iter()
                .map(|x| machine.decision_function(self.kernel.as_ref(), x))
                .collect();
            machine.set_calibration(PlattScaling::fit(&decisions, &subproblem.labels)?);
        }

        Ok(machine)
    }
}
