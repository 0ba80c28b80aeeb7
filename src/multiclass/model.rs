//! Aggregate multiclass model and decision combination
//!
//! Holds the trained binary machines in deterministic descriptor order and
//! turns their decision values into class labels, per-class scores, calibrated
//! probabilities or multilabel membership bits. Immutable after training and
//! safe to share across concurrent inference calls.

use crate::core::{Dataset, Decomposition, Result, SparseVector, SvmError};
use crate::kernel::Kernel;
use crate::multiclass::machine::BinaryMachine;
use std::sync::Arc;

/// Trained multiclass model: an ordered collection of binary machines plus
/// the combination strategy that produced them.
pub struct MulticlassModel<K: Kernel> {
    kernel: Arc<K>,
    machines: Vec<BinaryMachine>,
    decomposition: Decomposition,
    n_classes: usize,
}

impl<K: Kernel> MulticlassModel<K> {
    /// Assemble a model, verifying the machine list matches the strategy
    pub fn from_parts(
        kernel: Arc<K>,
        machines: Vec<BinaryMachine>,
        decomposition: Decomposition,
        n_classes: usize,
    ) -> Result<Self> {
        let expected = match decomposition {
            Decomposition::OneVsOne => n_classes * (n_classes - 1) / 2,
            Decomposition::OneVsRest => n_classes,
        };
        if machines.len() != expected {
            return Err(SvmError::InvalidArgument(format!(
                "expected {} machines for {:?} over {} classes, got {}",
                expected,
                decomposition,
                n_classes,
                machines.len()
            )));
        }
        Ok(Self {
            kernel,
            machines,
            decomposition,
            n_classes,
        })
    }

    fn ensure_trained(&self) -> Result<()> {
        if self.machines.is_empty() {
            return Err(SvmError::ModelNotTrained);
        }
        Ok(())
    }

    /// Exclusive classification: a single class label for the query.
    ///
    /// One-vs-one uses majority voting with ties broken by lowest class
    /// index; one-vs-rest picks the argmax raw score.
    pub fn classify(&self, x: &SparseVector) -> Result<usize> {
        self.ensure_trained()?;
        match self.decomposition {
            Decomposition::OneVsOne => {
                let mut votes = vec![0usize; self.n_classes];
                for machine in &self.machines {
                    let pair = machine.descriptor();
                    let decision = machine.decision_function(self.kernel.as_ref(), x);
                    match pair.negative {
                        Some(negative) if decision < 0.0 => votes[negative] += 1,
                        _ => votes[pair.positive] += 1,
                    }
                }
                Ok(argmax(&votes.iter().map(|&v| v as f64).collect::<Vec<_>>()))
            }
            Decomposition::OneVsRest => {
                let scores = self.score(x)?;
                Ok(argmax(&scores))
            }
        }
    }

    /// Per-class score vector.
    ///
    /// One-vs-one accumulates each machine's signed decision value into both
    /// participating classes; one-vs-rest reports each machine's raw score.
    pub fn score(&self, x: &SparseVector) -> Result<Vec<f64>> {
        self.ensure_trained()?;
        let mut scores = vec![0.0; self.n_classes];
        for machine in &self.machines {
            let pair = machine.descriptor();
            let decision = machine.decision_function(self.kernel.as_ref(), x);
            match pair.negative {
                Some(negative) => {
                    scores[pair.positive] += decision;
                    scores[negative] -= decision;
                }
                None => scores[pair.positive] = decision,
            }
        }
        Ok(scores)
    }

    /// Calibrated per-class probabilities, summing to 1.
    ///
    /// Requires training with `calibrate_probabilities`. One-vs-rest
    /// normalizes the per-class sigmoids; one-vs-one averages pairwise
    /// probabilities into both participating classes before normalizing.
    pub fn predict_probabilities(&self, x: &SparseVector) -> Result<Vec<f64>> {
        self.ensure_trained()?;
        if !self.is_calibrated() {
            return Err(SvmError::InvalidArgument(
                "model was trained without probability calibration".to_string(),
            ));
        }

        let mut acc = vec![0.0; self.n_classes];
        for machine in &self.machines {
            let pair = machine.descriptor();
            let Some(p) = machine.probability(self.kernel.as_ref(), x) else {
                continue;
            };
            match pair.negative {
                Some(negative) => {
                    acc[pair.positive] += p;
                    acc[negative] += 1.0 - p;
                }
                None => acc[pair.positive] = p,
            }
        }

        let total: f64 = acc.iter().sum();
        if total > 0.0 {
            for value in &mut acc {
                *value /= total;
            }
        } else {
            acc.fill(1.0 / self.n_classes as f64);
        }
        Ok(acc)
    }

    /// Multilabel membership bits, one per class (one-vs-rest only).
    ///
    /// Thresholds each machine independently at decision value 0, or at
    /// probability 0.5 when calibrated; no mutual exclusivity is enforced.
    pub fn predict_multilabel(&self, x: &SparseVector) -> Result<Vec<bool>> {
        self.ensure_trained()?;
        if self.decomposition != Decomposition::OneVsRest {
            return Err(SvmError::InvalidArgument(
                "multilabel prediction requires one-vs-rest decomposition".to_string(),
            ));
        }

        let mut bits = vec![false; self.n_classes];
        for machine in &self.machines {
            let class = machine.descriptor().positive;
            bits[class] = match machine.probability(self.kernel.as_ref(), x) {
                Some(p) => p >= 0.5,
                None => machine.decision_function(self.kernel.as_ref(), x) >= 0.0,
            };
        }
        Ok(bits)
    }

    /// Classification accuracy over a labeled dataset
    pub fn evaluate<D: Dataset>(&self, dataset: &D) -> Result<f64> {
        self.ensure_trained()?;
        if dataset.is_empty() {
            return Err(SvmError::InvalidArgument("empty dataset".to_string()));
        }
        let mut correct = 0;
        for i in 0..dataset.len() {
            if self.classify(dataset.feature(i))? == dataset.label(i) {
                correct += 1;
            }
        }
        Ok(correct as f64 / dataset.len() as f64)
    }

    /// Enumerable view of the trained binary machines, in descriptor order
    pub fn machines(&self) -> &[BinaryMachine] {
        &self.machines
    }

    /// Number of classes the model separates
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Decomposition strategy used during training
    pub fn decomposition(&self) -> Decomposition {
        self.decomposition
    }

    /// Shared kernel reference
    pub fn kernel(&self) -> &K {
        self.kernel.as_ref()
    }

    /// Whether every machine carries fitted sigmoid parameters
    pub fn is_calibrated(&self) -> bool {
        !self.machines.is_empty() && self.machines.iter().all(|m| m.calibration().is_some())
    }
}

/// Index of the largest value; strict comparison keeps the lowest index on ties
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
