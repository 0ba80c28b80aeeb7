//! Sequential Minimal Optimization (SMO) solver
//!
//! Solves the two-class dual problem
//!
//!   min_a  1/2 a^T Q a - e^T a,   s.t.  y^T a = 0,  0 <= a_i <= C_i
//!
//! where Q_ij = y_i y_j K(x_i, x_j), by repeatedly picking the maximal
//! violating pair (first-order selection over the dual gradient) and solving
//! the two-variable subproblem in closed form.

use crate::cache::KernelCache;
use crate::core::{OptimizationResult, OptimizerConfig, Result, SvmError};
use crate::kernel::Kernel;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Alphas below this absolute threshold are treated as zero and their samples
/// dropped from the support set.
pub const SV_THRESHOLD: f64 = 1e-12;

/// Curvature floor for degenerate two-variable subproblems
const TAU: f64 = 1e-12;

/// Absolute tolerance on the equality constraint `sum(alpha_i * y_i) == 0`,
/// scaled by the total alpha mass.
const FEASIBILITY_TOL: f64 = 1e-6;

/// SMO solver for one binary subproblem.
///
/// Owns no shared state: the alpha vector, gradient and kernel cache live for
/// a single `solve` call and are never visible to other threads.
pub struct SmoSolver<K: Kernel> {
    kernel: Arc<K>,
    config: OptimizerConfig,
}

impl<K: Kernel> SmoSolver<K> {
    /// Create a new solver with the given kernel and configuration
    pub fn new(kernel: Arc<K>, config: OptimizerConfig) -> Self {
        Self { kernel, config }
    }

    /// Solve the dual problem for the given binary-labeled samples.
    ///
    /// `features` are borrowed views into the caller's dataset, `labels` must
    /// be -1.0 or +1.0, and `weights` (if present) scale each sample's box
    /// bound to `C * w_i`.
    pub fn solve(
        &self,
        features: &[&crate::core::SparseVector],
        labels: &[f64],
        weights: Option<&[f64]>,
    ) -> Result<OptimizationResult> {
        let cancel = AtomicBool::new(false);
        self.solve_cancellable(features, labels, weights, &cancel)
    }

    /// Solve with a cooperative cancellation flag, checked once per
    /// working-set iteration.
    pub fn solve_cancellable(
        &self,
        features: &[&crate::core::SparseVector],
        labels: &[f64],
        weights: Option<&[f64]>,
        cancel: &AtomicBool,
    ) -> Result<OptimizationResult> {
        let n = features.len();
        self.validate(n, labels, weights)?;

        // Per-sample box bounds C_i = C * w_i
        let bounds: Vec<f64> = match weights {
            Some(w) => w.iter().map(|&wi| self.config.c * wi).collect(),
            None => vec![self.config.c; n],
        };

        let mut cache = KernelCache::with_memory_limit(self.config.cache_size);
        let mut row_i = vec![0.0; n];
        let mut row_j = vec![0.0; n];

        // alpha = 0 puts the dual gradient at -e; a warm start reconstructs
        // the gradient from the seeded alphas instead.
        let mut alpha = vec![0.0; n];
        let mut gradient = vec![-1.0; n];
        if let Some(seed) = &self.config.warm_start {
            self.apply_warm_start(
                seed, &bounds, features, labels, &mut alpha, &mut gradient, &mut cache, &mut row_i,
            )?;
        }

        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.config.max_iterations {
            if cancel.load(Ordering::Relaxed) {
                return Err(SvmError::Cancelled);
            }

            // First-order working-set selection: i maximizes -y_i g_i over
            // samples that can increase, j minimizes it over samples that can
            // decrease. Their difference is the maximal KKT violation.
            let mut g_max = f64::NEG_INFINITY;
            let mut g_min = f64::INFINITY;
            let mut best_i = None;
            let mut best_j = None;

            for t in 0..n {
                let y_t = labels[t];
                let v = -y_t * gradient[t];

                let can_increase = (y_t > 0.0 && alpha[t] < bounds[t]) || (y_t < 0.0 && alpha[t] > 0.0);
                let can_decrease = (y_t > 0.0 && alpha[t] > 0.0) || (y_t < 0.0 && alpha[t] < bounds[t]);

                if can_increase && v > g_max {
                    g_max = v;
                    best_i = Some(t);
                }
                if can_decrease && v < g_min {
                    g_min = v;
                    best_j = Some(t);
                }
            }

            if g_max - g_min < self.config.tolerance {
                converged = true;
                break;
            }

            let (i, j) = match (best_i, best_j) {
                (Some(i), Some(j)) => (i, j),
                // One of the index sets is empty: nothing movable remains.
                _ => {
                    converged = true;
                    break;
                }
            };

            self.kernel_row(&mut cache, features, i, &mut row_i)?;
            self.kernel_row(&mut cache, features, j, &mut row_j)?;

            // Closed-form step along the feasible direction: a_i moves by
            // +y_i*d, a_j by -y_j*d, which preserves y^T a exactly. The
            // curvature along that direction is K_ii + K_jj - 2K_ij for
            // either label combination.
            let quad = row_i[i] + row_j[j] - 2.0 * row_i[j];
            let mut step = (g_max - g_min) / quad.max(TAU);

            // Clip so both variables stay inside their boxes
            step = step.min(if labels[i] > 0.0 {
                bounds[i] - alpha[i]
            } else {
                alpha[i]
            });
            step = step.min(if labels[j] > 0.0 {
                alpha[j]
            } else {
                bounds[j] - alpha[j]
            });

            if step <= 0.0 {
                // Selected pair has no feasible movement left; treat as
                // converged rather than spinning.
                converged = true;
                break;
            }

            alpha[i] = (alpha[i] + labels[i] * step).clamp(0.0, bounds[i]);
            alpha[j] = (alpha[j] - labels[j] * step).clamp(0.0, bounds[j]);

            // Incremental gradient update from the two changed variables
            for t in 0..n {
                gradient[t] += labels[t] * step * (row_i[t] - row_j[t]);
            }

            iterations += 1;
        }

        if !converged {
            warn!(
                "SMO hit iteration budget ({}) before reaching tolerance {}",
                self.config.max_iterations, self.config.tolerance
            );
        }

        self.check_dual_feasibility(&alpha, labels)?;

        let b = self.calculate_bias(&alpha, &gradient, labels, &bounds);

        let support_vectors: Vec<usize> = (0..n).filter(|&t| alpha[t] > SV_THRESHOLD).collect();

        debug!(
            "SMO finished: {} iterations, {} support vectors, converged={}",
            iterations,
            support_vectors.len(),
            converged
        );

        Ok(OptimizationResult {
            alpha,
            b,
            support_vectors,
            iterations,
            converged,
        })
    }

    fn validate(&self, n: usize, labels: &[f64], weights: Option<&[f64]>) -> Result<()> {
        if n == 0 {
            return Err(SvmError::InvalidArgument("empty subproblem".to_string()));
        }
        if labels.len() != n {
            return Err(SvmError::InvalidArgument(format!(
                "label count {} does not match sample count {}",
                labels.len(),
                n
            )));
        }
        for &y in labels {
            if y != 1.0 && y != -1.0 {
                return Err(SvmError::InvalidArgument(format!(
                    "binary label must be -1 or +1, got {}",
                    y
                )));
            }
        }
        if let Some(w) = weights {
            if w.len() != n {
                return Err(SvmError::InvalidArgument(format!(
                    "weight count {} does not match sample count {}",
                    w.len(),
                    n
                )));
            }
            if w.iter().any(|&wi| !(wi > 0.0)) {
                return Err(SvmError::InvalidArgument(
                    "sample weights must be positive".to_string(),
                ));
            }
        }
        if !(self.config.c > 0.0) {
            return Err(SvmError::InvalidArgument(format!(
                "C must be positive, got {}",
                self.config.c
            )));
        }
        if !(self.config.tolerance > 0.0) {
            return Err(SvmError::InvalidArgument(format!(
                "tolerance must be positive, got {}",
                self.config.tolerance
            )));
        }
        Ok(())
    }

    /// Fill `row` with K(x_i, x_t) for all t, rejecting non-finite values
    fn kernel_row(
        &self,
        cache: &mut KernelCache,
        features: &[&crate::core::SparseVector],
        i: usize,
        row: &mut [f64],
    ) -> Result<()> {
        for t in 0..features.len() {
            let value = cache.get_or_compute(i, t, || self.kernel.compute(features[i], features[t]));
            if !value.is_finite() {
                return Err(SvmError::NumericalFailure(format!(
                    "kernel returned non-finite value {} for sample pair ({}, {})",
                    value, i, t
                )));
            }
            row[t] = value;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_warm_start(
        &self,
        seed: &[f64],
        bounds: &[f64],
        features: &[&crate::core::SparseVector],
        labels: &[f64],
        alpha: &mut [f64],
        gradient: &mut [f64],
        cache: &mut KernelCache,
        row: &mut [f64],
    ) -> Result<()> {
        let n = features.len();
        if seed.len() != n {
            return Err(SvmError::InvalidArgument(format!(
                "warm-start alpha length {} does not match sample count {}",
                seed.len(),
                n
            )));
        }

        for t in 0..n {
            alpha[t] = seed[t].clamp(0.0, bounds[t]);
        }

        // g = Q a - e, built one kernel row at a time
        for s in 0..n {
            if alpha[s] <= SV_THRESHOLD {
                continue;
            }
            self.kernel_row(cache, features, s, row)?;
            for t in 0..n {
                gradient[t] += labels[t] * labels[s] * alpha[s] * row[t];
            }
        }
        Ok(())
    }

    /// Check the equality constraint `sum(alpha_i * y_i) == 0` within
    /// tolerance; violation indicates a kernel or data pathology.
    fn check_dual_feasibility(&self, alpha: &[f64], labels: &[f64]) -> Result<()> {
        let balance: f64 = alpha.iter().zip(labels).map(|(&a, &y)| a * y).sum();
        let mass: f64 = alpha.iter().sum();
        if balance.abs() > FEASIBILITY_TOL * mass.max(1.0) {
            return Err(SvmError::NumericalFailure(format!(
                "dual feasibility violated: |sum(alpha_i * y_i)| = {:e}",
                balance.abs()
            )));
        }
        Ok(())
    }

    /// Bias from free vectors (`0 < alpha_i < C_i`), where KKT gives
    /// `b = -y_i * g_i` exactly; falls back to all support vectors.
    fn calculate_bias(&self, alpha: &[f64], gradient: &[f64], labels: &[f64], bounds: &[f64]) -> f64 {
        let mut sum = 0.0;
        let mut count = 0;

        for t in 0..alpha.len() {
            if alpha[t] > SV_THRESHOLD && alpha[t] < bounds[t] - SV_THRESHOLD {
                sum += -labels[t] * gradient[t];
                count += 1;
            }
        }

        if count == 0 {
            for t in 0..alpha.len() {
                if alpha[t] > SV_THRESHOLD {
                    sum += -labels[t] * gradient[t];
                    count += 1;
                }
            }
        }

        if count > 0 {
            sum / count as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SparseVector;
    use crate::kernel::{Kernel, LinearKernel};
    use approx::assert_relative_eq;

    fn solver(config: OptimizerConfig) -> SmoSolver<LinearKernel> {
        SmoSolver::new(Arc::new(LinearKernel::new()), config)
    }

    fn decision(
        features: &[&SparseVector],
        labels: &[f64],
        result: &OptimizationResult,
        x: &SparseVector,
    ) -> f64 {
        let kernel = LinearKernel::new();
        let mut f = result.b;
        for &sv in &result.support_vectors {
            f += result.alpha[sv] * labels[sv] * kernel.compute(features[sv], x);
        }
        f
    }

    fn one_d(v: f64) -> SparseVector {
        SparseVector::new(vec![0], vec![v])
    }

    #[test]
    fn test_separable_two_points() {
        let features = [one_d(2.0), one_d(-2.0)];
        let refs: Vec<&SparseVector> = features.iter().collect();
        let labels = [1.0, -1.0];

        let result = solver(OptimizerConfig::default())
            .solve(&refs, &labels, None)
            .expect("should solve");

        assert!(result.converged);
        assert_eq!(result.support_vectors.len(), 2);
        // Equality constraint couples the two alphas
        assert_relative_eq!(result.alpha[0], result.alpha[1], epsilon = 1e-9);

        // Zero training error
        assert!(decision(&refs, &labels, &result, &one_d(2.0)) > 0.0);
        assert!(decision(&refs, &labels, &result, &one_d(-2.0)) < 0.0);
    }

    #[test]
    fn test_dual_feasibility_holds() {
        let features = [one_d(2.0), one_d(1.5), one_d(-1.5), one_d(-2.0), one_d(0.5)];
        let refs: Vec<&SparseVector> = features.iter().collect();
        let labels = [1.0, 1.0, -1.0, -1.0, 1.0];

        let result = solver(OptimizerConfig::default())
            .solve(&refs, &labels, None)
            .expect("should solve");

        let balance: f64 = result
            .alpha
            .iter()
            .zip(labels.iter())
            .map(|(&a, &y)| a * y)
            .sum();
        assert!(balance.abs() < 1e-6);
    }

    #[test]
    fn test_alphas_respect_box() {
        let config = OptimizerConfig {
            c: 0.3,
            ..OptimizerConfig::default()
        };
        // Overlapping classes force alphas to the bound
        let features = [one_d(1.0), one_d(-1.0), one_d(-0.5), one_d(0.5)];
        let refs: Vec<&SparseVector> = features.iter().collect();
        let labels = [1.0, 1.0, -1.0, -1.0];

        let result = solver(config).solve(&refs, &labels, None).expect("should solve");
        for &a in &result.alpha {
            assert!(a >= 0.0 && a <= 0.3 + 1e-12);
        }
    }

    #[test]
    fn test_per_sample_weights_scale_bounds() {
        let config = OptimizerConfig {
            c: 1.0,
            ..OptimizerConfig::default()
        };
        let features = [one_d(1.0), one_d(-1.0), one_d(-0.5), one_d(0.5)];
        let refs: Vec<&SparseVector> = features.iter().collect();
        let labels = [1.0, 1.0, -1.0, -1.0];
        let weights = [0.1, 0.1, 0.1, 0.1];

        let result = solver(config)
            .solve(&refs, &labels, Some(&weights))
            .expect("should solve");
        for &a in &result.alpha {
            assert!(a <= 0.1 + 1e-12);
        }
    }

    #[test]
    fn test_iteration_budget_reports_unconverged() {
        let config = OptimizerConfig {
            max_iterations: 1,
            tolerance: 1e-9,
            ..OptimizerConfig::default()
        };
        let features = [one_d(1.0), one_d(0.9), one_d(-0.9), one_d(-1.0)];
        let refs: Vec<&SparseVector> = features.iter().collect();
        let labels = [1.0, 1.0, -1.0, -1.0];

        let result = solver(config).solve(&refs, &labels, None).expect("should solve");
        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_cancellation_aborts() {
        let features = [one_d(1.0), one_d(-1.0)];
        let refs: Vec<&SparseVector> = features.iter().collect();
        let labels = [1.0, -1.0];
        let cancel = AtomicBool::new(true);

        let result =
            solver(OptimizerConfig::default()).solve_cancellable(&refs, &labels, None, &cancel);
        assert!(matches!(result, Err(SvmError::Cancelled)));
    }

    #[test]
    fn test_invalid_labels_rejected() {
        let features = [one_d(1.0)];
        let refs: Vec<&SparseVector> = features.iter().collect();

        let result = solver(OptimizerConfig::default()).solve(&refs, &[0.5], None);
        assert!(matches!(result, Err(SvmError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_subproblem_rejected() {
        let result = solver(OptimizerConfig::default()).solve(&[], &[], None);
        assert!(matches!(result, Err(SvmError::InvalidArgument(_))));
    }

    #[test]
    fn test_non_positive_c_rejected() {
        let config = OptimizerConfig {
            c: 0.0,
            ..OptimizerConfig::default()
        };
        let features = [one_d(1.0), one_d(-1.0)];
        let refs: Vec<&SparseVector> = features.iter().collect();

        let result = solver(config).solve(&refs, &[1.0, -1.0], None);
        assert!(matches!(result, Err(SvmError::InvalidArgument(_))));
    }

    #[test]
    fn test_nan_kernel_is_fatal() {
        struct NanKernel;
        impl Kernel for NanKernel {
            fn compute(&self, _: &SparseVector, _: &SparseVector) -> f64 {
                f64::NAN
            }
        }

        let features = [one_d(1.0), one_d(-1.0)];
        let refs: Vec<&SparseVector> = features.iter().collect();
        let solver = SmoSolver::new(Arc::new(NanKernel), OptimizerConfig::default());

        let result = solver.solve(&refs, &[1.0, -1.0], None);
        assert!(matches!(result, Err(SvmError::NumericalFailure(_))));
    }

    #[test]
    fn test_warm_start_matches_cold_solution() {
        let features = [one_d(2.0), one_d(1.5), one_d(-1.5), one_d(-2.0)];
        let refs: Vec<&SparseVector> = features.iter().collect();
        let labels = [1.0, 1.0, -1.0, -1.0];

        let cold = solver(OptimizerConfig::default())
            .solve(&refs, &labels, None)
            .expect("should solve");

        let warm_config = OptimizerConfig {
            warm_start: Some(cold.alpha.clone()),
            ..OptimizerConfig::default()
        };
        let warm = solver(warm_config).solve(&refs, &labels, None).expect("should solve");

        // Seeding with the optimum should converge immediately to it
        assert_eq!(warm.iterations, 0);
        for (a, b) in cold.alpha.iter().zip(warm.alpha.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_single_class_subproblem_stays_at_origin() {
        // No movable pair exists when every label is +1
        let features = [one_d(1.0), one_d(2.0)];
        let refs: Vec<&SparseVector> = features.iter().collect();
        let labels = [1.0, 1.0];

        let result = solver(OptimizerConfig::default())
            .solve(&refs, &labels, None)
            .expect("should solve");
        assert!(result.converged);
        assert!(result.support_vectors.is_empty());
    }
}
