//! Platt scaling: sigmoid calibration of raw decision values
//!
//! Fits P(y=1|f) = 1 / (1 + exp(A*f + B)) by minimizing the regularized
//! negative log-likelihood with Newton iterations and a backtracking line
//! search, following Lin, Weng & Keerthi, "A Note on Platt's Probabilistic
//! Outputs for Support Vector Machines" (2007). Targets are shrunk away from
//! exact 0/1 so separable data cannot drive the parameters to infinity.

use crate::core::{Result, SvmError};
use log::warn;
use serde::{Deserialize, Serialize};

const MAX_ITERATIONS: usize = 100;
const MIN_STEP: f64 = 1e-10;
/// Hessian ridge keeping the Newton system positive definite
const SIGMA: f64 = 1e-12;
const GRADIENT_EPS: f64 = 1e-5;

/// Fitted sigmoid parameters mapping a raw margin to a probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattScaling {
    /// Slope applied to the decision value (negative for a well-posed fit)
    pub a: f64,
    /// Intercept
    pub b: f64,
}

impl PlattScaling {
    /// Fit sigmoid parameters from training decision values and their
    /// `{-1,+1}` labels.
    pub fn fit(decision_values: &[f64], labels: &[f64]) -> Result<Self> {
        if decision_values.len() != labels.len() {
            return Err(SvmError::InvalidArgument(format!(
                "decision value count {} does not match label count {}",
                decision_values.len(),
                labels.len()
            )));
        }
        if decision_values.is_empty() {
            return Err(SvmError::InvalidArgument(
                "cannot calibrate on an empty sample set".to_string(),
            ));
        }

        let n = decision_values.len();
        let prior1 = labels.iter().filter(|&&y| y > 0.0).count() as f64;
        let prior0 = n as f64 - prior1;

        // Regularized targets: (N+ + 1)/(N+ + 2) and 1/(N- + 2)
        let hi_target = (prior1 + 1.0) / (prior1 + 2.0);
        let lo_target = 1.0 / (prior0 + 2.0);
        let targets: Vec<f64> = labels
            .iter()
            .map(|&y| if y > 0.0 { hi_target } else { lo_target })
            .collect();

        let mut a = 0.0;
        let mut b = ((prior0 + 1.0) / (prior1 + 1.0)).ln();
        let mut fval = nll(decision_values, &targets, a, b);

        for _ in 0..MAX_ITERATIONS {
            // Gradient and Hessian of the NLL in (A, B)
            let mut h11 = SIGMA;
            let mut h22 = SIGMA;
            let mut h21 = 0.0;
            let mut g1 = 0.0;
            let mut g2 = 0.0;

            for (&f, &t) in decision_values.iter().zip(targets.iter()) {
                let f_ab = a * f + b;
                let (p, q) = if f_ab >= 0.0 {
                    let e = (-f_ab).exp();
                    (e / (1.0 + e), 1.0 / (1.0 + e))
                } else {
                    let e = f_ab.exp();
                    (1.0 / (1.0 + e), e / (1.0 + e))
                };
                let d2 = p * q;
                h11 += f * f * d2;
                h22 += d2;
                h21 += f * d2;
                let d1 = t - p;
                g1 += f * d1;
                g2 += d1;
            }

            if g1.abs() < GRADIENT_EPS && g2.abs() < GRADIENT_EPS {
                break;
            }

            // Newton direction
            let det = h11 * h22 - h21 * h21;
            let da = -(h22 * g1 - h21 * g2) / det;
            let db = -(-h21 * g1 + h11 * g2) / det;
            let gd = g1 * da + g2 * db;

            // Backtracking line search
            let mut stepsize = 1.0;
            let mut advanced = false;
            while stepsize >= MIN_STEP {
                let new_a = a + stepsize * da;
                let new_b = b + stepsize * db;
                let new_f = nll(decision_values, &targets, new_a, new_b);
                if new_f < fval + 1e-4 * stepsize * gd {
                    a = new_a;
                    b = new_b;
                    fval = new_f;
                    advanced = true;
                    break;
                }
                stepsize /= 2.0;
            }

            if !advanced {
                warn!("Platt scaling line search failed; keeping current parameters");
                break;
            }
        }

        Ok(Self { a, b })
    }

    /// Calibrated probability for a raw decision value
    pub fn probability(&self, decision_value: f64) -> f64 {
        let f_ab = self.a * decision_value + self.b;
        if f_ab >= 0.0 {
            let e = (-f_ab).exp();
            e / (1.0 + e)
        } else {
            1.0 / (1.0 + f_ab.exp())
        }
    }
}

/// Regularized negative log-likelihood, evaluated in a numerically stable form
fn nll(decision_values: &[f64], targets: &[f64], a: f64, b: f64) -> f64 {
    decision_values
        .iter()
        .zip(targets.iter())
        .map(|(&f, &t)| {
            let f_ab = a * f + b;
            if f_ab >= 0.0 {
                t * f_ab + (1.0 + (-f_ab).exp()).ln()
            } else {
                (t - 1.0) * f_ab + (1.0 + f_ab.exp()).ln()
            }
        })
        .sum()
}
