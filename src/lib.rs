//! Multiclass Support Vector Machine training in Rust
//!
//! Decomposes an n-class problem into binary subproblems (one-vs-one or
//! one-vs-rest), solves each with an SMO-style dual optimizer on a bounded
//! worker pool, and recombines the binary machines into a single multiclass
//! decision rule, optionally with Platt-calibrated probabilities.

pub mod api;
pub mod cache;
pub mod core;
pub mod data;
pub mod kernel;
pub mod multiclass;
pub mod persistence;
pub mod solver;

// Re-export main types for convenience
pub use crate::api::Svm;
pub use crate::cache::{CacheStats, KernelCache};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{Result, SvmError};
pub use crate::data::{LibSvmDataset, VecDataset};
pub use crate::kernel::{Kernel, KernelSpec, LinearKernel, PolynomialKernel, RbfKernel};
pub use crate::multiclass::{
    BinaryMachine, MulticlassModel, MulticlassTrainer, PlattScaling,
};
pub use crate::solver::SmoSolver;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
