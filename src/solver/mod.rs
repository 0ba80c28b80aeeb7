//! Binary dual optimizer
//!
//! Solves one two-class weighted soft-margin dual problem by sequential
//! minimal optimization with first-order maximal-violating-pair selection.

pub mod smo;

pub use self::smo::*;
