//! Multiclass decomposition, combination and calibration
//!
//! Reduces an n-class problem to independent binary subproblems, trains them
//! in parallel, and recombines the resulting machines into one decision rule.

pub mod calibration;
pub mod decomposition;
pub mod machine;
pub mod model;

pub use self::calibration::*;
pub use self::decomposition::MulticlassTrainer;
pub use self::machine::*;
pub use self::model::*;
