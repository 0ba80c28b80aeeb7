//! Error types for multiclass SVM training

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SvmError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Numerical failure: {0}")]
    NumericalFailure(String),

    #[error("Training was cancelled before completion")]
    Cancelled,

    #[error("Model not trained")]
    ModelNotTrained,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, SvmError>;
