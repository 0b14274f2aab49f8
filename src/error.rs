//! Error types for the AMG solver

use thiserror::Error;

/// Main error type for AMG operations
#[derive(Error, Debug)]
pub enum AmgError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("numerical issue: {0}")]
    NumericalIssue(String),

    #[error("isolated point at row {0}: zero off-diagonal entries, not a valid DG matrix")]
    IsolatedPoint(usize),

    #[error("index {pos} out of range (len {len})")]
    OutOfRange { pos: usize, len: usize },

    #[error("element {0} not found in set")]
    NotFound(usize),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("matrix market parse error: {0}")]
    MatrixMarket(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for AMG operations
pub type AmgResult<T> = Result<T, AmgError>;
