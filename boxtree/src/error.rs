//! Crate-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Top-level error type returned by the public API outside the pure tree
/// operations.
#[derive(Error, Debug)]
pub enum BoxtreeError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },
}

pub type BoxtreeResult<T> = Result<T, BoxtreeError>;
