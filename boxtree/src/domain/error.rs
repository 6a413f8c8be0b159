//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent structural violations of a tree.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid topology: inserting '{child}' into '{parent}' would create a cycle")]
    InvalidTopology { parent: String, child: String },

    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("failed to render tree: {0}")]
    Render(#[from] std::io::Error),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
