//! Error types for the branch-and-bound engine.

use thiserror::Error;

/// Errors that can occur during MIP solving.
///
/// Ordinary search outcomes (dead branches, exhausted budgets) are not errors;
/// they are reported through [`crate::MipStatus`].
#[derive(Error, Debug)]
pub enum MipError {
    /// Problem validation failed
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// Settings validation failed
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// The iteration counter passed the hard abort ceiling.
    #[error("Too many iterations: {count} > {ceiling}")]
    IterationAbort {
        /// Counter value that tripped the ceiling.
        count: u64,
        /// Configured hard ceiling.
        ceiling: u64,
    },

    /// The worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Internal solver error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<rayon::ThreadPoolBuildError> for MipError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        MipError::ThreadPool(err.to_string())
    }
}

/// Result type for MIP operations.
pub type MipResult<T> = Result<T, MipError>;
