//! Driver error type

/// Failures reported by persistence drivers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Structural deletes are modeled as commands; drivers refuse them.
    #[error("delete is not supported by persistence drivers")]
    DeleteUnsupported,
    /// Backend-specific failure, wrapped as text.
    #[error("driver failure: {0}")]
    Driver(String),
}
