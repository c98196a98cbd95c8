use thiserror::Error;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors surfaced by a [`ChirpRepository`](crate::ChirpRepository).
///
/// Build and execution failures are kept apart so that a statement that
/// could never be sent is distinguishable from one the engine rejected.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("transaction failed: {0}")]
    Transaction(String),
    #[error("failed to build query: {0}")]
    Build(String),
    #[error("failed to execute query: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("schema setup failed: {0}")]
    Schema(String),
}
