//! Storage operation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Path escapes asset root: {0}")]
    PathViolation(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for designmart_core::AppError {
    fn from(err: StorageError) -> Self {
        use designmart_core::AppError;
        match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::PathViolation(msg) => AppError::PathSecurity(msg),
            StorageError::WriteFailed(msg)
            | StorageError::DeleteFailed(msg)
            | StorageError::ConfigError(msg) => AppError::Storage(msg),
            StorageError::IoError(e) => AppError::Storage(format!("IO error: {}", e)),
        }
    }
}
