//! Error types module
//!
//! All errors in the pipeline are unified under the `AppError` enum, which
//! self-describes its HTTP presentation through the `ErrorMetadata` trait.
//! Sensitive variants (database, storage, internal) never expose detail to
//! clients; detail goes to tracing only.

use std::io;

use crate::models::ReviewState;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for suspicious but handled conditions
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "VALIDATION_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Uploader account is pending approval")]
    UploaderNotApproved,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid review transition from state '{from}'")]
    InvalidTransition { from: ReviewState },

    #[error("Path security violation: {0}")]
    PathSecurity(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Storage(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(format!("Invalid UUID: {}", err))
    }
}

/// Static metadata per variant: (http_status, error_code, sensitive, log_level).
fn static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Validation(_) => (400, "VALIDATION_ERROR", false, LogLevel::Debug),
        AppError::Unauthorized(_) => (401, "UNAUTHORIZED", false, LogLevel::Debug),
        AppError::Forbidden(_) => (403, "FORBIDDEN", false, LogLevel::Debug),
        AppError::UploaderNotApproved => (403, "UPLOADER_NOT_APPROVED", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::InvalidTransition { .. } => (409, "INVALID_TRANSITION", false, LogLevel::Debug),
        // Traversal attempts are logged as potential probing.
        AppError::PathSecurity(_) => (403, "PATH_SECURITY", true, LogLevel::Warn),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", false, LogLevel::Debug),
        AppError::Database(_) => (500, "DATABASE_ERROR", true, LogLevel::Error),
        AppError::Storage(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::UploaderNotApproved => {
                "Your uploader account is pending approval".to_string()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidTransition { from } => {
                format!("Design has already been reviewed (state: {})", from)
            }
            AppError::PathSecurity(_) => "Forbidden".to_string(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Storage(_) => "Upload failed".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_surface_their_message() {
        let err = AppError::Validation("Title is required".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!err.is_sensitive());
        assert_eq!(err.client_message(), "Title is required");
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn path_security_hides_detail_and_warns() {
        let err = AppError::PathSecurity("../../etc/passwd".to_string());
        assert_eq!(err.http_status_code(), 403);
        assert!(err.is_sensitive());
        assert_eq!(err.client_message(), "Forbidden");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn invalid_transition_names_current_state() {
        let err = AppError::InvalidTransition {
            from: ReviewState::Approved,
        };
        assert_eq!(err.http_status_code(), 409);
        assert!(err.client_message().contains("approved"));
    }

    #[test]
    fn storage_errors_are_opaque_to_clients() {
        let err = AppError::Storage("disk full at /var/lib".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Upload failed");
        assert!(err.is_sensitive());
    }

    #[test]
    fn uploader_not_approved_is_distinct_from_forbidden() {
        let err = AppError::UploaderNotApproved;
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.error_code(), "UPLOADER_NOT_APPROVED");
    }
}
