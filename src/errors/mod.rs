//! Error handling module for the link directory.
//!
//! Provides centralized error types with stable string codes.

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const CREDENTIAL_NOT_FOUND: &str = "CREDENTIAL_NOT_FOUND";
    pub const CREDENTIAL_ERROR: &str = "CREDENTIAL_ERROR";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Caller is not allowed to create or update listings
    PermissionDenied(String),
    /// No credential exists for the attempted email
    CredentialNotFound(String),
    /// Credential rejected (wrong password, email already in use)
    Credential(String),
    /// Validation error
    Validation(String),
    /// Resource not found
    NotFound(String),
    /// Database error
    Database(String),
    /// Internal error
    Internal(String),
}

impl AppError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::PermissionDenied(_) => codes::PERMISSION_DENIED,
            AppError::CredentialNotFound(_) => codes::CREDENTIAL_NOT_FOUND,
            AppError::Credential(_) => codes::CREDENTIAL_ERROR,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            AppError::PermissionDenied(msg)
            | AppError::CredentialNotFound(msg)
            | AppError::Credential(msg)
            | AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::Internal(format!("JSON error: {}", err))
    }
}
