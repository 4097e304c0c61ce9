//! Error handling for ChekwasMed
//!
//! This module defines the main error type used throughout the application
//! and how each variant is rendered as an HTTP error envelope.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Main error type for ChekwasMed application
#[derive(Error, Debug)]
pub enum ChekwasError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: Uuid },

    #[error("Medication not found: {medication_id}")]
    MedicationNotFound { medication_id: Uuid },

    #[error("User medication not found: {user_medication_id}")]
    UserMedicationNotFound { user_medication_id: Uuid },

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after: u64 },

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for ChekwasMed operations
pub type Result<T> = std::result::Result<T, ChekwasError>;

impl ChekwasError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ChekwasError::Database(_) => false,
            ChekwasError::Migration(_) => false,
            ChekwasError::Redis(_) => true,
            ChekwasError::Serialization(_) => false,
            ChekwasError::Io(_) => true,
            ChekwasError::Config(_) => false,
            ChekwasError::InvalidInput(_) => false,
            ChekwasError::MissingFields(_) => false,
            ChekwasError::Authentication(_) => false,
            ChekwasError::TokenExpired => false,
            ChekwasError::InvalidToken => false,
            ChekwasError::PermissionDenied(_) => false,
            ChekwasError::UserNotFound { .. } => false,
            ChekwasError::MedicationNotFound { .. } => false,
            ChekwasError::UserMedicationNotFound { .. } => false,
            ChekwasError::Duplicate(_) => false,
            ChekwasError::RateLimitExceeded { .. } => true,
            ChekwasError::PasswordHash(_) => false,
            ChekwasError::Internal(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ChekwasError::Database(_) => ErrorSeverity::Critical,
            ChekwasError::Migration(_) => ErrorSeverity::Critical,
            ChekwasError::Config(_) => ErrorSeverity::Critical,
            ChekwasError::PermissionDenied(_) => ErrorSeverity::Warning,
            ChekwasError::Authentication(_) => ErrorSeverity::Warning,
            ChekwasError::TokenExpired | ChekwasError::InvalidToken => ErrorSeverity::Warning,
            ChekwasError::RateLimitExceeded { .. } => ErrorSeverity::Warning,
            ChekwasError::InvalidInput(_) | ChekwasError::MissingFields(_) => ErrorSeverity::Info,
            ChekwasError::UserNotFound { .. }
            | ChekwasError::MedicationNotFound { .. }
            | ChekwasError::UserMedicationNotFound { .. }
            | ChekwasError::Duplicate(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }

    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            ChekwasError::InvalidInput(_) | ChekwasError::MissingFields(_) => StatusCode::BAD_REQUEST,
            ChekwasError::Authentication(_) | ChekwasError::TokenExpired | ChekwasError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            ChekwasError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ChekwasError::UserNotFound { .. }
            | ChekwasError::MedicationNotFound { .. }
            | ChekwasError::UserMedicationNotFound { .. } => StatusCode::NOT_FOUND,
            ChekwasError::Duplicate(_) => StatusCode::CONFLICT,
            ChekwasError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for the error envelope
    pub fn code(&self) -> &'static str {
        match self {
            ChekwasError::InvalidInput(_) => "INVALID_INPUT",
            ChekwasError::MissingFields(_) => "MISSING_FIELDS",
            ChekwasError::Authentication(_) => "AUTH_REQUIRED",
            ChekwasError::TokenExpired => "TOKEN_EXPIRED",
            ChekwasError::InvalidToken => "INVALID_TOKEN",
            ChekwasError::PermissionDenied(_) => "FORBIDDEN",
            ChekwasError::UserNotFound { .. }
            | ChekwasError::MedicationNotFound { .. }
            | ChekwasError::UserMedicationNotFound { .. } => "NOT_FOUND",
            ChekwasError::Duplicate(_) => "DUPLICATE",
            ChekwasError::RateLimitExceeded { .. } => "RATE_LIMITED",
            _ => "INTERNAL",
        }
    }

    /// Message shown to API clients. Internal details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            ChekwasError::InvalidInput(msg)
            | ChekwasError::Authentication(msg)
            | ChekwasError::PermissionDenied(msg)
            | ChekwasError::Duplicate(msg) => msg.clone(),
            ChekwasError::MissingFields(_) => self.to_string(),
            ChekwasError::TokenExpired => "Token has expired. Please log in again.".to_string(),
            ChekwasError::InvalidToken => "Invalid token format".to_string(),
            ChekwasError::UserNotFound { .. } => "User not found".to_string(),
            ChekwasError::MedicationNotFound { .. } => "Medication not found".to_string(),
            ChekwasError::UserMedicationNotFound { .. } => {
                "Medication not found in your list".to_string()
            }
            ChekwasError::RateLimitExceeded { retry_after } => {
                format!("Too many requests. Retry after {retry_after}s")
            }
            _ => "An internal error occurred".to_string(),
        }
    }

    /// Map a unique-constraint violation to `Duplicate`, keep anything else
    pub fn from_unique_violation(err: sqlx::Error, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ChekwasError::Duplicate(message.to_string())
            }
            _ => ChekwasError::Database(err),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for ChekwasError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::Error => {
                tracing::error!(
                    error = %self,
                    severity = %self.severity(),
                    recoverable = self.is_recoverable(),
                    "Request failed"
                );
            }
            ErrorSeverity::Warning => tracing::warn!(error = %self, "Request rejected"),
            ErrorSeverity::Info => tracing::debug!(error = %self, "Request rejected"),
        }

        let body = ErrorBody {
            success: false,
            code: self.code(),
            message: self.client_message(),
        };

        let mut response = (status, Json(body)).into_response();
        if let ChekwasError::RateLimitExceeded { retry_after } = &self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("Retry-After", value);
            }
        }
        response
    }
}
