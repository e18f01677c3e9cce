// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use crate::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed username or password, rejected before any store access
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Unknown account and wrong password collapse into this one variant,
    /// so the response gives no signal about which usernames exist
    #[error("Incorrect username or password")]
    LoginFailed,

    #[error("An account with that username already exists")]
    DuplicateAccount,

    #[error("Session Id does not exist")]
    UnknownSession,

    #[error("Authentication rate limit exceeded")]
    AuthRateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::LoginFailed | AppError::UnknownSession => StatusCode::UNAUTHORIZED,
            AppError::DuplicateAccount => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AuthRateLimited => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::LoginFailed => "AUTH_001",
            AppError::DuplicateAccount => "ACC_001",
            AppError::UnknownSession => "AUTH_002",
            AppError::AuthRateLimited => "AUTH_003",
            AppError::NotFound(_) => "NF_001",
            AppError::InvalidInput(_) => "VAL_002",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Get a sanitized message suitable for production use.
    /// Validation and credential failures are user-facing as-is;
    /// infrastructure failures never leak detail to the client.
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Validation(err) => err.to_string(),
            AppError::LoginFailed => "Incorrect username or password".to_string(),
            AppError::DuplicateAccount => {
                "An account with that username already exists".to_string()
            },
            AppError::UnknownSession => "Session Id does not exist".to_string(),
            AppError::AuthRateLimited => {
                "Too many authentication attempts, please try again later".to_string()
            },
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::InvalidInput(_) => "Invalid input provided".to_string(),
            AppError::Internal(_) | AppError::Io(_) => {
                "An internal server error occurred".to_string()
            },
            AppError::Json(_) => "Invalid request format".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        // Every failure uses the same envelope as successful responses
        let body = serde_json::json!({
            "success": false,
            "err": message,
            "code": error_code,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
