use std::time::Duration;

use actix_web::{
    error::{ResponseError, UrlencodedError},
    http::{header, StatusCode},
    HttpResponse,
};
use derive_more::Display;

use crate::entities::contact::{ApiResponse, ValidationErrorSet};

pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred. Please try again later.";
pub const THROTTLED_MESSAGE: &str = "Too many requests. Please try again later.";
pub const INVALID_FORM_MESSAGE: &str = "Please correct the errors below.";

#[derive(Debug, Display)]
pub enum AppError {
    #[display("Rate limit exceeded, retry after {}s", retry_after_secs(*retry_after))]
    Throttled { retry_after: Duration },

    #[display("Validation failed: {_0}")]
    ValidationFailed(ValidationErrorSet),

    #[display("Forbidden: {_0}")]
    Forbidden(String),

    #[display("Invalid credentials")]
    InvalidCredentials,

    #[display("Bad request: {_0}")]
    BadRequest(String),

    #[display("Persistence failed: {_0}")]
    PersistenceFailed(String),

    #[display("Notification failed: {_0}")]
    NotificationFailed(String),

    #[display("Configuration error: {_0}")]
    Configuration(String),

    #[display("Internal server error: {_0}")]
    Internal(String),
}

impl AppError {
    /// The message shown to the caller. Infrastructure detail stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Throttled { .. } => THROTTLED_MESSAGE.to_string(),
            AppError::ValidationFailed(_) => INVALID_FORM_MESSAGE.to_string(),
            AppError::Forbidden(_) => "This request is not allowed.".to_string(),
            AppError::InvalidCredentials => "Invalid username or password.".to_string(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::PersistenceFailed(_)
            | AppError::NotificationFailed(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            AppError::Throttled { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl std::error::Error for AppError {}

/// Whole seconds for a `Retry-After` header, never zero.
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 { secs + 1 } else { secs.max(1) }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let errors = match self {
            AppError::ValidationFailed(errors) => Some(errors),
            _ => None,
        };
        let body = ApiResponse::failure(self.public_message(), errors);

        let mut response = HttpResponse::build(self.status_code());
        if let Some(retry_after) = self.retry_after() {
            response.insert_header((header::RETRY_AFTER, retry_after_secs(retry_after).to_string()));
        }
        response.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PersistenceFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotificationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::PersistenceFailed(format!("Database error: {}", err))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::NotificationFailed(format!("Webhook error: {}", err))
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub const FORM_TOO_LARGE_MESSAGE: &str = "The submitted form is too large.";

impl From<UrlencodedError> for AppError {
    fn from(err: UrlencodedError) -> Self {
        match err {
            UrlencodedError::Overflow { .. } => AppError::BadRequest(FORM_TOO_LARGE_MESSAGE.to_string()),
            other => AppError::BadRequest(format!("Malformed form body: {}", other)),
        }
    }
}

#[derive(Debug, Display)]
pub enum PasswordError {
    #[display("Invalid password hash format: {_0}")]
    InvalidHashFormat(String),

    #[display("Password verification failed: {_0}")]
    VerificationError(String),
}

impl std::error::Error for PasswordError {}
