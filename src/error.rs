//!
//! # Custom Error Handling
//!
//! This module defines the `AppError` type used throughout the application.
//! Every failure a handler, middleware or store can produce ends up as one of its
//! variants, and `AppError` alone decides which HTTP status and message the client
//! sees. Error bodies always have the shape `{"status": <code>, "message": <text>}`.
//!
//! Internal failures (database, hashing, worker pool) are logged with their detail
//! and answered with a generic message so store internals never reach the client.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `jsonwebtoken::errors::Error`, `bcrypt::BcryptError` and
//! `actix_web::error::BlockingError` allow conversion with the `?` operator.

use actix_web::{error::BlockingError, error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidationErrors;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// The request body or query could not be decoded (HTTP 400).
    InvalidInput(String),
    /// The request decoded but violates field constraints (HTTP 400).
    ValidationError(String),
    /// A uniqueness constraint would be violated (HTTP 400).
    Conflict(String),
    /// Missing, malformed or expired credentials on a protected route (HTTP 401).
    Unauthenticated(String),
    /// Login failed. Deliberately carries no detail about which check failed (HTTP 401).
    InvalidCredentials,
    /// The caller is authenticated but not entitled to the action (HTTP 403).
    Forbidden(String),
    /// No row exists for the requested identifier (HTTP 404).
    NotFound(String),
    /// Unexpected store failure (HTTP 500). The detail is logged, not returned.
    Persistence(String),
    /// Any other unexpected server-side failure (HTTP 500).
    Internal(String),
}

/// JSON body sent for every error response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

impl AppError {
    /// The message exposed to the client.
    fn public_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => format!("Invalid request: {}", msg),
            AppError::ValidationError(msg) => format!("Validation failed: {}", msg),
            AppError::Conflict(msg)
            | AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::Persistence(_) | AppError::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid Credentials"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Persistence(msg) => write!(f, "Persistence Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Error: {}", msg),
        }
    }
}

/// Converts `AppError` variants into JSON `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::ValidationError(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthenticated(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(self, AppError::Persistence(_) | AppError::Internal(_)) {
            error!("{}", self);
        }
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            status: status.as_u16(),
            message: self.public_message(),
        })
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// Constraint violations are surfaced as client errors; everything else is a
/// persistence failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match &error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Resource already exists".into())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::InvalidInput("Referenced resource does not exist".into())
            }
            _ => AppError::Persistence(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// JWT failures never expose the verifier's reason to the client.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthenticated("Invalid token".into())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing failed: {}", error))
    }
}

impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::Internal(format!("blocking task failed: {}", error))
    }
}
