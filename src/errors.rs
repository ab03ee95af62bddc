// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::{json, Value};
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Each variant maps to an HTTP status code in standard mode.
/// Legacy mode collapses all of them to 401 (see services::ResponseMode).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacesError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl PlacesError {
    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            PlacesError::NotFound(_) => "NOT_FOUND",
            PlacesError::AlreadyExists(_) => "ALREADY_EXISTS",
            PlacesError::ValidationError(_) => "VALIDATION_ERROR",
            PlacesError::Unauthorized(_) => "UNAUTHORIZED",
            PlacesError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }

    /// Message safe to send to clients.
    /// Database failures are logged where they happen and reported generically here.
    pub fn public_message(&self) -> String {
        match self {
            PlacesError::DatabaseError(_) => "Database error".to_string(),
            other => other.to_string(),
        }
    }

    /// Payload shape used by the legacy 401-for-everything contract
    pub fn legacy_body(&self) -> Value {
        match self {
            PlacesError::AlreadyExists(message) => json!({ "message": message }),
            other => json!({
                "name": other.code(),
                "message": other.public_message(),
            }),
        }
    }
}

impl From<sqlx::Error> for PlacesError {
    fn from(e: sqlx::Error) -> Self {
        log::error!("Database error: {}", e);
        PlacesError::DatabaseError(e.to_string())
    }
}

impl From<validator::ValidationErrors> for PlacesError {
    fn from(e: validator::ValidationErrors) -> Self {
        PlacesError::ValidationError(e.to_string())
    }
}

/// Convert PlacesError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for PlacesError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.public_message(),
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PlacesError::NotFound(_) => StatusCode::NOT_FOUND,
            PlacesError::AlreadyExists(_) => StatusCode::CONFLICT,
            PlacesError::ValidationError(_) => StatusCode::BAD_REQUEST,
            PlacesError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PlacesError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            PlacesError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PlacesError::AlreadyExists("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            PlacesError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PlacesError::DatabaseError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_errors_are_not_leaked() {
        let err = PlacesError::DatabaseError("relation \"places\" does not exist".into());
        assert_eq!(err.public_message(), "Database error");
        assert_eq!(err.legacy_body()["message"], "Database error");
    }

    #[test]
    fn test_conflict_legacy_body_is_bare_message() {
        let err = PlacesError::AlreadyExists("User-Place relation already exists".into());
        assert_eq!(
            err.legacy_body(),
            json!({ "message": "User-Place relation already exists" })
        );
    }
}
