//!
//! # Error Taxonomy
//!
//! This module defines `AppError`, the closed set of failures that may reach the
//! HTTP boundary. Every handler, service and middleware in the crate reports
//! failures through it, and `AppError` alone decides which status code and JSON
//! body a failure becomes.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so returning it from a
//! handler (or converting it into `actix_web::Error` inside middleware) produces
//! the uniform `{"message": ..., "code": ...}` envelope. `From` implementations for
//! `validator::ValidationErrors` and `TokenError` let callers use `?` directly.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{ValidationError, ValidationErrors};

use crate::auth::token::TokenError;
use crate::store::StoreError;

/// Message sent for every rejected credential, whatever the underlying reason.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";

/// Machine-readable code attached to backend failures.
pub const DATABASE_ERROR_CODE: &str = "DB_ERROR";

/// Represents every failure the application can surface to a client.
///
/// Each variant maps to exactly one HTTP status in [`AppError::status_code`].
#[derive(Debug)]
pub enum AppError {
    /// Malformed or invalid input (HTTP 400).
    BadRequest(String),
    /// Missing, invalid or expired credential (HTTP 401).
    /// The carried reason is for server logs only; clients always see
    /// [`UNAUTHORIZED_MESSAGE`].
    Unauthorized(String),
    /// Reserved (HTTP 403). Ownership mismatches are reported as `NotFound`.
    Forbidden(String),
    /// Resource absent or not owned by the caller (HTTP 404).
    NotFound(String),
    /// Configuration errors and broken invariants (HTTP 500).
    Internal(String),
    /// Backend failure other than "no row matched" (HTTP 500).
    /// `source` is kept for diagnostics and is never serialized.
    Database { message: String, source: StoreError },
}

/// JSON envelope written for every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl AppError {
    /// Optional machine-readable code sent alongside the message.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AppError::Database { .. } => Some(DATABASE_ERROR_CODE),
            AppError::BadRequest(_)
            | AppError::Unauthorized(_)
            | AppError::Forbidden(_)
            | AppError::NotFound(_)
            | AppError::Internal(_) => None,
        }
    }

    /// The message a client is allowed to see.
    pub fn client_message(&self) -> &str {
        match self {
            AppError::Unauthorized(_) => UNAUTHORIZED_MESSAGE,
            AppError::BadRequest(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Internal(msg) => msg,
            AppError::Database { message, .. } => message,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.client_message().to_owned(),
            code: self.code().map(str::to_owned),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::Database { message, source } => {
                write!(f, "Database Error: {} ({})", message, source)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Database { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// This is the single exhaustive mapping from failure kind to status and body.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) | AppError::Database { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

/// Converts `validator::ValidationErrors` into `AppError::BadRequest`.
///
/// Field issues are rendered as `"<field>: <reason>"` pairs, sorted by field
/// name and joined with `", "`.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        let message = fields
            .into_iter()
            .flat_map(|(field, issues)| {
                issues
                    .iter()
                    .map(move |issue| format!("{}: {}", field, describe(issue)))
            })
            .collect::<Vec<_>>()
            .join(", ");

        AppError::BadRequest(message)
    }
}

fn describe(issue: &ValidationError) -> String {
    match &issue.message {
        Some(message) => message.to_string(),
        None => match issue.code.as_ref() {
            "length" => length_reason(issue),
            "url" => "must be a valid URL".to_owned(),
            other => format!("failed {} validation", other),
        },
    }
}

fn length_reason(issue: &ValidationError) -> String {
    let bound = |key: &str| issue.params.get(key).and_then(|value| value.as_u64());
    match (bound("min"), bound("max")) {
        (Some(min), Some(max)) => format!("must be between {} and {} characters", min, max),
        (Some(min), None) => format!("must be at least {} characters", min),
        (None, Some(max)) => format!("must be at most {} characters", max),
        (None, None) => "has an invalid length".to_owned(),
    }
}

/// Converts a credential verification failure into `AppError::Unauthorized`.
///
/// The reason is preserved for logging; the response body stays uniform.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        AppError::Unauthorized(format!("Invalid token: {}", error))
    }
}
