//! Error types and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Body sent with every 401
pub const UNAUTHORIZED_BODY: &str = "Unauthorized";

/// Body sent with every 404
pub const NOT_FOUND_BODY: &str = "Not found";

/// Startup configuration fault
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid object store settings: {0}")]
    ObjectStore(String),
}

/// Presigned URL construction failure
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("Failed to presign {operation} for {key}: {message}")]
    Presign {
        operation: &'static str,
        key: String,
        message: String,
    },
}

/// API error type
///
/// Only `NotFound` and `Unauthorized` are client outcomes. Everything else is
/// a server fault: logged at error level and answered with a 500, never a 4xx.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),
}

impl ApiError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error is a server fault rather than a client outcome
    pub fn is_fault(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl From<crate::auth::Unauthorized> for ApiError {
    fn from(_: crate::auth::Unauthorized) -> Self {
        Self::Unauthorized
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::NotFound => (status, NOT_FOUND_BODY).into_response(),
            Self::Unauthorized => (status, UNAUTHORIZED_BODY).into_response(),
            fault => {
                tracing::error!(error = %fault, "Unhandled fault while serving request");
                (status, "Internal Server Error").into_response()
            }
        }
    }
}
