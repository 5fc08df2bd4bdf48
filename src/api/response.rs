//! HTTP error mapping
//!
//! Every failure leaves as `{ "success": false, "error": <message> }`.
//! Catalog failures are logged here and replaced by a generic message.

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::{ResolveError, StoreError, ValidationError};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// Build a JSON error response with the given status code
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        success: false,
        error: message.into(),
    };
    (status, Json(body)).into_response()
}

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    /// Request could not be decoded (e.g. a malformed query string)
    BadRequest(String),
    NotFound(&'static str),
    /// `message` is what the caller sees; `source` is only logged
    Dependency {
        message: &'static str,
        source: StoreError,
    },
}

impl ApiError {
    pub fn from_resolve(err: ResolveError, message: &'static str) -> Self {
        match err {
            ResolveError::Validation(e) => ApiError::Validation(e),
            ResolveError::Dependency(source) => ApiError::Dependency { message, source },
        }
    }

    pub fn dependency(message: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| ApiError::Dependency { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Dependency { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(e) => error_response(status, e.to_string()),
            ApiError::BadRequest(message) => error_response(status, message),
            ApiError::NotFound(message) => error_response(status, message),
            ApiError::Dependency { message, source } => {
                error!(error = %source, "{}", message);
                error_response(status, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_bad_request() {
        let resp = ApiError::Validation(ValidationError::InvalidZip).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_dependency_is_internal_error() {
        let err = ApiError::from_resolve(
            ResolveError::Dependency(StoreError::Unavailable("db down".into())),
            "Failed to fetch providers",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found() {
        let resp = ApiError::NotFound("Provider not found").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
