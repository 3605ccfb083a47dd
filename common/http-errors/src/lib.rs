//! Shared HTTP error taxonomy for the storefront services.
//!
//! Every failure a handler can surface maps to one [`ApiError`] variant with
//! a fixed status and a stable machine-readable `code`. The code is emitted
//! both in the JSON body and in the `X-Error-Code` response header so the
//! error-metrics middleware can label counters without parsing bodies.
//!
//! Store and gateway internals never reach the wire; callers log the
//! underlying error and convert to a variant here.

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No credentials were presented on a protected route.
    #[error("authentication required")]
    Unauthenticated,
    /// Credentials are fine, the caller just may not touch this resource.
    #[error("insufficient privilege for this resource")]
    Forbidden,
    #[error("{message}")]
    BadRequest {
        code: &'static str,
        message: String,
    },
    #[error("resource not found")]
    NotFound { code: &'static str },
    /// Soft failure for writes that would not change anything.
    #[error("No changes made, the status may already be updated")]
    NoChange,
    /// The stored lifecycle state does not permit the requested overwrite.
    #[error("cannot transition order from '{from}' to '{to}'")]
    IllegalTransition { from: String, to: String },
    /// The remote payment processor failed or declined the request.
    #[error("{message}")]
    Gateway { message: String },
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: &'static str) -> Self {
        ApiError::NotFound { code }
    }

    pub fn gateway(message: impl Into<String>) -> Self {
        ApiError::Gateway {
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated => "unauthenticated",
            ApiError::Forbidden => "forbidden",
            ApiError::BadRequest { code, .. } => code,
            ApiError::NotFound { code, .. } => code,
            ApiError::NoChange => "no_change",
            ApiError::IllegalTransition { .. } => "illegal_transition",
            ApiError::Gateway { .. } => "gateway_error",
            ApiError::Internal => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::NoChange => StatusCode::BAD_REQUEST,
            ApiError::IllegalTransition { .. } => StatusCode::CONFLICT,
            ApiError::Gateway { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Wire schema for all error responses.
#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = self.status();
        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        let mut response = (status, Json(body)).into_response();
        if let Ok(value) = HeaderValue::from_str(code) {
            response.headers_mut().insert("X-Error-Code", value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_the_taxonomy() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::bad_request("unknown_status", "nope").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("order_not_found").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::NoChange.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::IllegalTransition {
                from: "paid".into(),
                to: "pending".into()
            }
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::gateway("declined").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_codes_pass_through() {
        let err = ApiError::bad_request("missing_reference", "transactionReference required");
        assert_eq!(err.code(), "missing_reference");
        assert_eq!(err.to_string(), "transactionReference required");
    }

    #[test]
    fn internal_message_is_generic() {
        assert_eq!(ApiError::Internal.to_string(), "internal server error");
    }
}
