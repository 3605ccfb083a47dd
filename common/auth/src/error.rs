use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Failures from token handling and request authentication.
///
/// A missing `Authorization` header means the caller never attempted to
/// authenticate and maps to 401. A header that is present but malformed,
/// forged, or expired is refused with 403.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
    #[error("token verification failed")]
    InvalidToken(String),
    #[error("token expired")]
    ExpiredToken,
    #[error("failed to sign claims")]
    Signing(String),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "unauthenticated",
            AuthError::InvalidAuthorization => "invalid_authorization",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::ExpiredToken => "expired_token",
            AuthError::Signing(_) => "token_signing",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthorization => StatusCode::UNAUTHORIZED,
            AuthError::InvalidAuthorization
            | AuthError::InvalidToken(_)
            | AuthError::ExpiredToken => StatusCode::FORBIDDEN,
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = self.status();
        // Display text only; verifier detail stays in the tracing output.
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
