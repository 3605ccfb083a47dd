use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use tracing::warn;

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::tokens::TokenService;

/// Verified caller identity, extracted from the bearer token.
///
/// Taking this as a handler argument is what makes a route protected;
/// rejection follows the missing-vs-bad credential split in [`AuthError`].
/// Note that extraction proves possession of a valid token only. Ownership
/// and role checks stay in the handlers, next to the data they guard.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    pub token: String,
}

impl AuthContext {
    /// Email the token was issued for.
    pub fn subject(&self) -> &str {
        self.claims.subject()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthorization)?;
        let token = parse_bearer(header)?;

        let claims = tokens.verify(&token).map_err(|err| {
            if let AuthError::InvalidToken(detail) = &err {
                warn!(%detail, "rejected bearer token");
            }
            err
        })?;

        Ok(Self { claims, token })
    }
}

fn parse_bearer(header: &HeaderValue) -> AuthResult<String> {
    let value = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorization)?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthorization)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::InvalidAuthorization);
    }
    Ok(token.to_string())
}
