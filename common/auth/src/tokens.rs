use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::claims::{Claims, IdentityClaim};
use crate::config::TokenConfig;
use crate::error::{AuthError, AuthResult};

/// Fixed session lifetime. Extending a session means issuing a new token.
const TOKEN_TTL_HOURS: i64 = 24;

/// Issues and verifies signed session tokens under one process-wide secret.
///
/// No I/O and no interior mutability; wrap it in an `Arc` and share it
/// across requests.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = u64::from(config.leeway_seconds);
        // Profile fields are caller-shaped; never interpret them as
        // registered claims.
        validation.validate_aud = false;
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Sign `identity` with the current issue time and a 24 hour expiry.
    ///
    /// `iat` and `exp` profile fields are dropped before signing: the
    /// presented claim may be the decoded payload of an earlier token, and
    /// this pair is always stamped fresh. Everything else is embedded
    /// verbatim and not cross-checked against the user directory; issuing a
    /// token vouches for nothing but the clock.
    pub fn issue(&self, identity: &IdentityClaim) -> AuthResult<String> {
        let mut identity = identity.clone();
        identity.profile.remove("iat");
        identity.profile.remove("exp");
        let now = Utc::now();
        let claims = Claims {
            identity,
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Signing(err.to_string()))
    }

    /// Check signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(err.to_string()),
            },
        )?;
        debug!(subject = %data.claims.identity.email, "verified session token");
        Ok(data.claims)
    }
}
