//! Session-token handling shared by the storefront services.
//!
//! Tokens are symmetric (HS256) and carry the caller-supplied identity claim
//! verbatim; authorization decisions that matter (role checks, ownership) are
//! made against the user directory at request time, never from token content.

pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod tokens;

pub use claims::{Claims, IdentityClaim};
pub use config::TokenConfig;
pub use error::{AuthError, AuthResult};
pub use extractors::AuthContext;
pub use tokens::TokenService;
