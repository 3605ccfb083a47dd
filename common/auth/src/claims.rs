use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity payload embedded in a session token.
///
/// The subject identifier is the email address; any additional profile
/// fields the client sends at login (display name, photo URL, ...) ride
/// along untouched and come back out of verification exactly as issued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaim {
    pub email: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl IdentityClaim {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            profile: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.profile.insert(key.into(), value);
        self
    }
}

/// Full token payload: the identity claim plus issue and expiry timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: IdentityClaim,
    /// Seconds since the Unix epoch.
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn subject(&self) -> &str {
        &self.identity.email
    }
}
