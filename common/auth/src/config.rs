/// Signing and verification settings for session tokens.
///
/// One secret per deployment; the service loads it from the environment at
/// startup and never rotates it mid-process.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    /// Clock skew tolerated when checking `exp`, in seconds.
    pub leeway_seconds: u32,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            leeway_seconds: 30,
        }
    }

    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_some_skew() {
        let config = TokenConfig::new("s3cret");
        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.leeway_seconds, 30);
    }

    #[test]
    fn leeway_is_adjustable() {
        let config = TokenConfig::new("s3cret").with_leeway(0);
        assert_eq!(config.leeway_seconds, 0);
    }
}
