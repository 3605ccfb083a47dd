use std::env;

use anyhow::{Context, Result};

use crate::gateway::DEFAULT_GATEWAY_BASE;

/// Remote payment processor settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub secret_key: String,
    /// Overridable for tests; defaults to the live API host.
    pub api_base: String,
}

/// Credentials for the outbound mail relay. Delivery itself is handled by a
/// separate worker; this service only carries the credentials so deployment
/// environments stay uniform.
#[derive(Debug, Clone)]
pub struct MailRelayConfig {
    pub username: String,
    pub password: String,
}

/// Process configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub token_secret: String,
    pub gateway: GatewayConfig,
    pub mail: Option<MailRelayConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let token_secret =
            env::var("ACCESS_TOKEN_SECRET").context("ACCESS_TOKEN_SECRET must be set")?;
        let secret_key =
            env::var("STRIPE_SECRET_KEY").context("STRIPE_SECRET_KEY must be set")?;
        let api_base = env::var("STRIPE_API_BASE")
            .ok()
            .and_then(|value| normalize_optional(&value))
            .unwrap_or_else(|| DEFAULT_GATEWAY_BASE.to_string());

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(5000);

        Ok(Self {
            host,
            port,
            database_url,
            token_secret,
            gateway: GatewayConfig {
                secret_key,
                api_base,
            },
            mail: mail_relay_from_env(),
        })
    }
}

fn mail_relay_from_env() -> Option<MailRelayConfig> {
    let username = env::var("EMAIL_USER").ok().and_then(|v| normalize_optional(&v))?;
    let password = env::var("EMAIL_PASS").ok().and_then(|v| normalize_optional(&v))?;
    Some(MailRelayConfig { username, password })
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_normalize_to_none() {
        assert_eq!(normalize_optional(""), None);
        assert_eq!(normalize_optional("   "), None);
        assert_eq!(normalize_optional(" x "), Some("x".to_string()));
    }

    #[test]
    fn mail_relay_requires_both_credentials() {
        env::set_var("EMAIL_USER", "notifier@example.com");
        env::remove_var("EMAIL_PASS");
        assert!(mail_relay_from_env().is_none());

        env::set_var("EMAIL_PASS", "app-password");
        let relay = mail_relay_from_env().unwrap();
        assert_eq!(relay.username, "notifier@example.com");

        env::remove_var("EMAIL_USER");
        env::remove_var("EMAIL_PASS");
    }
}
