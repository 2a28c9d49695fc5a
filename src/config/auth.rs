//! Session and route-gating configuration.

use serde::Deserialize;

use super::ConfigError;

/// Secret used when none is configured. Only acceptable for local runs.
pub const DEFAULT_SESSION_SECRET: &str = "insecure-development-secret-change-me";

/// Minimum accepted length of the HS256 signing secret.
const MIN_SECRET_LEN: usize = 16;

/// Auth configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret for session tokens.
    pub session_secret: String,
    /// Session lifetime in seconds.
    pub session_ttl_secs: u64,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Mark the session cookie `Secure`.
    pub secure_cookies: bool,
    /// Let unauthenticated callers reach `/api/seed`.
    pub allow_seed: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: DEFAULT_SESSION_SECRET.to_string(),
            session_ttl_secs: 60 * 60 * 24 * 7,
            cookie_name: "session".to_string(),
            secure_cookies: false,
            allow_seed: false,
        }
    }
}

impl AuthConfig {
    /// True when the built-in development secret is still in use.
    pub fn uses_default_secret(&self) -> bool {
        self.session_secret == DEFAULT_SESSION_SECRET
    }

    pub(super) fn validate(&self) -> Result<(), ConfigError> {
        if self.session_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.session_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "auth.session_ttl_secs must be positive".into(),
            ));
        }
        if self.cookie_name.is_empty() {
            return Err(ConfigError::Invalid("auth.cookie_name must not be empty".into()));
        }
        Ok(())
    }
}
