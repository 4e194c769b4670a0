//! Auth-related types and configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Name of the long-lived refresh credential cookie.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Default name of the cookie carrying the session token.
pub const DEFAULT_SESSION_COOKIE: &str = "session_token";

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account identifier)
    pub sub: String,
    /// Display name, when the auth backend provides one
    #[serde(default)]
    pub name: Option<String>,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// A session token that passed verification.
///
/// Inserted into request extensions by the session gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub claims: Claims,
}

/// Raw `refresh_token` value forwarded to protected handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCookie(pub String);

/// Auth configuration loaded from environment
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_cookie_name: String,
}

impl AuthConfig {
    /// Load auth configuration through a variable lookup.
    ///
    /// Required vars:
    /// - `JWT_SECRET`: Secret key the auth backend signs session tokens with
    ///
    /// Optional vars:
    /// - `SESSION_COOKIE_NAME`: Cookie carrying the session token (default `session_token`)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET must be set")?;

        Ok(Self {
            jwt_secret,
            session_cookie_name: lookup("SESSION_COOKIE_NAME")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string()),
        })
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("session_cookie_name", &self.session_cookie_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_secret_is_config_error() {
        let err = AuthConfig::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn test_session_cookie_defaults() {
        let config = AuthConfig::from_lookup(|key| match key {
            "JWT_SECRET" => Some("secret".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.session_cookie_name, "session_token");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AuthConfig {
            jwt_secret: "super-secret".to_string(),
            session_cookie_name: "sid".to_string(),
        };
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
