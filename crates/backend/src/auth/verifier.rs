//! Session token verification capability.

use async_trait::async_trait;
use axum::http::HeaderMap;

use super::extract::{bearer_token, read_cookie};
use super::jwt;
use super::types::{AuthConfig, SessionToken};

/// Resolves the session token carried by a request.
///
/// Returns `None` for a missing, malformed, forged or expired token; the gate
/// does not distinguish between them.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, headers: &HeaderMap) -> Option<SessionToken>;
}

/// Verifies HS256 session tokens signed by the auth backend.
///
/// The session cookie is consulted first, then the `Authorization` header.
pub struct JwtVerifier {
    config: AuthConfig,
}

impl JwtVerifier {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, headers: &HeaderMap) -> Option<SessionToken> {
        let token = read_cookie(headers, &self.config.session_cookie_name)
            .or_else(|| bearer_token(headers))?;

        match jwt::validate_token(&self.config.jwt_secret, &token) {
            Ok(claims) => Some(SessionToken { claims }),
            Err(e) => {
                tracing::debug!("Rejecting session token: {}", e);
                None
            }
        }
    }
}
