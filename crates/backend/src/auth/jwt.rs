//! JWT session token validation.

use jsonwebtoken::{decode, DecodingKey, Validation};

use super::types::Claims;

/// Validate a JWT session token and return its claims.
///
/// Signature and `exp` are both checked; an expired token is an error.
pub fn validate_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub(crate) const TEST_SECRET: &str = "test-secret-key-for-testing-only";

    /// Sign a token the way the auth backend would.
    pub(crate) fn sign_token(secret: &str, sub: &str, ttl: Duration) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            name: Some("Test Operator".to_string()),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("should sign token")
    }

    #[test]
    fn test_validate_token() {
        let token = sign_token(TEST_SECRET, "operator@example.com", Duration::hours(1));

        let claims = validate_token(TEST_SECRET, &token).expect("should validate token");
        assert_eq!(claims.sub, "operator@example.com");
        assert_eq!(claims.name, Some("Test Operator".to_string()));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let result = validate_token(TEST_SECRET, "invalid-token");
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_token(TEST_SECRET, "operator@example.com", Duration::hours(1));

        let result = validate_token("wrong-secret", &token);
        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = sign_token(TEST_SECRET, "operator@example.com", Duration::hours(-2));

        let result = validate_token(TEST_SECRET, &token);
        assert!(result.is_err());
    }
}
