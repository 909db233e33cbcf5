//! JWT session token creation and verification.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{config::Config, errors::Error};

/// Who a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    Admin,
    Vendor,
}

/// JWT session claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,     // Vendor id, or nil for the admin
    pub email: String, // Vendor email, empty for the admin
    pub role: SessionRole,
    pub exp: i64, // Expiration time
    pub iat: i64, // Issued at
}

impl SessionClaims {
    pub fn new(sub: Uuid, email: impl Into<String>, role: SessionRole, config: &Config) -> Self {
        let now = Utc::now();
        let exp = now + config.auth.jwt_expiry;

        Self {
            sub,
            email: email.into(),
            role,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn admin(config: &Config) -> Self {
        Self::new(Uuid::nil(), "", SessionRole::Admin, config)
    }
}

fn secret(config: &Config) -> Result<&str, Error> {
    config.secret_key.as_deref().ok_or_else(|| Error::Internal {
        operation: "JWT sessions: secret_key is required".to_string(),
    })
}

/// Sign a session token
pub fn create_session_token(claims: &SessionClaims, config: &Config) -> Result<String, Error> {
    let key = EncodingKey::from_secret(secret(config)?.as_bytes());
    encode(&Header::default(), claims, &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })
}

/// Verify and decode a session token
pub fn verify_session_token(token: &str, config: &Config) -> Result<SessionClaims, Error> {
    let key = DecodingKey::from_secret(secret(config)?.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors (401) - malformed tokens, invalid claims, expired tokens
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::ExpiredSignature
        | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
        | jsonwebtoken::errors::ErrorKind::InvalidIssuer
        | jsonwebtoken::errors::ErrorKind::InvalidAudience
        | jsonwebtoken::errors::ErrorKind::InvalidSubject
        | jsonwebtoken::errors::ErrorKind::ImmatureSignature
        | jsonwebtoken::errors::ErrorKind::Base64(_)
        | jsonwebtoken::errors::ErrorKind::Json(_)
        | jsonwebtoken::errors::ErrorKind::Utf8(_)
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Error::Unauthenticated { message: None },

        // Server errors (500) - key issues, internal failures
        jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_)
        | jsonwebtoken::errors::ErrorKind::RsaFailedSigning
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithmName
        | jsonwebtoken::errors::ErrorKind::InvalidKeyFormat
        | jsonwebtoken::errors::ErrorKind::MissingAlgorithm
        | jsonwebtoken::errors::ErrorKind::Crypto(_) => Error::Internal {
            operation: format!("JWT verification: {e}"),
        },

        _ => Error::Internal {
            operation: format!("JWT verification (unknown error): {e}"),
        },
    })?;

    Ok(token_data.claims)
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: &str, config: &Config) -> String {
    format!(
        "{}={}; Path=/; HttpOnly;{} SameSite=Lax; Max-Age={}",
        config.auth.cookie_name,
        token,
        if config.auth.cookie_secure { " Secure;" } else { "" },
        config.auth.jwt_expiry.as_secs()
    )
}

/// `Set-Cookie` value that clears the session cookie
pub fn clear_session_cookie(config: &Config) -> String {
    format!(
        "{}=; Path=/; HttpOnly;{} SameSite=Lax; Max-Age=0",
        config.auth.cookie_name,
        if config.auth.cookie_secure { " Secure;" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn create_test_config() -> Config {
        let mut config = Config {
            secret_key: Some("test-secret-key-for-jwt".to_string()),
            ..Default::default()
        };
        config.auth.jwt_expiry = Duration::from_secs(3600);
        config
    }

    #[test]
    fn test_create_and_verify_admin_token() {
        let config = create_test_config();
        let token = create_session_token(&SessionClaims::admin(&config), &config).unwrap();

        let claims = verify_session_token(&token, &config).unwrap();
        assert_eq!(claims.role, SessionRole::Admin);
        assert!(claims.sub.is_nil());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_vendor_token_keeps_identity() {
        let config = create_test_config();
        let vendor_id = Uuid::new_v4();
        let claims = SessionClaims::new(vendor_id, "seller@example.com", SessionRole::Vendor, &config);
        let token = create_session_token(&claims, &config).unwrap();

        let verified = verify_session_token(&token, &config).unwrap();
        assert_eq!(verified.sub, vendor_id);
        assert_eq!(verified.email, "seller@example.com");
        assert_eq!(verified.role, SessionRole::Vendor);
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let mut config = create_test_config();
        let token = create_session_token(&SessionClaims::admin(&config), &config).unwrap();

        config.secret_key = Some("different-secret".to_string());
        let result = verify_session_token(&token, &config);
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated { .. }));
    }

    #[test]
    fn test_verify_expired_token() {
        let config = create_test_config();
        let now = Utc::now();
        let claims = SessionClaims {
            sub: Uuid::nil(),
            email: String::new(),
            role: SessionRole::Admin,
            exp: (now - chrono::Duration::hours(1)).timestamp(),
            iat: (now - chrono::Duration::hours(2)).timestamp(),
        };
        let token = create_session_token(&claims, &config).unwrap();

        let result = verify_session_token(&token, &config);
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated { .. }));
    }

    #[test]
    fn test_garbage_token_is_unauthenticated() {
        let config = create_test_config();
        assert!(matches!(
            verify_session_token("invalid.token.here", &config).unwrap_err(),
            Error::Unauthenticated { .. }
        ));
    }

    #[test]
    fn test_missing_secret_is_internal() {
        let config = Config::default();
        let result = create_session_token(&SessionClaims::admin(&config), &config);
        assert!(matches!(result.unwrap_err(), Error::Internal { .. }));
    }

    #[test]
    fn test_cookie_flags() {
        let mut config = create_test_config();
        let cookie = session_cookie("abc", &config);
        assert!(cookie.starts_with("memberdesk_session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=3600"));

        config.auth.cookie_secure = false;
        assert!(!clear_session_cookie(&config).contains("Secure"));
        assert!(clear_session_cookie(&config).contains("Max-Age=0"));
    }
}
