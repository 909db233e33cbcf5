//! Request extractors that gate handlers on the caller's credentials.
//!
//! Session tokens are read from `Authorization: Bearer <jwt>` first, then from the session
//! cookie. Cron callers present the configured `cron_secret` as their bearer token instead.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, trace};

use crate::{
    AppState,
    auth::session::{self, SessionClaims, SessionRole},
    config::Config,
    errors::{Error, Result},
    types::VendorId,
};

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

fn cookie_token<'a>(parts: &'a Parts, cookie_name: &str) -> Option<&'a str> {
    let cookie_str = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_str
        .split(';')
        .filter_map(|c| c.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value)
}

/// Compare two secrets without short-circuiting on the first differing byte.
///
/// Both sides are hashed first so the comparison also takes the same time regardless of length.
fn secrets_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Verify whichever session token the request carries and require `role`
#[instrument(skip(parts, config))]
fn session_with_role(parts: &Parts, config: &Config, role: SessionRole) -> Result<SessionClaims> {
    let mut last_error = None;

    for token in [bearer_token(parts), cookie_token(parts, &config.auth.cookie_name)].into_iter().flatten() {
        match session::verify_session_token(token, config) {
            Ok(claims) if claims.role == role => return Ok(claims),
            Ok(claims) => {
                trace!(found = ?claims.role, wanted = ?role, "Session has the wrong role");
                last_error = Some(Error::Unauthenticated {
                    message: Some("This session cannot access this resource".to_string()),
                });
            }
            Err(e @ Error::Internal { .. }) => return Err(e),
            Err(e) => last_error = Some(e),
        }
    }

    Err(last_error.unwrap_or(Error::Unauthenticated { message: None }))
}

/// A request made with a valid admin session
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let claims = session_with_role(parts, &state.config, SessionRole::Admin)?;
        debug!("Admin session accepted");
        Ok(AdminSession(claims))
    }
}

/// A request made with a valid vendor session
#[derive(Debug, Clone)]
pub struct VendorSession {
    pub vendor_id: VendorId,
    pub email: String,
}

impl FromRequestParts<AppState> for VendorSession {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let claims = session_with_role(parts, &state.config, SessionRole::Vendor)?;
        Ok(VendorSession {
            vendor_id: claims.sub,
            email: claims.email,
        })
    }
}

/// A request from the external scheduler, authenticated by `cron_secret`
#[derive(Debug, Clone, Copy)]
pub struct CronAuth;

impl FromRequestParts<AppState> for CronAuth {
    type Rejection = Error;

    #[instrument(skip_all)]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Some(secret) = state.config.cron_secret.as_deref().filter(|s| !s.is_empty()) else {
            debug!("Cron call rejected: no cron_secret configured");
            return Err(Error::Unauthenticated {
                message: Some("Cron access is not configured".to_string()),
            });
        };

        match bearer_token(parts) {
            Some(token) if secrets_match(token, secret) => Ok(CronAuth),
            _ => Err(Error::Unauthenticated { message: None }),
        }
    }
}
