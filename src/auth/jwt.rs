//! Session token codec
//!
//! Issues and verifies the compact session token carried by every
//! authenticated request.
//!
//! Security notes:
//! - Tokens are signed with HS256 (HMAC-SHA256)
//! - Default lifetime is 24 hours from issuance
//! - The secret is handed in once at construction and never changes
//!
//! The signature is always checked before any claim is read. Expiry is then
//! checked against the injected [`Clock`] rather than the library's wall clock.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::Role;
use crate::clock::Clock;
use crate::types::PrecinctError;

/// Default token lifetime in seconds (24 hours)
pub const DEFAULT_TOKEN_EXPIRY_SECONDS: u64 = 24 * 60 * 60;

/// Name of the cookie that may carry the token
pub const TOKEN_COOKIE: &str = "token";

/// Payload stored in the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub id: String,
    /// Role at issuance
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signs and verifies session tokens
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    expiry_seconds: i64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("expiry_seconds", &self.expiry_seconds)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a new codec
    ///
    /// Returns an error if the secret is empty or too short, or the expiry is zero
    pub fn new(
        secret: String,
        expiry_seconds: u64,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, PrecinctError> {
        if secret.is_empty() {
            return Err(PrecinctError::Config(
                "JWT_SECRET is required in production mode".into(),
            ));
        }

        if secret.len() < 32 {
            return Err(PrecinctError::Config(
                "JWT_SECRET must be at least 32 characters".into(),
            ));
        }

        let expiry_seconds = i64::try_from(expiry_seconds)
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| {
                PrecinctError::Config("JWT_EXPIRY_SECONDS must be a positive number".into())
            })?;

        Ok(Self {
            secret,
            expiry_seconds,
            clock,
        })
    }

    pub fn expiry_seconds(&self) -> i64 {
        self.expiry_seconds
    }

    /// Issue a token for an account, stamped with the current time
    pub fn issue(&self, account_id: &str, role: Role) -> Result<String, PrecinctError> {
        self.issue_at(account_id, role, self.clock.now())
    }

    /// Issue a token with an explicit issuance time.
    ///
    /// The same secret, account, role and time always yield the same token.
    pub fn issue_at(
        &self,
        account_id: &str,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, PrecinctError> {
        let iat = issued_at.timestamp();
        let claims = Claims {
            id: account_id.to_string(),
            role,
            iat,
            exp: iat + self.expiry_seconds,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| PrecinctError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verify and decode a token
    pub fn verify(&self, token: &str) -> Result<Claims, PrecinctError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|err| {
            use jsonwebtoken::errors::ErrorKind;
            let reason = match err.kind() {
                ErrorKind::InvalidSignature => "Invalid signature",
                ErrorKind::InvalidToken => "Malformed token",
                ErrorKind::InvalidAlgorithm => "Unexpected signing algorithm",
                ErrorKind::Json(_) | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
                    "Unreadable token payload"
                }
                _ => "Token validation failed",
            };
            PrecinctError::InvalidToken(reason.into())
        })?;

        if self.clock.now().timestamp() > claims.exp {
            return Err(PrecinctError::ExpiredToken);
        }

        Ok(claims)
    }
}

/// Extract token from Authorization header.
/// Supports "Bearer <token>" format and raw tokens.
pub fn extract_token_from_header(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;

    if let Some(token) = header.strip_prefix("Bearer ") {
        let token = token.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    // Also support raw token
    if !header.contains(' ') {
        let token = header.trim();
        if !token.is_empty() {
            return Some(token);
        }
    }

    None
}

/// Extract a named cookie value from a Cookie header
pub fn extract_token_from_cookie<'a>(cookie_header: Option<&'a str>, name: &str) -> Option<&'a str> {
    cookie_header?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Find the session token on a request; the Authorization header wins over the cookie.
pub fn extract_token<'a>(
    auth_header: Option<&'a str>,
    cookie_header: Option<&'a str>,
) -> Option<&'a str> {
    extract_token_from_header(auth_header)
        .or_else(|| extract_token_from_cookie(cookie_header, TOKEN_COOKIE))
}
