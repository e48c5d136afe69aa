//! # Caller Identity
//!
//! Roles, the authenticated caller as seen by handlers, and the HS256 bearer token
//! authenticator. The middleware in [`crate::web::middleware::auth`] turns a request into a
//! [`CallerIdentity`] extension; handlers only check roles.

use crate::web::response_types::ApiError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Bearer token failures
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization header missing or malformed")]
    MissingBearer,

    #[error("JWT processing error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Operations,
    Client,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Operations => "OPERATIONS",
            Role::Client => "CLIENT",
        }
    }

    /// Parse a role label, accepting the legacy `ADMINISTRATOR` and `USER` names
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ADMIN" | "ADMINISTRATOR" => Some(Role::Admin),
            "OPERATIONS" => Some(Role::Operations),
            "CLIENT" | "USER" => Some(Role::Client),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles allowed to change a booking status or read its history
pub const STATUS_MANAGERS: &[Role] = &[Role::Admin, Role::Operations];

/// Authenticated caller, stored in request extensions.
///
/// `role` is `None` when the caller is authenticated but carries a role this service does
/// not know; such callers are forbidden, not unauthenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: Option<i64>,
    pub role: Option<Role>,
}

impl CallerIdentity {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self {
            user_id: Some(user_id),
            role: Some(role),
        }
    }
}

/// Claims of the access tokens issued at login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl From<&TokenClaims> for CallerIdentity {
    fn from(claims: &TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            role: claims.role.as_deref().and_then(Role::normalize),
        }
    }
}

/// HS256 token authenticator sharing one secret with the login service
#[derive(Clone)]
pub struct JwtAuthenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthenticator")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl JwtAuthenticator {
    pub fn from_secret(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        // Login tokens carry no audience
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify signature and expiry, returning the claims
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        debug!(token_length = token.len(), "Validating bearer token");

        let token_data =
            decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                warn!(error = %e, "JWT token validation failed");
                AuthError::JwtError(e)
            })?;

        Ok(token_data.claims)
    }

    /// Issue a token for a user, valid for `ttl`
    pub fn generate_token(
        &self,
        user_id: i64,
        role: &str,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = TokenClaims {
            user_id: Some(user_id),
            email: None,
            role: Some(role.to_string()),
            exp: now + ttl.as_secs() as i64,
            iat: Some(now),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}

/// Check that a caller is present and holds one of `allowed`
pub fn authorize(
    identity: Option<&CallerIdentity>,
    allowed: &[Role],
) -> Result<CallerIdentity, ApiError> {
    let identity = identity.ok_or(ApiError::Unauthorized)?;
    match identity.role {
        Some(role) if allowed.contains(&role) => Ok(*identity),
        role => {
            warn!(
                user_id = identity.user_id,
                role = ?role,
                "Caller lacks required role"
            );
            Err(ApiError::Forbidden)
        }
    }
}
