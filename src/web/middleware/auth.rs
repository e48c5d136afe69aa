//! # Authentication Middleware

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use tracing::debug;

use crate::constants::headers;
use crate::web::auth::{CallerIdentity, JwtAuthenticator, Role};
use crate::web::response_types::ApiError;

/// Reject requests without a valid bearer token; attach the caller otherwise
pub async fn require_auth(
    State(authenticator): State<Arc<JwtAuthenticator>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let token = extract_bearer_token(auth_header)?;

    let claims = authenticator
        .validate_token(token)
        .map_err(|_| ApiError::auth_error("Invalid or expired token"))?;
    let identity = CallerIdentity::from(&claims);

    debug!(
        user_id = identity.user_id,
        role = ?identity.role,
        "Authenticated request"
    );

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Populate [`CallerIdentity`] from `x-user-id`/`x-user-role` gateway headers.
///
/// Requests without usable headers pass through unchanged and are rejected by handlers
/// that require a caller.
pub async fn gateway_identity(mut request: Request, next: Next) -> Response {
    match identity_from_headers(request.headers()) {
        Some(identity) => {
            debug!(
                user_id = identity.user_id,
                role = ?identity.role,
                "Caller identity from gateway headers"
            );
            request.extensions_mut().insert(identity);
        }
        None => debug!("No usable gateway identity headers"),
    }
    next.run(request).await
}

/// Bearer token from an `Authorization` header value
fn extract_bearer_token(auth_header: &str) -> Result<&str, ApiError> {
    match auth_header.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ApiError::auth_error(
            "Authorization header missing or malformed",
        )),
    }
}

fn identity_from_headers(map: &HeaderMap) -> Option<CallerIdentity> {
    let role = map.get(headers::USER_ROLE)?.to_str().ok()?;
    let user_id = match map.get(headers::USER_ID) {
        Some(value) => Some(value.to_str().ok()?.trim().parse::<i64>().ok()?),
        None => None,
    };
    Some(CallerIdentity {
        user_id,
        role: Role::normalize(role),
    })
}
