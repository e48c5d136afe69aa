//! # Web API
//!
//! axum router over the Status Transition Service.
//!
//! | Method | Path | Roles |
//! |---|---|---|
//! | `PATCH` | `/bookings/:id/status` | ADMIN, OPERATIONS |
//! | `GET` | `/bookings/:id/history` | ADMIN, OPERATIONS |
//! | `GET` | `/health` | public |

pub mod auth;
pub mod handlers;
pub mod middleware;
pub mod response_types;
pub mod state;

use axum::routing::{get, patch};
use axum::Router;
use std::sync::Arc;

pub use auth::{CallerIdentity, JwtAuthenticator, Role};
pub use response_types::{ApiError, ApiResult};
pub use state::AppState;

/// How the booking routes learn who the caller is
#[derive(Debug, Clone)]
pub enum IdentitySource {
    /// Verify `Authorization: Bearer <jwt>` on every request
    BearerToken(Arc<JwtAuthenticator>),
    /// Trust `x-user-id`/`x-user-role` set by an authenticating gateway
    GatewayHeaders,
}

impl IdentitySource {
    pub fn bearer_token(secret: &str) -> Self {
        Self::BearerToken(Arc::new(JwtAuthenticator::from_secret(secret)))
    }
}

fn booking_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/bookings/:id/status",
            patch(handlers::bookings::update_booking_status),
        )
        .route(
            "/bookings/:id/history",
            get(handlers::bookings::booking_history),
        )
}

/// Routes without any identity layer. The embedding server must insert
/// [`CallerIdentity`] into request extensions before the handlers run.
pub fn routes(state: AppState) -> Router {
    booking_routes()
        .route("/health", get(handlers::health::basic_health))
        .with_state(state)
}

/// Booking routes behind the chosen identity layer, `/health` left public
pub fn router(state: AppState, identity: IdentitySource) -> Router {
    let bookings = match identity {
        IdentitySource::BearerToken(authenticator) => booking_routes().layer(
            axum::middleware::from_fn_with_state(authenticator, middleware::auth::require_auth),
        ),
        IdentitySource::GatewayHeaders => booking_routes().layer(axum::middleware::from_fn(
            middleware::auth::gateway_identity,
        )),
    };

    bookings
        .route("/health", get(handlers::health::basic_health))
        .with_state(state)
}
