//! # Web API Middleware
//!
//! Identity layers. Exactly one of them runs in front of the booking routes:
//! [`auth::require_auth`] verifies bearer tokens (the default), [`auth::gateway_identity`]
//! trusts headers set by an authenticating gateway (opt-in).

pub mod auth;
