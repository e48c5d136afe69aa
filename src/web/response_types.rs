//! # Web API Error Types
//!
//! HTTP mapping for everything a handler can fail with. Every error body has the shape
//! `{"error": <message>, "code": <stable machine code>}`.

use crate::state_machine::{PersistenceError, StatusTransitionError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("{reason}")]
    Authentication { reason: String },

    #[error("Access denied")]
    Forbidden,

    #[error("{message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Transition(#[from] StatusTransitionError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn auth_error(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Transition(e) => match e {
                StatusTransitionError::InvalidId { .. }
                | StatusTransitionError::InvalidStatus { .. }
                | StatusTransitionError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
                StatusTransitionError::NotFound { .. } => StatusCode::NOT_FOUND,
                StatusTransitionError::ConcurrentModification { .. } => StatusCode::CONFLICT,
                StatusTransitionError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Authentication { .. } => "AUTHENTICATION_FAILED",
            ApiError::Forbidden => "FORBIDDEN",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Transition(e) => e.code(),
        }
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        ApiError::Transition(StatusTransitionError::Persistence(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Storage details stay in the logs
        let message = if status.is_server_error() {
            error!(error = %self, code = self.code(), "Request failed with server error");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": message,
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}
