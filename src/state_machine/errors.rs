use super::states::BookingStatus;
use thiserror::Error;

/// Failures of a single status transition request.
///
/// Everything except `Persistence` is caller-correctable and never retried by the core.
#[derive(Error, Debug)]
pub enum StatusTransitionError {
    #[error("Invalid booking id: {raw}")]
    InvalidId { raw: String },

    #[error("Invalid or unsupported status value: {raw}")]
    InvalidStatus { raw: String },

    #[error("Booking {booking_id} not found")]
    NotFound { booking_id: i64 },

    #[error("Cannot transition booking {booking_id} from {} to {to}", .from.as_deref().unwrap_or("<unset>"))]
    InvalidTransition {
        booking_id: i64,
        from: Option<String>,
        to: BookingStatus,
    },

    #[error("Booking {booking_id} was modified concurrently, expected status {}", .expected.as_deref().unwrap_or("<unset>"))]
    ConcurrentModification {
        booking_id: i64,
        expected: Option<String>,
    },

    #[error("Persistence operation failed: {0}")]
    Persistence(#[from] PersistenceError),
}

impl StatusTransitionError {
    /// Stable machine-readable code echoed to API clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId { .. } => "INVALID_ID",
            Self::InvalidStatus { .. } => "INVALID_STATUS",
            Self::NotFound { .. } => "BOOKING_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ConcurrentModification { .. } => "CONCURRENT_MODIFICATION",
            Self::Persistence(_) => "STORAGE_ERROR",
        }
    }

    /// True for failures the caller can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}

/// Specific error type for persistence operations
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Audit trail failures. Never fatal to the status change that triggered them.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit record missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Audit write failed: {0}")]
    WriteFailed(#[from] PersistenceError),
}

impl From<sqlx::Error> for AuditError {
    fn from(err: sqlx::Error) -> Self {
        Self::WriteFailed(PersistenceError::Database(err))
    }
}

/// Result type alias for status transition operations
pub type StatusTransitionResult<T> = Result<T, StatusTransitionError>;
pub type PersistenceResult<T> = Result<T, PersistenceError>;
pub type AuditResult<T> = Result<T, AuditError>;

/// Helper function to build an invalid transition error from the stored label
pub fn invalid_transition(
    booking_id: i64,
    from: Option<impl Into<String>>,
    to: BookingStatus,
) -> StatusTransitionError {
    StatusTransitionError::InvalidTransition {
        booking_id,
        from: from.map(Into::into),
        to,
    }
}
