//! # Status Transition Service
//!
//! The single path through which a booking's status changes. Every caller, whether an
//! operator request over HTTP or the auto-progress worker, goes through
//! [`StatusTransitionService::update_status`] and gets the same legality rules and the same
//! audit trail.
//!
//! ## Sequence
//!
//! 1. Validate the booking id and normalize the requested status (no storage access)
//! 2. Load the stored status
//! 3. Ask the state machine for a [`Decision`]
//! 4. Compare-and-set the new status against the label that was read
//! 5. Append the audit record
//!
//! ## Audit Is Best-Effort
//!
//! The status write is the primary commit. The audit append runs only after it succeeded and
//! its failure is logged and swallowed: the status change stands even if the history row is
//! missing. The two writes are not atomic.

use crate::logging::log_status_transition;
use crate::models::{NewAuditRecord, StatusChangeMetadata};
use crate::persistence::{AuditLog, BookingStatusStore};
use crate::state_machine::errors::{invalid_transition, AuditResult};
use crate::state_machine::{
    decide, normalize_status, BookingStatus, Decision, StatusTransitionError,
    StatusTransitionResult,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// A request to move one booking to a new status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub booking_id: i64,
    /// Free-form status label, normalized before use
    pub requested_status: String,
    /// Acting user, `None` for system-driven changes
    pub performed_by: Option<i64>,
    pub reason: Option<String>,
}

impl StatusChangeRequest {
    pub fn new(booking_id: i64, requested_status: impl Into<String>) -> Self {
        Self {
            booking_id,
            requested_status: requested_status.into(),
            performed_by: None,
            reason: None,
        }
    }

    pub fn performed_by(mut self, user_id: Option<i64>) -> Self {
        self.performed_by = user_id;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Outcome of a status change request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResult {
    pub id: i64,
    pub from: Option<BookingStatus>,
    pub to: BookingStatus,
    /// `false` when the booking already held the requested status
    pub changed: bool,
}

/// Parse a booking id from its textual form (e.g. a URL path segment)
pub fn parse_booking_id(raw: &str) -> StatusTransitionResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| StatusTransitionError::InvalidId {
            raw: raw.to_string(),
        })
}

pub struct StatusTransitionService {
    bookings: Arc<dyn BookingStatusStore>,
    audit_log: Arc<dyn AuditLog>,
}

impl std::fmt::Debug for StatusTransitionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusTransitionService").finish_non_exhaustive()
    }
}

impl StatusTransitionService {
    pub fn new(bookings: Arc<dyn BookingStatusStore>, audit_log: Arc<dyn AuditLog>) -> Self {
        Self {
            bookings,
            audit_log,
        }
    }

    /// Build a service whose status store and audit log are the same repository
    pub fn from_repository<R>(repository: R) -> Self
    where
        R: BookingStatusStore + AuditLog + 'static,
    {
        let repository = Arc::new(repository);
        Self::new(repository.clone(), repository)
    }

    pub fn bookings(&self) -> &Arc<dyn BookingStatusStore> {
        &self.bookings
    }

    pub fn audit_log(&self) -> &Arc<dyn AuditLog> {
        &self.audit_log
    }

    /// Move a booking to the requested status, or explain why not.
    #[instrument(skip(self, request), fields(booking_id = request.booking_id))]
    pub async fn update_status(
        &self,
        request: StatusChangeRequest,
    ) -> StatusTransitionResult<TransitionResult> {
        let booking_id = request.booking_id;
        if booking_id <= 0 {
            return Err(StatusTransitionError::InvalidId {
                raw: booking_id.to_string(),
            });
        }

        let requested = normalize_status(&request.requested_status).ok_or_else(|| {
            StatusTransitionError::InvalidStatus {
                raw: request.requested_status.clone(),
            }
        })?;

        let row = self
            .bookings
            .fetch_status(booking_id)
            .await?
            .ok_or(StatusTransitionError::NotFound { booking_id })?;
        let current = row.normalized_status();

        match decide(current, requested) {
            Decision::NoOp(status) => {
                debug!(status = %status, "Booking already in requested status");
                Ok(TransitionResult {
                    id: row.id,
                    from: Some(status),
                    to: status,
                    changed: false,
                })
            }
            Decision::Reject { from, to } => {
                let from_label = from.map(|s| s.to_string()).or(row.status);
                log_status_transition(
                    booking_id,
                    from_label.as_deref(),
                    to,
                    request.performed_by,
                    "rejected",
                );
                Err(invalid_transition(booking_id, from_label, to))
            }
            Decision::Advance { from, to } => {
                let swapped = self
                    .bookings
                    .compare_and_set_status(booking_id, row.status.as_deref(), to)
                    .await?;
                if !swapped {
                    log_status_transition(
                        booking_id,
                        Some(from.as_str()),
                        to,
                        request.performed_by,
                        "conflict",
                    );
                    return Err(StatusTransitionError::ConcurrentModification {
                        booking_id,
                        expected: row.status,
                    });
                }

                log_status_transition(
                    booking_id,
                    Some(from.as_str()),
                    to,
                    request.performed_by,
                    "changed",
                );

                let metadata = StatusChangeMetadata {
                    from: Some(from),
                    to,
                    reason: request.reason,
                };
                if let Err(e) = self
                    .record_status_change(booking_id, request.performed_by, &metadata)
                    .await
                {
                    error!(
                        booking_id = booking_id,
                        from = %from,
                        to = %to,
                        error = %e,
                        "Failed to write audit record for status change; status change retained"
                    );
                }

                Ok(TransitionResult {
                    id: row.id,
                    from: Some(from),
                    to,
                    changed: true,
                })
            }
        }
    }

    /// Secondary write of a transition. The caller decides whether the failure matters.
    async fn record_status_change(
        &self,
        booking_id: i64,
        performed_by: Option<i64>,
        metadata: &StatusChangeMetadata,
    ) -> AuditResult<()> {
        let record = NewAuditRecord::status_change(booking_id, performed_by, metadata)?;
        self.audit_log.append(record).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_booking_id() {
        assert_eq!(parse_booking_id("42").unwrap(), 42);
        assert_eq!(parse_booking_id(" 7 ").unwrap(), 7);
        for raw in ["0", "-1", "abc", "1.5", ""] {
            assert!(
                matches!(
                    parse_booking_id(raw),
                    Err(StatusTransitionError::InvalidId { .. })
                ),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_transition_result_wire_shape() {
        let result = TransitionResult {
            id: 3,
            from: Some(BookingStatus::Confirmed),
            to: BookingStatus::InTransit,
            changed: true,
        };
        assert_eq!(
            serde_json::to_value(result).unwrap(),
            serde_json::json!({
                "id": 3,
                "from": "CONFIRMED",
                "to": "IN_TRANSIT",
                "changed": true,
            })
        );
    }

    #[test]
    fn test_request_builder() {
        let request = StatusChangeRequest::new(9, "arrived")
            .performed_by(Some(4))
            .with_reason("hub scan");
        assert_eq!(request.booking_id, 9);
        assert_eq!(request.performed_by, Some(4));
        assert_eq!(request.reason.as_deref(), Some("hub scan"));
    }
}
