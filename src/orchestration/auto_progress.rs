//! # Auto-Progress Worker
//!
//! Moves eligible bookings one step along their default path. A run lists every booking
//! with a status, skips the ones at a terminal or unrecognized status, and asks the Status
//! Transition Service for the next default status until `limit` bookings actually changed.
//!
//! Bookings are visited in ascending id order so repeated runs are predictable. A failure on
//! one booking (a concurrent operator change, a storage hiccup) is logged and the run moves
//! on. Only a failure of the initial scan aborts the run.

use crate::constants::reasons;
use crate::persistence::BookingStatusStore;
use crate::services::{StatusChangeRequest, StatusTransitionService};
use crate::state_machine::{StatusTransitionError, StatusTransitionResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct AutoProgressWorker {
    bookings: Arc<dyn BookingStatusStore>,
    service: Arc<StatusTransitionService>,
}

impl std::fmt::Debug for AutoProgressWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoProgressWorker")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl AutoProgressWorker {
    /// Worker scanning the same store the service writes to
    pub fn new(service: Arc<StatusTransitionService>) -> Self {
        Self {
            bookings: service.bookings().clone(),
            service,
        }
    }

    pub fn service(&self) -> &Arc<StatusTransitionService> {
        &self.service
    }

    /// Advance up to `limit` bookings by one step. Returns how many changed.
    #[instrument(skip(self))]
    pub async fn auto_progress_eligible(
        &self,
        performed_by: Option<i64>,
        limit: usize,
    ) -> StatusTransitionResult<usize> {
        let started = Instant::now();
        let mut rows = self
            .bookings
            .list_with_status()
            .await
            .map_err(StatusTransitionError::from)?;
        rows.sort_by_key(|row| row.id);

        let mut progressed = 0usize;
        let mut failed = 0usize;

        for row in rows {
            if progressed >= limit {
                break;
            }

            let Some(next) = row.normalized_status().and_then(|status| status.next_auto())
            else {
                continue;
            };

            let request = StatusChangeRequest::new(row.id, next.as_str())
                .performed_by(performed_by)
                .with_reason(reasons::AUTO_PROGRESS);

            match self.service.update_status(request).await {
                Ok(result) if result.changed => {
                    progressed += 1;
                    debug!(
                        booking_id = result.id,
                        from = ?result.from,
                        to = %result.to,
                        "Booking auto-progressed"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    failed += 1;
                    warn!(
                        booking_id = row.id,
                        next = %next,
                        error = %e,
                        code = e.code(),
                        "Auto-progress failed for booking, skipping"
                    );
                }
            }
        }

        info!(
            progressed = progressed,
            failed = failed,
            limit = limit,
            duration_ms = started.elapsed().as_millis() as u64,
            "Auto-progress run completed"
        );

        Ok(progressed)
    }
}
