//! # Booking Status Handlers
//!
//! Operator-facing endpoints over the Status Transition Service. Both require a caller with
//! the `ADMIN` or `OPERATIONS` role.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::audit;
use crate::models::AuditRecord;
use crate::persistence::AuditLog;
use crate::services::{parse_booking_id, StatusChangeRequest, TransitionResult};
use crate::web::auth::{authorize, CallerIdentity, STATUS_MANAGERS};
use crate::web::response_types::{ApiError, ApiResult};
use crate::web::state::AppState;

/// Body of a status update. `nextStatus` is accepted as an alias of `status`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusBody {
    pub status: Option<String>,
    pub next_status: Option<String>,
    pub reason: Option<String>,
}

impl UpdateStatusBody {
    fn requested_status(&self) -> Option<&str> {
        [self.status.as_deref(), self.next_status.as_deref()]
            .into_iter()
            .flatten()
            .find(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingHistoryResponse {
    pub booking_id: i64,
    pub history: Vec<AuditRecord>,
}

/// Change a booking status: PATCH /bookings/:id/status
pub async fn update_booking_status(
    State(state): State<AppState>,
    identity: Option<Extension<CallerIdentity>>,
    Path(raw_id): Path<String>,
    body: Result<Json<UpdateStatusBody>, JsonRejection>,
) -> ApiResult<Json<TransitionResult>> {
    let caller = authorize(identity.as_deref(), STATUS_MANAGERS)?;

    // Body problems are reported before a malformed id
    let Json(body) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let requested = body
        .requested_status()
        .ok_or_else(|| ApiError::bad_request("status is required"))?
        .to_string();
    let booking_id = parse_booking_id(&raw_id)?;

    let mut request =
        StatusChangeRequest::new(booking_id, requested).performed_by(caller.user_id);
    request.reason = body.reason;

    let result = state.service.update_status(request).await?;

    info!(
        booking_id = result.id,
        user_id = caller.user_id,
        changed = result.changed,
        to = %result.to,
        "Booking status update handled"
    );

    Ok(Json(result))
}

/// Audit history of a booking, oldest first: GET /bookings/:id/history
pub async fn booking_history(
    State(state): State<AppState>,
    identity: Option<Extension<CallerIdentity>>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<BookingHistoryResponse>> {
    authorize(identity.as_deref(), STATUS_MANAGERS)?;
    let booking_id = parse_booking_id(&raw_id)?;

    let history = state
        .service
        .audit_log()
        .list_for_entity(audit::ENTITY_BOOKING, booking_id)
        .await?;

    Ok(Json(BookingHistoryResponse {
        booking_id,
        history,
    }))
}
