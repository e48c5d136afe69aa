//! # Audit Record Model
//!
//! Append-only audit trail shared by every entity of the backend. The booking core writes
//! one `STATUS_CHANGE` row per successful transition; other subsystems write their own
//! actions (booking creation, user role changes) to the same table.
//!
//! ## Database Schema
//!
//! ```sql
//! CREATE TABLE audit_log (
//!   id BIGSERIAL PRIMARY KEY,
//!   entity_type VARCHAR(64) NOT NULL,
//!   entity_id BIGINT NOT NULL,
//!   action VARCHAR(64) NOT NULL,
//!   performed_by BIGINT,
//!   metadata JSONB,
//!   created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Rows are never updated or deleted. History is read in `created_at` order, with `id`
//! breaking ties between rows written in the same instant.

use crate::constants::audit;
use crate::state_machine::errors::{AuditError, AuditResult, PersistenceError};
use crate::state_machine::BookingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

/// A persisted audit row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: String,
    pub performed_by: Option<i64>,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// New audit row for creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditRecord {
    pub entity_type: String,
    pub entity_id: i64,
    pub action: String,
    pub performed_by: Option<i64>,
    pub metadata: Option<Value>,
}

/// Metadata payload of a `STATUS_CHANGE` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeMetadata {
    pub from: Option<BookingStatus>,
    pub to: BookingStatus,
    pub reason: Option<String>,
}

impl NewAuditRecord {
    /// Audit row for a booking status change
    pub fn status_change(
        booking_id: i64,
        performed_by: Option<i64>,
        metadata: &StatusChangeMetadata,
    ) -> AuditResult<Self> {
        Ok(Self {
            entity_type: audit::ENTITY_BOOKING.to_string(),
            entity_id: booking_id,
            action: audit::ACTION_STATUS_CHANGE.to_string(),
            performed_by,
            metadata: Some(serde_json::to_value(metadata).map_err(PersistenceError::from)?),
        })
    }

    /// Reject rows missing the fields every audit entry needs
    pub fn validate(&self) -> AuditResult<()> {
        if self.entity_type.trim().is_empty() {
            return Err(AuditError::MissingField {
                field: "entity_type",
            });
        }
        if self.entity_id <= 0 {
            return Err(AuditError::MissingField { field: "entity_id" });
        }
        if self.action.trim().is_empty() {
            return Err(AuditError::MissingField { field: "action" });
        }
        Ok(())
    }
}

impl AuditRecord {
    /// Insert a new audit row and return it with its server-assigned id and timestamp
    pub async fn create(pool: &PgPool, new_record: NewAuditRecord) -> AuditResult<Self> {
        new_record.validate()?;

        let record = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO audit_log (entity_type, entity_id, action, performed_by, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, entity_type, entity_id, action, performed_by, metadata, created_at
            "#,
        )
        .bind(&new_record.entity_type)
        .bind(new_record.entity_id)
        .bind(&new_record.action)
        .bind(new_record.performed_by)
        .bind(&new_record.metadata)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Full history of one entity, oldest first
    pub async fn list_for_entity(
        pool: &PgPool,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT id, entity_type, entity_id, action, performed_by, metadata, created_at
            FROM audit_log
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(pool)
        .await
    }

    /// Decode the metadata of a `STATUS_CHANGE` row
    pub fn status_change_metadata(&self) -> Option<StatusChangeMetadata> {
        if self.action != audit::ACTION_STATUS_CHANGE {
            return None;
        }
        self.metadata
            .clone()
            .and_then(|value| serde_json::from_value(value).ok())
    }
}
