//! Postgres-backed implementation of the persistence ports. Delegates to the model layer
//! so SQL lives in one place.

use super::{AuditLog, BookingStatusStore};
use crate::models::{AuditRecord, BookingStatusRow, NewAuditRecord};
use crate::state_machine::errors::{AuditResult, PersistenceResult};
use crate::state_machine::BookingStatus;
use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Instant;
use tracing::debug;

#[derive(Clone)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl std::fmt::Debug for PgBookingRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgBookingRepository")
            .field("pool_size", &self.pool.size())
            .finish()
    }
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BookingStatusStore for PgBookingRepository {
    async fn fetch_status(&self, booking_id: i64) -> PersistenceResult<Option<BookingStatusRow>> {
        Ok(BookingStatusRow::find(&self.pool, booking_id).await?)
    }

    async fn compare_and_set_status(
        &self,
        booking_id: i64,
        expected: Option<&str>,
        next: BookingStatus,
    ) -> PersistenceResult<bool> {
        let started = Instant::now();
        let swapped =
            BookingStatusRow::compare_and_set(&self.pool, booking_id, expected, next).await?;
        debug!(
            booking_id = booking_id,
            expected = ?expected,
            next = %next,
            swapped = swapped,
            duration_ms = started.elapsed().as_millis() as u64,
            "Booking status compare-and-set"
        );
        Ok(swapped)
    }

    async fn list_with_status(&self) -> PersistenceResult<Vec<BookingStatusRow>> {
        Ok(BookingStatusRow::list_with_status(&self.pool).await?)
    }
}

#[async_trait]
impl AuditLog for PgBookingRepository {
    async fn append(&self, record: NewAuditRecord) -> AuditResult<AuditRecord> {
        AuditRecord::create(&self.pool, record).await
    }

    async fn list_for_entity(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> PersistenceResult<Vec<AuditRecord>> {
        Ok(AuditRecord::list_for_entity(&self.pool, entity_type, entity_id).await?)
    }
}
