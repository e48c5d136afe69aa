//! # Booking Persistence Ports
//!
//! The transition service talks to storage only through these two traits, so the same
//! lifecycle rules run against Postgres in production and against the in-memory store in
//! tests and local simulations.
//!
//! - [`BookingStatusStore`] reads and conditionally writes the booking `status` column
//! - [`AuditLog`] appends and reads the append-only audit trail
//!
//! Both are implemented by [`PgBookingRepository`] and [`InMemoryBookingRepository`].

pub mod in_memory;
pub mod postgres;

use crate::models::{AuditRecord, BookingStatusRow, NewAuditRecord};
use crate::state_machine::errors::{AuditResult, PersistenceResult};
use crate::state_machine::BookingStatus;
use async_trait::async_trait;

pub use in_memory::InMemoryBookingRepository;
pub use postgres::PgBookingRepository;

/// Storage of the booking status column
#[async_trait]
pub trait BookingStatusStore: Send + Sync {
    /// Load id and stored status label, `None` if the booking does not exist
    async fn fetch_status(&self, booking_id: i64) -> PersistenceResult<Option<BookingStatusRow>>;

    /// Set `next` only if the stored label still equals `expected`.
    /// Returns `false` when the row changed underneath the caller.
    async fn compare_and_set_status(
        &self,
        booking_id: i64,
        expected: Option<&str>,
        next: BookingStatus,
    ) -> PersistenceResult<bool>;

    /// Bookings whose status is not NULL, in no particular order
    async fn list_with_status(&self) -> PersistenceResult<Vec<BookingStatusRow>>;
}

/// Append-only audit trail
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one record. Failures are reported, never retried here.
    async fn append(&self, record: NewAuditRecord) -> AuditResult<AuditRecord>;

    /// History of one entity, oldest first
    async fn list_for_entity(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> PersistenceResult<Vec<AuditRecord>>;
}
