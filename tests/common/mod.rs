//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use titan_logistics::models::BookingStatusRow;
use titan_logistics::persistence::{BookingStatusStore, InMemoryBookingRepository};
use titan_logistics::state_machine::{BookingStatus, PersistenceError};
use titan_logistics::state_machine::errors::PersistenceResult;

/// Store that answers every read and scan with a fixed, possibly outdated label while writing
/// through to a real repository. Simulates another writer winning the race between read
/// and compare-and-set.
#[derive(Debug, Clone)]
pub struct StaleReadStore {
    pub stale_status: Option<String>,
    pub inner: InMemoryBookingRepository,
}

#[async_trait]
impl BookingStatusStore for StaleReadStore {
    async fn fetch_status(&self, booking_id: i64) -> PersistenceResult<Option<BookingStatusRow>> {
        Ok(self
            .inner
            .stored_status(booking_id)
            .map(|_| BookingStatusRow {
                id: booking_id,
                status: self.stale_status.clone(),
            }))
    }

    async fn compare_and_set_status(
        &self,
        booking_id: i64,
        expected: Option<&str>,
        next: BookingStatus,
    ) -> PersistenceResult<bool> {
        self.inner
            .compare_and_set_status(booking_id, expected, next)
            .await
    }

    async fn list_with_status(&self) -> PersistenceResult<Vec<BookingStatusRow>> {
        let rows = self.inner.list_with_status().await?;
        Ok(rows
            .into_iter()
            .map(|row| BookingStatusRow {
                id: row.id,
                status: self.stale_status.clone(),
            })
            .collect())
    }
}

/// Store whose every operation fails, as if the database were down
#[derive(Debug, Clone, Default)]
pub struct UnavailableStore;

fn unavailable() -> PersistenceError {
    PersistenceError::Unavailable {
        reason: "database is down".to_string(),
    }
}

#[async_trait]
impl BookingStatusStore for UnavailableStore {
    async fn fetch_status(&self, _booking_id: i64) -> PersistenceResult<Option<BookingStatusRow>> {
        Err(unavailable())
    }

    async fn compare_and_set_status(
        &self,
        _booking_id: i64,
        _expected: Option<&str>,
        _next: BookingStatus,
    ) -> PersistenceResult<bool> {
        Err(unavailable())
    }

    async fn list_with_status(&self) -> PersistenceResult<Vec<BookingStatusRow>> {
        Err(unavailable())
    }
}

pub fn repository_with(bookings: &[(i64, Option<&str>)]) -> InMemoryBookingRepository {
    InMemoryBookingRepository::with_bookings(bookings.iter().copied())
}
