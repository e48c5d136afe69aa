//! # Booking Status Model
//!
//! Narrow view of the `bookings` table: the lifecycle core only reads and writes the
//! `status` column. Route, weight, client and the rest of the row belong to the CRUD layer
//! and pass through untouched.
//!
//! ## Database Schema
//!
//! ```sql
//! CREATE TABLE bookings (
//!   id BIGSERIAL PRIMARY KEY,
//!   status VARCHAR(32),
//!   -- ... route, weight, client columns
//!   created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!   updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! `status` may hold legacy display labels written before the canonical vocabulary existed
//! (`In Transit`, `Processing`, `Stuck`). They are normalized on read and replaced with the
//! canonical label on the next transition.

use crate::state_machine::{normalize_status, BookingStatus};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Booking id and its stored status label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BookingStatusRow {
    pub id: i64,
    pub status: Option<String>,
}

impl BookingStatusRow {
    /// Canonical status, `None` when unset or unrecognized
    pub fn normalized_status(&self) -> Option<BookingStatus> {
        self.status.as_deref().and_then(normalize_status)
    }

    /// Load the status of one booking
    pub async fn find(pool: &PgPool, booking_id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT id, status FROM bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_optional(pool)
            .await
    }

    /// Write `next` only if the stored label still equals `expected`.
    ///
    /// Returns `false` when another writer changed the row first (or the row is gone).
    /// `IS NOT DISTINCT FROM` lets `expected = None` match a NULL status.
    pub async fn compare_and_set(
        pool: &PgPool,
        booking_id: i64,
        expected: Option<&str>,
        next: BookingStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status IS NOT DISTINCT FROM $3
            "#,
        )
        .bind(next.as_str())
        .bind(booking_id)
        .bind(expected)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Every booking with a non-NULL status. Order is unspecified.
    pub async fn list_with_status(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>("SELECT id, status FROM bookings WHERE status IS NOT NULL")
            .fetch_all(pool)
            .await
    }
}
