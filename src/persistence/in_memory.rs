//! In-memory implementation of the persistence ports.
//!
//! Backs tests and local simulation runs. Compare-and-set is atomic per booking through the
//! `DashMap` shard lock. Audit writes can be made to fail on demand to exercise the
//! best-effort audit path.

use super::{AuditLog, BookingStatusStore};
use crate::models::{AuditRecord, BookingStatusRow, NewAuditRecord};
use crate::state_machine::errors::{AuditError, AuditResult, PersistenceError, PersistenceResult};
use crate::state_machine::BookingStatus;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct InMemoryBookingRepository {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    bookings: DashMap<i64, Option<String>>,
    audit_log: RwLock<Vec<AuditRecord>>,
    next_audit_id: AtomicI64,
    status_reads: AtomicUsize,
    fail_audit_writes: AtomicBool,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed bookings from `(id, stored status label)` pairs
    pub fn with_bookings<'a>(bookings: impl IntoIterator<Item = (i64, Option<&'a str>)>) -> Self {
        let repository = Self::new();
        for (id, status) in bookings {
            repository.insert_booking(id, status);
        }
        repository
    }

    /// Insert or overwrite a booking row. Bypasses the lifecycle rules, like a raw SQL seed.
    pub fn insert_booking(&self, booking_id: i64, status: Option<&str>) {
        self.inner
            .bookings
            .insert(booking_id, status.map(str::to_string));
    }

    /// Stored status label of a booking, `None` if the booking does not exist
    pub fn stored_status(&self, booking_id: i64) -> Option<Option<String>> {
        self.inner
            .bookings
            .get(&booking_id)
            .map(|entry| entry.value().clone())
    }

    /// Snapshot of every audit record written so far
    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.inner.audit_log.read().clone()
    }

    /// Number of single-booking status reads served
    pub fn status_reads(&self) -> usize {
        self.inner.status_reads.load(Ordering::SeqCst)
    }

    /// Make every subsequent audit append fail until switched back
    pub fn set_fail_audit_writes(&self, fail: bool) {
        self.inner.fail_audit_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BookingStatusStore for InMemoryBookingRepository {
    async fn fetch_status(&self, booking_id: i64) -> PersistenceResult<Option<BookingStatusRow>> {
        self.inner.status_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .inner
            .bookings
            .get(&booking_id)
            .map(|entry| BookingStatusRow {
                id: *entry.key(),
                status: entry.value().clone(),
            }))
    }

    async fn compare_and_set_status(
        &self,
        booking_id: i64,
        expected: Option<&str>,
        next: BookingStatus,
    ) -> PersistenceResult<bool> {
        let Some(mut entry) = self.inner.bookings.get_mut(&booking_id) else {
            return Ok(false);
        };
        if entry.value().as_deref() != expected {
            return Ok(false);
        }
        *entry.value_mut() = Some(next.as_str().to_string());
        Ok(true)
    }

    async fn list_with_status(&self) -> PersistenceResult<Vec<BookingStatusRow>> {
        Ok(self
            .inner
            .bookings
            .iter()
            .filter_map(|entry| {
                entry.value().as_ref().map(|status| BookingStatusRow {
                    id: *entry.key(),
                    status: Some(status.clone()),
                })
            })
            .collect())
    }
}

#[async_trait]
impl AuditLog for InMemoryBookingRepository {
    async fn append(&self, record: NewAuditRecord) -> AuditResult<AuditRecord> {
        record.validate()?;
        if self.inner.fail_audit_writes.load(Ordering::SeqCst) {
            return Err(AuditError::WriteFailed(PersistenceError::Unavailable {
                reason: "audit log rejected the write".to_string(),
            }));
        }

        let stored = AuditRecord {
            id: self.inner.next_audit_id.fetch_add(1, Ordering::SeqCst) + 1,
            entity_type: record.entity_type,
            entity_id: record.entity_id,
            action: record.action,
            performed_by: record.performed_by,
            metadata: record.metadata,
            created_at: Utc::now(),
        };
        self.inner.audit_log.write().push(stored.clone());
        Ok(stored)
    }

    async fn list_for_entity(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> PersistenceResult<Vec<AuditRecord>> {
        let mut history: Vec<AuditRecord> = self
            .inner
            .audit_log
            .read()
            .iter()
            .filter(|record| record.entity_type == entity_type && record.entity_id == entity_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(history)
    }
}
