pub mod audit_record;
pub mod booking;

// Re-export core models for easy access
pub use audit_record::{AuditRecord, NewAuditRecord, StatusChangeMetadata};
pub use booking::BookingStatusRow;
