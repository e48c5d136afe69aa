// Booking status lifecycle engine
//
// Pure decision logic for booking status changes: the canonical state enumeration, the
// constant transition table, and normalization of free-form status input.

pub mod errors;
pub mod states;
pub mod transitions;

// Re-export main types for convenient access
pub use errors::{
    AuditError, PersistenceError, StatusTransitionError, StatusTransitionResult,
};
pub use states::BookingStatus;
pub use transitions::{
    can_transition, decide, next_auto_status, normalize_status, Decision, TRANSITION_TABLE,
};
