//! # Booking Transition Rules
//!
//! The legality table for booking status changes plus the free-form input normalization that
//! guards the typed core. Everything here is pure: no I/O, no locking, safe to call from any
//! task.
//!
//! ```text
//! CREATED ──► CONFIRMED ──► IN_TRANSIT ──► ARRIVED ──► DELIVERED ──► CLOSED
//!    │            │
//!    └────────────┴──► CANCELLED
//! ```

use super::states::BookingStatus;

/// Allowed next states per state. The first entry of each list is the default path taken by
/// the auto-progress worker.
pub const TRANSITION_TABLE: [(BookingStatus, &[BookingStatus]); 7] = [
    (
        BookingStatus::Created,
        &[BookingStatus::Confirmed, BookingStatus::Cancelled],
    ),
    (
        BookingStatus::Confirmed,
        &[BookingStatus::InTransit, BookingStatus::Cancelled],
    ),
    (BookingStatus::InTransit, &[BookingStatus::Arrived]),
    (BookingStatus::Arrived, &[BookingStatus::Delivered]),
    (BookingStatus::Delivered, &[BookingStatus::Closed]),
    (BookingStatus::Closed, &[]),
    (BookingStatus::Cancelled, &[]),
];

impl BookingStatus {
    /// States reachable from this one in a single step
    pub fn allowed_transitions(&self) -> &'static [BookingStatus] {
        TRANSITION_TABLE
            .iter()
            .find(|(from, _)| from == self)
            .map(|(_, allowed)| *allowed)
            .unwrap_or(&[])
    }

    /// Whether moving to `next` is legal. Staying put is always legal.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        *self == next || self.allowed_transitions().contains(&next)
    }

    /// Default next step for simulated progress
    pub fn next_auto(&self) -> Option<BookingStatus> {
        self.allowed_transitions().first().copied()
    }
}

/// Map free-form status input onto a canonical state.
///
/// Case-insensitive; runs of whitespace and hyphens count as a single `_`. Legacy display
/// labels are folded in: `INTRANSIT` and `STUCK` become `IN_TRANSIT`, `PROCESSING` becomes
/// `CREATED`, `CANCELED` becomes `CANCELLED`. Returns `None` for anything unrecognized.
pub fn normalize_status(raw: &str) -> Option<BookingStatus> {
    let mut key = String::with_capacity(raw.len());
    let mut in_separator = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() || ch == '-' {
            if !in_separator {
                key.push('_');
                in_separator = true;
            }
        } else {
            key.extend(ch.to_uppercase());
            in_separator = false;
        }
    }

    match key.as_str() {
        "INTRANSIT" | "STUCK" => Some(BookingStatus::InTransit),
        "PROCESSING" => Some(BookingStatus::Created),
        "CANCELED" => Some(BookingStatus::Cancelled),
        other => other.parse().ok(),
    }
}

/// Legality check over raw labels. False when either side fails to normalize.
pub fn can_transition(from: &str, to: &str) -> bool {
    match (normalize_status(from), normalize_status(to)) {
        (Some(from), Some(to)) => from.can_transition_to(to),
        _ => false,
    }
}

/// Default next step for a raw label, `None` for terminal or unrecognized input
pub fn next_auto_status(current: &str) -> Option<BookingStatus> {
    normalize_status(current).and_then(|status| status.next_auto())
}

/// Outcome of weighing a requested status against the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Already in the requested state
    NoOp(BookingStatus),
    /// Legal single step
    Advance {
        from: BookingStatus,
        to: BookingStatus,
    },
    /// Not reachable from the current state. `from` is `None` when the stored status is
    /// missing or unrecognized.
    Reject {
        from: Option<BookingStatus>,
        to: BookingStatus,
    },
}

/// Decide what a request for `requested` means for a booking currently in `current`
pub fn decide(current: Option<BookingStatus>, requested: BookingStatus) -> Decision {
    match current {
        Some(from) if from == requested => Decision::NoOp(from),
        Some(from) if from.can_transition_to(requested) => Decision::Advance {
            from,
            to: requested,
        },
        from => Decision::Reject {
            from,
            to: requested,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn test_table_covers_every_state() {
        for status in BookingStatus::ALL {
            assert_eq!(
                TRANSITION_TABLE.iter().filter(|(from, _)| *from == status).count(),
                1,
                "{status} must appear exactly once"
            );
        }
    }

    #[test]
    fn test_normalize_separators_and_case() {
        assert_eq!(normalize_status("in transit"), Some(InTransit));
        assert_eq!(normalize_status("IN-TRANSIT"), Some(InTransit));
        assert_eq!(normalize_status("intransit"), Some(InTransit));
        assert_eq!(normalize_status("  In -  Transit "), Some(InTransit));
        assert_eq!(normalize_status("confirmed"), Some(Confirmed));
    }

    #[test]
    fn test_normalize_legacy_synonyms() {
        assert_eq!(normalize_status("processing"), Some(Created));
        assert_eq!(normalize_status("Stuck"), Some(InTransit));
        assert_eq!(normalize_status("canceled"), Some(Cancelled));
        assert_eq!(normalize_status("Delivered"), Some(Delivered));
    }

    #[test]
    fn test_normalize_rejects_unknown() {
        assert_eq!(normalize_status(""), None);
        assert_eq!(normalize_status("   "), None);
        assert_eq!(normalize_status("lost at sea"), None);
        assert_eq!(normalize_status("IN__TRANSIT"), None);
    }

    #[test]
    fn test_can_transition() {
        assert!(can_transition("created", "confirmed"));
        assert!(can_transition("created", "canceled"));
        assert!(!can_transition("created", "in transit"));
        assert!(can_transition("stuck", "arrived"));
        assert!(can_transition("closed", "CLOSED"));
        assert!(!can_transition("closed", "created"));
        assert!(!can_transition("bogus", "created"));
        assert!(!can_transition("created", "bogus"));
    }

    #[test]
    fn test_next_auto_status() {
        assert_eq!(next_auto_status("CREATED"), Some(Confirmed));
        assert_eq!(next_auto_status("confirmed"), Some(InTransit));
        assert_eq!(next_auto_status("delivered"), Some(Closed));
        assert_eq!(next_auto_status("CLOSED"), None);
        assert_eq!(next_auto_status("cancelled"), None);
        assert_eq!(next_auto_status("unknown"), None);
    }

    #[test]
    fn test_decide() {
        assert_eq!(decide(Some(Confirmed), Confirmed), Decision::NoOp(Confirmed));
        assert_eq!(
            decide(Some(Confirmed), InTransit),
            Decision::Advance {
                from: Confirmed,
                to: InTransit
            }
        );
        assert_eq!(
            decide(Some(Created), InTransit),
            Decision::Reject {
                from: Some(Created),
                to: InTransit
            }
        );
        assert_eq!(
            decide(None, Created),
            Decision::Reject {
                from: None,
                to: Created
            }
        );
    }
}
