use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Booking lifecycle states.
///
/// Serialized with the canonical upper-case labels. Deserialization accepts any input that
/// [`normalize_status`](super::transitions::normalize_status) understands, so legacy display
/// labels such as `"In Transit"` or `"processing"` are absorbed at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Booking recorded, awaiting confirmation
    Created,
    /// Confirmed by operations, awaiting departure
    Confirmed,
    /// Cargo is moving
    InTransit,
    /// Cargo reached the destination hub
    Arrived,
    /// Handed over to the consignee
    Delivered,
    /// Booking closed out
    Closed,
    /// Booking cancelled before departure
    Cancelled,
}

impl BookingStatus {
    /// Every state, in lifecycle order.
    pub const ALL: [BookingStatus; 7] = [
        Self::Created,
        Self::Confirmed,
        Self::InTransit,
        Self::Arrived,
        Self::Delivered,
        Self::Closed,
        Self::Cancelled,
    ];

    /// Canonical wire label
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Confirmed => "CONFIRMED",
            Self::InTransit => "IN_TRANSIT",
            Self::Arrived => "ARRIVED",
            Self::Delivered => "DELIVERED",
            Self::Closed => "CLOSED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    /// Strict parse of a canonical label. Use `normalize_status` for free-form input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid booking status: {s}"))
    }
}

impl<'de> Deserialize<'de> for BookingStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::transitions::normalize_status(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid booking status: {raw}")))
    }
}

/// Default state for new bookings
impl Default for BookingStatus {
    fn default() -> Self {
        Self::Created
    }
}
