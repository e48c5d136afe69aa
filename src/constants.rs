//! # System Constants
//!
//! Audit vocabulary, operational defaults and gateway header names.

/// Audit trail vocabulary
pub mod audit {
    /// Entity type recorded for booking audit rows
    pub const ENTITY_BOOKING: &str = "BOOKING";

    /// Action recorded for manual and automatic status changes
    pub const ACTION_STATUS_CHANGE: &str = "STATUS_CHANGE";
}

/// Reasons attached to system-initiated transitions
pub mod reasons {
    pub const AUTO_PROGRESS: &str = "auto_progress";
}

/// Operational defaults, overridable through configuration
pub mod defaults {
    pub const AUTO_PROGRESS_LIMIT: usize = 20;
    pub const SIMULATION_INTERVAL_MINUTES: u64 = 5;
    pub const MIN_SIMULATION_INTERVAL_MINUTES: u64 = 1;
    /// One week
    pub const MAX_SIMULATION_INTERVAL_MINUTES: u64 = 7 * 24 * 60;
    pub const DATABASE_MAX_CONNECTIONS: u32 = 10;
    pub const BIND_ADDRESS: &str = "0.0.0.0:3000";
    pub const DATABASE_URL: &str = "postgresql://postgres@localhost:5432/titan_db";
    /// Development-only signing secret, refused in production
    pub const JWT_SECRET: &str = "dev_secret_change_me";
}

/// Header names trusted by the gateway identity middleware
pub mod headers {
    pub const USER_ID: &str = "x-user-id";
    pub const USER_ROLE: &str = "x-user-role";
}
