//! # Structured Logging Module
//!
//! Environment-aware structured logging for the server binary and the simulation worker.
//! `RUST_LOG` takes precedence; otherwise the level follows the deployment environment.

use crate::state_machine::BookingStatus;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Initialize structured logging. Safe to call more than once.
pub fn init_structured_logging(environment: &str, format: LogFormat) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(log_level_for(environment)));

        let layer = match format {
            LogFormat::Pretty => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(filter)
                .boxed(),
        };

        // A global subscriber may already be installed by an embedding process or a test
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - keeping it");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            format = ?format,
            "Structured logging initialized"
        );
    });
}

/// Log level based on environment
fn log_level_for(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Log structured data for a booking status transition attempt
pub fn log_status_transition(
    booking_id: i64,
    from: Option<&str>,
    to: BookingStatus,
    performed_by: Option<i64>,
    outcome: &str,
) {
    tracing::info!(
        booking_id = booking_id,
        from = from,
        to = %to,
        performed_by = performed_by,
        outcome = %outcome,
        timestamp = %Utc::now().to_rfc3339(),
        "BOOKING_STATUS_TRANSITION"
    );
}
