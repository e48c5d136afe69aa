#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Titan Logistics Core
//!
//! Booking status lifecycle engine for the Titan logistics backend.
//!
//! ## Overview
//!
//! A booking moves through a fixed lifecycle:
//! `CREATED → CONFIRMED → IN_TRANSIT → ARRIVED → DELIVERED → CLOSED`, with `CANCELLED`
//! reachable from the two early states. This crate owns the rules for that lifecycle and the
//! single write path that enforces them.
//!
//! ## Module Organization
//!
//! - [`state_machine`] - Pure status engine: states, transition table, normalization
//! - [`services`] - Status Transition Service, the only path that changes a booking status
//! - [`orchestration`] - Auto-progress worker and its periodic scheduler
//! - [`persistence`] - Storage ports with Postgres and in-memory implementations
//! - [`models`] - Row types and queries for bookings and the audit log
//! - [`web`] - HTTP surface (axum)
//! - [`config`] - Layered configuration
//! - [`logging`] - Structured logging setup
//! - [`error`] - Crate-level error type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use titan_logistics::persistence::InMemoryBookingRepository;
//! use titan_logistics::services::{StatusChangeRequest, StatusTransitionService};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = InMemoryBookingRepository::with_bookings([(1, Some("CREATED"))]);
//! let service = StatusTransitionService::from_repository(repository);
//!
//! let result = service
//!     .update_status(StatusChangeRequest::new(1, "confirmed").performed_by(Some(7)))
//!     .await?;
//! assert!(result.changed);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod persistence;
pub mod services;
pub mod state_machine;
pub mod web;

pub use config::TitanConfig;
pub use error::{Result, TitanError};
pub use state_machine::{BookingStatus, StatusTransitionError};
