//! # Web API Handlers

pub mod bookings;
pub mod health;
