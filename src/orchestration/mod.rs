//! # Shipment Simulation
//!
//! Background progression of bookings along their default lifecycle path.
//!
//! - [`AutoProgressWorker`] advances up to `limit` eligible bookings by one step per run
//! - [`AutoProgressScheduler`] runs the worker on a fixed interval until stopped
//!
//! Both reach the database only through the Status Transition Service, so simulated moves
//! obey the same table and leave the same audit trail as operator requests.

pub mod auto_progress;
pub mod scheduler;

pub use auto_progress::AutoProgressWorker;
pub use scheduler::{AutoProgressScheduler, SchedulerHandle, SchedulerStats};
