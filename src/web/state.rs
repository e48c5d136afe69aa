//! # Web API Application State

use crate::persistence::{AuditLog, BookingStatusStore};
use crate::services::StatusTransitionService;
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<StatusTransitionService>,
}

impl AppState {
    pub fn new(service: Arc<StatusTransitionService>) -> Self {
        Self { service }
    }

    /// State over a repository implementing both storage ports
    pub fn from_repository<R>(repository: R) -> Self
    where
        R: BookingStatusStore + AuditLog + 'static,
    {
        Self::new(Arc::new(StatusTransitionService::from_repository(repository)))
    }
}
