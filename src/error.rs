//! Error types for the Titan backend core.

use crate::state_machine::{AuditError, PersistenceError, StatusTransitionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TitanError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Status transition error: {0}")]
    StatusTransition(#[from] StatusTransitionError),
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("Server error: {0}")]
    Server(String),
}

impl From<config::ConfigError> for TitanError {
    fn from(err: config::ConfigError) -> Self {
        TitanError::Configuration(err.to_string())
    }
}

impl From<sqlx::Error> for TitanError {
    fn from(err: sqlx::Error) -> Self {
        TitanError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for TitanError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        TitanError::Migration(err.to_string())
    }
}

impl From<std::io::Error> for TitanError {
    fn from(err: std::io::Error) -> Self {
        TitanError::Server(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TitanError>;
