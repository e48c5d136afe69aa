//! # Configuration
//!
//! Layered configuration for the Titan backend core: built-in defaults, then `TITAN_*`
//! environment variables, then the variable names used by existing deployments
//! (`DATABASE_URL`, `PORT`, `JWT_SECRET`, `ENABLE_SHIPMENT_SIMULATION`,
//! `SHIPMENT_SIM_INTERVAL_MINUTES`).

use crate::constants::defaults;
use crate::error::{Result, TitanError};
use crate::logging::LogFormat;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone, PartialEq, Deserialize)]
pub struct TitanConfig {
    pub environment: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_address: String,
    pub log_format: LogFormat,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    /// Trust `x-user-id`/`x-user-role` from an authenticating gateway instead of
    /// verifying bearer tokens
    pub trust_gateway_headers: bool,
    /// Run the shipment simulation (auto-progress worker)
    pub simulation_enabled: bool,
    pub simulation_interval_minutes: u64,
    /// Maximum bookings advanced per simulation tick
    pub auto_progress_limit: usize,
}

impl Default for TitanConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            database_url: defaults::DATABASE_URL.to_string(),
            database_max_connections: defaults::DATABASE_MAX_CONNECTIONS,
            bind_address: defaults::BIND_ADDRESS.to_string(),
            log_format: LogFormat::Pretty,
            jwt_secret: defaults::JWT_SECRET.to_string(),
            trust_gateway_headers: false,
            simulation_enabled: false,
            simulation_interval_minutes: defaults::SIMULATION_INTERVAL_MINUTES,
            auto_progress_limit: defaults::AUTO_PROGRESS_LIMIT,
        }
    }
}

impl TitanConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_sources(std::env::vars().collect())
    }

    /// Load configuration from an explicit variable map (the process environment in
    /// production, a fixed map in tests)
    pub fn from_sources(vars: HashMap<String, String>) -> Result<Self> {
        let base = Self::default();

        let mut builder = config::Config::builder()
            .set_default("environment", base.environment)?
            .set_default("database_url", base.database_url)?
            .set_default("database_max_connections", i64::from(base.database_max_connections))?
            .set_default("bind_address", base.bind_address)?
            .set_default("log_format", "pretty")?
            .set_default("jwt_secret", base.jwt_secret)?
            .set_default("trust_gateway_headers", base.trust_gateway_headers)?
            .set_default("simulation_enabled", base.simulation_enabled)?
            .set_default("simulation_interval_minutes", base.simulation_interval_minutes as i64)?
            .set_default("auto_progress_limit", base.auto_progress_limit as i64)?
            .add_source(
                config::Environment::with_prefix("TITAN")
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            );

        let legacy = |key: &str| vars.get(key).filter(|v| !v.trim().is_empty()).cloned();

        builder = builder
            .set_override_option("database_url", legacy("DATABASE_URL"))?
            .set_override_option("jwt_secret", legacy("JWT_SECRET"))?
            .set_override_option(
                "simulation_interval_minutes",
                legacy("SHIPMENT_SIM_INTERVAL_MINUTES"),
            )?;

        if let Some(enabled) = legacy("ENABLE_SHIPMENT_SIMULATION") {
            builder = builder.set_override("simulation_enabled", enabled == "true")?;
        }
        let environment = legacy("TITAN_ENV").or_else(|| legacy("APP_ENV"));
        if let Some(environment) = environment.filter(|_| !vars.contains_key("TITAN_ENVIRONMENT")) {
            builder = builder.set_override("environment", environment)?;
        }
        if let Some(port) = legacy("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|e| TitanError::Configuration(format!("Invalid PORT '{port}': {e}")))?;
            builder = builder.set_override("bind_address", format!("0.0.0.0:{port}"))?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.database_url.trim().is_empty() {
            return Err(TitanError::Configuration(
                "database_url must not be empty".to_string(),
            ));
        }
        if self.database_max_connections == 0 {
            return Err(TitanError::Configuration(
                "database_max_connections must be at least 1".to_string(),
            ));
        }
        if self.simulation_interval_minutes > defaults::MAX_SIMULATION_INTERVAL_MINUTES {
            return Err(TitanError::Configuration(format!(
                "simulation_interval_minutes must be at most {}",
                defaults::MAX_SIMULATION_INTERVAL_MINUTES
            )));
        }
        if self.jwt_secret.is_empty() {
            return Err(TitanError::Configuration(
                "jwt_secret must not be empty".to_string(),
            ));
        }
        if self.is_production()
            && !self.trust_gateway_headers
            && self.jwt_secret == defaults::JWT_SECRET
        {
            return Err(TitanError::Configuration(
                "jwt_secret must be set in production".to_string(),
            ));
        }
        if self.auto_progress_limit == 0 {
            return Err(TitanError::Configuration(
                "auto_progress_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Simulation tick period, clamped to one minute .. one week
    pub fn simulation_interval(&self) -> Duration {
        let minutes = self.simulation_interval_minutes.clamp(
            defaults::MIN_SIMULATION_INTERVAL_MINUTES,
            defaults::MAX_SIMULATION_INTERVAL_MINUTES,
        );
        Duration::from_secs(minutes * 60)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl std::fmt::Debug for TitanConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitanConfig")
            .field("environment", &self.environment)
            .field("database_max_connections", &self.database_max_connections)
            .field("bind_address", &self.bind_address)
            .field("log_format", &self.log_format)
            .field("trust_gateway_headers", &self.trust_gateway_headers)
            .field("simulation_enabled", &self.simulation_enabled)
            .field("simulation_interval_minutes", &self.simulation_interval_minutes)
            .field("auto_progress_limit", &self.auto_progress_limit)
            .finish_non_exhaustive()
    }
}
