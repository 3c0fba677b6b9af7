//! # Engine Configuration Module
//!
//! This module handles loading and managing configuration for the geomark
//! evaluator daemon. It retrieves configuration values from environment
//! variables and provides defaults where appropriate.
//!
//! ## Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `GEOMARK_USER_ID`: identity the daemon evaluates attendance for (required)
//! - `LOG_LEVEL`: logging level (default: "info")
//! - `EVAL_INTERVAL_SECONDS`: evaluator cadence (default: 60)
//! - `LOCATION_TIMEOUT_SECONDS`: budget for a location fix (default: 10)
//! - `GEOLOCATE_URL`: geolocation API endpoint (optional)
//! - `GEOLOCATE_API_KEY`: key appended to the geolocation endpoint (optional)
//! - `GEOMARK_LAT` / `GEOMARK_LNG`: fixed device position used when no
//!   geolocation endpoint is configured

use std::env;
use std::time::Duration;

use eyre::{Result, WrapErr};
use tracing::Level;

/// Configuration for the geomark evaluator daemon.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// PostgreSQL database connection string
    pub database_url: String,

    /// User whose schedule and records this daemon evaluates
    pub user_id: String,

    /// Log level for the application
    pub log_level: Level,

    /// Seconds between evaluator ticks
    pub eval_interval_seconds: u64,

    /// Seconds to wait for a location fix before giving up
    pub location_timeout_seconds: u64,

    /// Geolocation API endpoint (optional)
    pub geolocate_url: Option<String>,

    /// API key for the geolocation endpoint (optional)
    pub geolocate_api_key: Option<String>,

    /// Fixed device latitude, used when no geolocation endpoint is set
    pub fixed_lat: Option<f64>,

    /// Fixed device longitude, used when no geolocation endpoint is set
    pub fixed_lng: Option<f64>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from environment variables.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The GEOMARK_USER_ID environment variable is not set
    pub fn from_env() -> Result<Self> {
        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Identity settings
        let user_id = env::var("GEOMARK_USER_ID")
            .wrap_err("GEOMARK_USER_ID environment variable must be set")?;

        // Logging settings
        let log_level = match env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()).as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // Evaluator cadence
        let eval_interval_seconds = env::var("EVAL_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        let location_timeout_seconds = env::var("LOCATION_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .unwrap_or(10);

        // Geolocation settings
        let geolocate_url = env::var("GEOLOCATE_URL").ok();
        let geolocate_api_key = env::var("GEOLOCATE_API_KEY").ok();
        let fixed_lat = env::var("GEOMARK_LAT").ok().and_then(|v| v.parse().ok());
        let fixed_lng = env::var("GEOMARK_LNG").ok().and_then(|v| v.parse().ok());

        Ok(Self {
            database_url,
            user_id,
            log_level,
            eval_interval_seconds,
            location_timeout_seconds,
            geolocate_url,
            geolocate_api_key,
            fixed_lat,
            fixed_lng,
        })
    }

    /// The evaluator tick period.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(self.eval_interval_seconds)
    }

    /// The budget for one location fix.
    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_seconds)
    }
}
