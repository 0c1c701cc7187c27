//! Configuration management for the turf booking service.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Simulated availability loading latency in milliseconds
    pub availability_delay_ms: u64,
    /// Simulated payment processing latency in milliseconds
    pub payment_delay_ms: u64,
    /// Probability that a generated slot is available
    pub slot_availability: f64,
    /// How many days ahead of today a date can be booked
    pub booking_window_days: u32,
    /// File backing the session key-value store
    pub session_file: PathBuf,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            availability_delay_ms: 600,
            payment_delay_ms: 2000,
            slot_availability: 0.8,
            booking_window_days: 30,
            session_file: PathBuf::from(".turf-session.json"),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            availability_delay_ms: env::var("TURF_AVAILABILITY_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.availability_delay_ms),
            payment_delay_ms: env::var("TURF_PAYMENT_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.payment_delay_ms),
            slot_availability: env::var("TURF_SLOT_AVAILABILITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.slot_availability),
            booking_window_days: env::var("TURF_BOOKING_WINDOW_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.booking_window_days),
            session_file: env::var("TURF_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }

    /// Check values that parse but make no sense
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a probability outside `0..=1` or an empty
    /// booking window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.slot_availability) {
            return Err(ConfigError::Probability(self.slot_availability));
        }
        if self.booking_window_days == 0 {
            return Err(ConfigError::EmptyBookingWindow);
        }
        Ok(())
    }

    /// Availability loading latency
    #[must_use]
    pub const fn availability_delay(&self) -> Duration {
        Duration::from_millis(self.availability_delay_ms)
    }

    /// Payment processing latency
    #[must_use]
    pub const fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_simulated_latencies() {
        let config = Config::default();
        assert_eq!(config.availability_delay(), Duration::from_millis(600));
        assert_eq!(config.payment_delay(), Duration::from_secs(2));
        assert_eq!(config.booking_window_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_probability() {
        let config = Config {
            slot_availability: 1.5,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::Probability(1.5)));
    }

    #[test]
    fn validate_rejects_empty_window() {
        let config = Config {
            booking_window_days: 0,
            ..Config::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyBookingWindow));
    }
}
