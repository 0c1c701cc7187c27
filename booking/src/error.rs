//! Error types for the booking domain.
//!
//! Reducers never return these directly: a failed command is recorded in
//! state as a message (`last_error`, or the unavailable view). The enums give
//! those messages a single source and let non-reducer code use `?`.

use thiserror::Error;

pub use turf_booking_core::environment::StorageError;

/// Why a booking-flow stage could not be entered or a command was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// No venue with this id exists in the catalog
    #[error("Turf {0} not found")]
    VenueNotFound(String),

    /// An upstream parameter the stage needs was absent
    #[error("Missing booking information: {0}")]
    MissingParameter(&'static str),

    /// An upstream parameter was present but out of range
    #[error("Invalid booking information: {0}")]
    InvalidParameter(&'static str),

    /// The date lies outside the bookable window
    #[error("Date {date} is outside the booking window ({first} to {last})")]
    InvalidDate {
        /// Requested date
        date: chrono::NaiveDate,
        /// First bookable date
        first: chrono::NaiveDate,
        /// Last bookable date
        last: chrono::NaiveDate,
    },

    /// The slot does not exist or is already taken
    #[error("Slot {0} is not available")]
    SlotUnavailable(String),

    /// The venue does not offer this sport
    #[error("{0} is not offered at this turf")]
    UnsupportedSport(String),

    /// Continue was pressed before a slot was chosen
    #[error("Select a time slot first")]
    NoSlotSelected,

    /// The command does not apply to the current stage
    #[error("{action} is not allowed during {stage}")]
    InvalidStage {
        /// Rejected action
        action: &'static str,
        /// Current stage name
        stage: &'static str,
    },
}

/// Sign-in, sign-up and sign-out failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// A required form field was empty
    #[error("Please fill in all fields")]
    MissingFields,

    /// Sign-up password and confirmation differ
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The session could not be persisted or removed
    #[error("Session storage failed: {0}")]
    Storage(String),
}

impl From<StorageError> for AuthError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error.to_string())
    }
}

/// Malformed `HH:MM` clock time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid clock time '{input}': {reason}")]
pub struct ParseError {
    /// The rejected text
    pub input: String,
    /// What was wrong with it
    pub reason: &'static str,
}

/// Invalid configuration value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Availability probability outside `0.0..=1.0`
    #[error("TURF_SLOT_AVAILABILITY must be between 0 and 1, got {0}")]
    Probability(f64),

    /// Booking window of zero days
    #[error("TURF_BOOKING_WINDOW_DAYS must be at least 1")]
    EmptyBookingWindow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_messages_match_form_text() {
        assert_eq!(AuthError::MissingFields.to_string(), "Please fill in all fields");
        assert_eq!(AuthError::PasswordMismatch.to_string(), "Passwords do not match");
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }

    #[test]
    fn storage_error_converts_to_auth_error() {
        let error: AuthError = StorageError::Serialization("bad json".to_string()).into();
        assert!(matches!(error, AuthError::Storage(msg) if msg.contains("bad json")));
    }
}
