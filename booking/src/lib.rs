//! # Turf Booking
//!
//! Domain core of a sports-venue ("turf") booking app.
//!
//! - [`catalog`]: the venue catalog and its search filter
//! - [`availability`]: hourly slot generation for a venue and date
//! - [`flow`]: the booking flow reducer, from venue details to confirmation
//! - [`bookings`]: prior bookings, join requests and the admin dashboard
//! - [`auth`]: sign-in, sign-up, the persisted session and the route guard
//!
//! Mutable behaviour runs through reducers from `turf-booking-core`, driven
//! by the `turf-booking-runtime` store:
//!
//! ```ignore
//! use turf_booking::flow::{BookingFlowState, FlowAction, FlowEnvironment, FlowReducer};
//! use turf_booking_runtime::Store;
//!
//! let store = Store::new(BookingFlowState::new(), FlowReducer::new(), env);
//! store.send(FlowAction::OpenVenue { venue_id: "1".into() }).await?;
//! ```

pub mod auth;
pub mod availability;
pub mod bookings;
pub mod catalog;
pub mod config;
pub mod error;
pub mod flow;
pub mod types;

pub use availability::{AvailabilityGenerator, RandomSlotOracle};
pub use bookings::{BookingLedger, BookingTab, DateBucket, PlayerFilter};
pub use catalog::{Catalog, VenueFilter};
pub use config::Config;
pub use error::{AuthError, ConfigError, FlowError, ParseError};
