//! # Turf Booking Testing
//!
//! Testing utilities and helpers for the turf booking reducers.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (clock, key-value store, slot oracle)
//! - The [`ReducerTest`] Given-When-Then harness
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use turf_booking_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(FlowReducer::new())
//!     .with_env(test_environment())
//!     .given_state(BookingFlowState::default())
//!     .when_action(FlowAction::OpenVenue { venue_id: "1".into() })
//!     .then_state(|s| assert_eq!(s.stage.name(), "venue_detail"))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use turf_booking_core::environment::Clock;

pub mod reducer_test;

/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use chrono::{NaiveDate, NaiveTime};
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex, PoisonError};
    use turf_booking_core::environment::{KeyValueStore, SlotOracle, StorageFuture};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use turf_booking_testing::mocks::FixedClock;
    /// use turf_booking_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// Clock frozen at midnight UTC of `date`
        #[must_use]
        pub fn on_date(date: NaiveDate) -> Self {
            Self::new(date.and_time(NaiveTime::MIN).and_utc())
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// In-memory key-value store
    ///
    /// Clones share the same map, so a test can keep a handle and inspect
    /// what a reducer persisted.
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryKeyValueStore {
        entries: Arc<Mutex<HashMap<String, String>>>,
    }

    impl InMemoryKeyValueStore {
        /// Create an empty store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a store pre-populated with one entry
        #[must_use]
        pub fn with_entry(key: &str, value: &str) -> Self {
            let store = Self::new();
            store.lock().insert(key.to_string(), value.to_string());
            store
        }

        /// Synchronous read for assertions
        #[must_use]
        pub fn peek(&self, key: &str) -> Option<String> {
            self.lock().get(key).cloned()
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
            self.entries.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl KeyValueStore for InMemoryKeyValueStore {
        fn get(&self, key: &str) -> StorageFuture<'_, Option<String>> {
            let value = self.peek(key);
            Box::pin(async move { Ok(value) })
        }

        fn set(&self, key: &str, value: String) -> StorageFuture<'_, ()> {
            self.lock().insert(key.to_string(), value);
            Box::pin(async { Ok(()) })
        }

        fn remove(&self, key: &str) -> StorageFuture<'_, ()> {
            self.lock().remove(key);
            Box::pin(async { Ok(()) })
        }
    }

    /// Slot oracle with scripted answers
    ///
    /// Every hour is available except the ones explicitly blocked.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedSlotOracle {
        blocked_hours: HashSet<u32>,
        all_blocked: bool,
    }

    impl ScriptedSlotOracle {
        /// Every slot is available
        #[must_use]
        pub fn all_available() -> Self {
            Self::default()
        }

        /// No slot is available
        #[must_use]
        pub fn none_available() -> Self {
            Self {
                blocked_hours: HashSet::new(),
                all_blocked: true,
            }
        }

        /// Every slot is available except those starting at `hours`
        #[must_use]
        pub fn blocking(hours: impl IntoIterator<Item = u32>) -> Self {
            Self {
                blocked_hours: hours.into_iter().collect(),
                all_blocked: false,
            }
        }
    }

    impl SlotOracle for ScriptedSlotOracle {
        fn is_available(&self, _venue_id: &str, _date: NaiveDate, hour: u32) -> bool {
            !self.all_blocked && !self.blocked_hours.contains(&hour)
        }
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use turf_booking_core::effect::Effect;

    /// Runs `effects` to completion and returns the actions they feed back
    ///
    /// Delays are skipped and each future is driven on its own runtime, so a
    /// reducer test can follow an effect chain without a store. Call it from
    /// synchronous tests only.
    pub fn feedback<A>(effects: impl IntoIterator<Item = Effect<A>>) -> Vec<A> {
        let mut actions = Vec::new();
        for effect in effects {
            match effect {
                Effect::None => {},
                Effect::Parallel(inner) | Effect::Sequential(inner) => {
                    actions.extend(feedback(inner));
                },
                Effect::Delay { action, .. } => actions.push(*action),
                Effect::Future(future) => actions.extend(tokio_test::block_on(future)),
            }
        }
        actions
    }

    /// Install a `tracing` subscriber that writes to the test output
    ///
    /// Safe to call from many tests; only the first call installs.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use chrono::{Days, NaiveDate};
    use proptest::prelude::*;

    /// Dates from `base` up to `base + max_days` inclusive
    pub fn date_within(base: NaiveDate, max_days: u32) -> impl Strategy<Value = NaiveDate> {
        (0..=max_days).prop_map(move |offset| {
            base.checked_add_days(Days::new(u64::from(offset)))
                .unwrap_or(base)
        })
    }

    /// Plausible hourly rates in whole currency units
    pub fn hourly_rate() -> impl Strategy<Value = u32> {
        1_u32..=100_000
    }

    /// `(min_players, max_players)` pairs with `1 <= min <= max`
    pub fn player_bounds() -> impl Strategy<Value = (u32, u32)> {
        (1_u32..=30).prop_flat_map(|min| (Just(min), min..=40))
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, InMemoryKeyValueStore, ScriptedSlotOracle, test_clock};
pub use reducer_test::{ReducerTest, assertions};
