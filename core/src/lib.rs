//! # Turf Booking Core
//!
//! Core traits and types for the turf booking domain.
//!
//! Every piece of mutable behaviour in the workspace (the booking flow, the
//! signed-in session) is expressed as a reducer:
//!
//! - **State**: Domain state for a feature (a booking-flow stage, a session)
//! - **Action**: All possible inputs to a reducer (user commands and the
//!   events produced by delayed or asynchronous work)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Example
//!
//! ```ignore
//! use turf_booking_core::*;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = CounterEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         env: &CounterEnvironment,
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         state.count += 1;
//!         SmallVec::new()
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// Most reducers return zero or one effect, so the return type is a
    /// `SmallVec` that stays on the stack for up to four effects.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (simulated loading and processing latency)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Dispatch `action` after `duration`
        #[must_use]
        pub fn delay(duration: Duration, action: Action) -> Effect<Action> {
            Effect::Delay {
                duration,
                action: Box::new(action),
            }
        }

        /// Returns the delayed action, if this is an `Effect::Delay`
        #[must_use]
        pub fn delayed_action(&self) -> Option<&Action> {
            match self {
                Effect::Delay { action, .. } => Some(action),
                _ => None,
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, NaiveDate, Utc};
    use std::future::Future;
    use std::pin::Pin;
    use thiserror::Error;

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;

        /// Today's calendar date
        fn today(&self) -> NaiveDate {
            self.now().date_naive()
        }
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Errors raised by a [`KeyValueStore`]
    #[derive(Error, Debug)]
    pub enum StorageError {
        /// The backing file could not be read or written
        #[error("Storage I/O error: {0}")]
        Io(#[from] std::io::Error),

        /// A stored value could not be encoded or decoded
        #[error("Serialization error: {0}")]
        Serialization(String),
    }

    /// Boxed future returned by [`KeyValueStore`] methods
    pub type StorageFuture<'a, T> =
        Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

    /// String key-value persistence (the signed-in session lives here)
    ///
    /// Methods return boxed futures so the store can be shared as
    /// `Arc<dyn KeyValueStore>` inside a reducer environment.
    pub trait KeyValueStore: Send + Sync {
        /// Read the value stored under `key`, `None` if absent
        ///
        /// # Errors
        ///
        /// Returns [`StorageError`] if the backing store cannot be read.
        fn get(&self, key: &str) -> StorageFuture<'_, Option<String>>;

        /// Store `value` under `key`, replacing any previous value
        ///
        /// # Errors
        ///
        /// Returns [`StorageError`] if the backing store cannot be written.
        fn set(&self, key: &str, value: String) -> StorageFuture<'_, ()>;

        /// Delete `key`; deleting a missing key is not an error
        ///
        /// # Errors
        ///
        /// Returns [`StorageError`] if the backing store cannot be written.
        fn remove(&self, key: &str) -> StorageFuture<'_, ()>;
    }

    /// Decides whether an hourly slot is free
    ///
    /// Production draws at random; tests script the answer.
    pub trait SlotOracle: Send + Sync {
        /// Whether the slot starting at `hour` (0..24) on `date` is available
        fn is_available(&self, venue_id: &str, date: NaiveDate, hour: u32) -> bool;
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};
    use std::time::Duration;

    #[test]
    fn delay_helper_boxes_action() {
        let effect = Effect::delay(Duration::from_millis(600), 7_u32);

        assert_eq!(effect.delayed_action(), Some(&7));
        assert!(format!("{effect:?}").contains("Effect::Delay"));
    }

    #[test]
    fn non_delay_effects_have_no_delayed_action() {
        let effect: Effect<u32> = Effect::merge(vec![Effect::None]);
        assert!(effect.delayed_action().is_none());
        assert_eq!(format!("{effect:?}"), "Effect::Parallel([Effect::None])");
    }

    #[test]
    fn system_clock_today_matches_now() {
        let clock = SystemClock;
        let before = clock.now().date_naive();
        let today = clock.today();
        assert!(today >= before);
    }
}
