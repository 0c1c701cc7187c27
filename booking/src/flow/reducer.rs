//! Reducer logic for the booking flow.
//!
//! Commands are validated against the current stage; a rejected command
//! leaves the stage untouched and records `last_error`. Forward transitions
//! push the previous stage onto the history so `GoBack` can restore it.

use super::params::ParamsTarget;
use super::types::{
    BookingFlowState, BookingStage, Confirmation, ExitDestination, FlowAction, PaymentSummary,
    PlayerSelection, SlotChoice, SlotSelection,
};
use crate::availability::AvailabilityGenerator;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::FlowError;
use crate::types::{BookingId, ClockTime, UserId};
use chrono::{Days, NaiveDate};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;
use turf_booking_core::{
    effect::Effect, environment::Clock, environment::SlotOracle, reducer::Reducer, smallvec,
    SmallVec,
};

/// Environment dependencies for the booking-flow reducer
#[derive(Clone)]
pub struct FlowEnvironment {
    /// Clock for "today" and booking timestamps
    pub clock: Arc<dyn Clock>,
    /// Venue catalog
    pub catalog: Arc<Catalog>,
    /// Slot generator
    pub availability: AvailabilityGenerator,
    /// Simulated availability loading latency
    pub loading_delay: Duration,
    /// Simulated payment processing latency
    pub payment_delay: Duration,
    /// How many days ahead of today a date can be booked
    pub booking_window_days: u32,
}

impl FlowEnvironment {
    /// Creates an environment with the default latencies and booking window
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, catalog: Arc<Catalog>, oracle: Arc<dyn SlotOracle>) -> Self {
        Self::from_config(&Config::default(), clock, catalog, oracle)
    }

    /// Creates an environment using the configured latencies and window
    #[must_use]
    pub fn from_config(
        config: &Config,
        clock: Arc<dyn Clock>,
        catalog: Arc<Catalog>,
        oracle: Arc<dyn SlotOracle>,
    ) -> Self {
        Self {
            clock,
            availability: AvailabilityGenerator::new(Arc::clone(&catalog), oracle),
            catalog,
            loading_delay: config.availability_delay(),
            payment_delay: config.payment_delay(),
            booking_window_days: config.booking_window_days,
        }
    }

    /// Replaces both simulated latencies
    #[must_use]
    pub const fn with_delays(mut self, loading: Duration, payment: Duration) -> Self {
        self.loading_delay = loading;
        self.payment_delay = payment;
        self
    }

    /// Bookable dates: today through `booking_window_days` ahead
    #[must_use]
    pub fn booking_window(&self) -> RangeInclusive<NaiveDate> {
        let today = self.clock.today();
        let last = today
            .checked_add_days(Days::new(u64::from(self.booking_window_days)))
            .unwrap_or(NaiveDate::MAX);
        today..=last
    }
}

impl std::fmt::Debug for FlowEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowEnvironment")
            .field("loading_delay", &self.loading_delay)
            .field("payment_delay", &self.payment_delay)
            .field("booking_window_days", &self.booking_window_days)
            .finish_non_exhaustive()
    }
}

type Effects = SmallVec<[Effect<FlowAction>; 4]>;

/// Reducer for the booking flow
#[derive(Clone, Debug, Default)]
pub struct FlowReducer;

impl FlowReducer {
    /// Creates a new `FlowReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a `SelectDate` command
    fn validate_select_date(
        state: &BookingFlowState,
        date: NaiveDate,
        env: &FlowEnvironment,
    ) -> Result<(), FlowError> {
        state
            .slot_selection()
            .ok_or_else(|| Self::wrong_stage("SelectDate", state))?;

        let window = env.booking_window();
        if !window.contains(&date) {
            return Err(FlowError::InvalidDate {
                date,
                first: *window.start(),
                last: *window.end(),
            });
        }
        Ok(())
    }

    /// Validates a `SelectSlot` command
    fn validate_select_slot(
        state: &BookingFlowState,
        start_time: ClockTime,
    ) -> Result<(), FlowError> {
        let selection = state
            .slot_selection()
            .ok_or_else(|| Self::wrong_stage("SelectSlot", state))?;

        let slot = selection
            .availability
            .as_ref()
            .filter(|_| !selection.is_loading)
            .and_then(|availability| availability.slot_at(start_time));

        match slot {
            Some(slot) if slot.available => Ok(()),
            _ => Err(FlowError::SlotUnavailable(start_time.to_string())),
        }
    }

    /// Builds the slot choice for `ContinueToPlayers`
    fn slot_choice(state: &BookingFlowState) -> Result<SlotChoice, FlowError> {
        let selection = state
            .slot_selection()
            .ok_or_else(|| Self::wrong_stage("ContinueToPlayers", state))?;
        let start_time = selection.selected_slot.ok_or(FlowError::NoSlotSelected)?;
        let slot = selection
            .availability
            .as_ref()
            .and_then(|availability| availability.slot_at(start_time))
            .ok_or(FlowError::NoSlotSelected)?;

        SlotChoice::new(
            selection.venue.clone(),
            selection.selected_date,
            selection.selected_sport,
            slot.clone(),
        )
    }

    const fn wrong_stage(action: &'static str, state: &BookingFlowState) -> FlowError {
        FlowError::InvalidStage {
            action,
            stage: state.stage.name(),
        }
    }

    /// Records a command sent to the wrong stage
    fn reject_stage(state: &mut BookingFlowState, action: &'static str) -> Effects {
        let error = Self::wrong_stage(action, state);
        Self::reject(state, &error)
    }

    /// Records a rejected command
    fn reject(state: &mut BookingFlowState, error: &FlowError) -> Effects {
        tracing::warn!(stage = state.stage.name(), %error, "Booking flow command rejected");
        Self::apply_event(
            state,
            &FlowAction::ValidationFailed {
                error: error.to_string(),
            },
        );
        SmallVec::new()
    }

    /// Moves to `next`, remembering the current stage for `GoBack`
    fn advance(state: &mut BookingFlowState, next: BookingStage) {
        tracing::info!(from = state.stage.name(), to = next.name(), "Booking flow transition");
        let previous = std::mem::replace(&mut state.stage, next);
        state.history.push(previous);
        state.last_error = None;
    }

    /// Replaces the current stage with the unavailable view
    fn unavailable(state: &mut BookingFlowState, error: &FlowError) -> Effects {
        tracing::warn!(stage = state.stage.name(), %error, "Booking information not available");
        Self::advance(
            state,
            BookingStage::Unavailable {
                message: error.to_string(),
            },
        );
        SmallVec::new()
    }

    /// Marks availability for `date` as loading and starts load `request`
    fn load_availability(
        selection: &mut SlotSelection,
        date: NaiveDate,
        request: u64,
        env: &FlowEnvironment,
    ) -> Effects {
        selection.selected_date = date;
        selection.selected_slot = None;
        selection.is_loading = true;
        selection.load_id = request;

        let generator = env.availability.clone();
        let venue_id = selection.venue.id.clone();
        let delay = env.loading_delay;

        smallvec![Effect::Future(Box::pin(async move {
            tokio::time::sleep(delay).await;
            let availability = generator.generate_availability(&venue_id, date);
            Some(FlowAction::AvailabilityLoaded {
                availability,
                request,
            })
        }))]
    }

    /// Numbers the next availability load
    fn next_request(state: &mut BookingFlowState) -> u64 {
        state.availability_requests += 1;
        state.availability_requests
    }

    /// Applies an event to state
    fn apply_event(state: &mut BookingFlowState, action: &FlowAction) {
        match action {
            FlowAction::AvailabilityLoaded {
                availability,
                request,
            } => {
                if let BookingStage::SlotSelection(selection) = &mut state.stage {
                    if selection.is_loading
                        && *request == selection.load_id
                        && availability.date == selection.selected_date
                        && availability.venue_id == selection.venue.id
                    {
                        selection.availability = Some(availability.clone());
                        selection.is_loading = false;
                        selection.selected_slot = None;
                    } else {
                        tracing::debug!(
                            request = *request,
                            current = selection.load_id,
                            loaded = %availability.date,
                            "Discarding stale availability"
                        );
                    }
                }
            },
            FlowAction::ValidationFailed { error } => {
                state.last_error = Some(error.clone());
            },
            // Commands and payment completion are handled in `reduce`
            _ => {},
        }
    }

    fn open_venue(state: &mut BookingFlowState, venue_id: &str, env: &FlowEnvironment) -> Effects {
        match env.catalog.find_venue(venue_id) {
            Some(venue) => {
                Self::advance(
                    state,
                    BookingStage::VenueDetail {
                        venue: venue.clone(),
                    },
                );
                SmallVec::new()
            },
            None => Self::unavailable(state, &FlowError::VenueNotFound(venue_id.to_string())),
        }
    }

    fn check_availability(state: &mut BookingFlowState, env: &FlowEnvironment) -> Effects {
        let BookingStage::VenueDetail { venue } = &state.stage else {
            return Self::reject_stage(state, "CheckAvailability");
        };
        let Some(sport) = venue.default_sport() else {
            let error = FlowError::UnsupportedSport(format!("any sport at {}", venue.name));
            return Self::unavailable(state, &error);
        };

        let mut selection = SlotSelection {
            venue: venue.clone(),
            selected_date: env.clock.today(),
            selected_sport: sport,
            availability: None,
            is_loading: true,
            load_id: 0,
            selected_slot: None,
        };
        let today = selection.selected_date;
        let request = Self::next_request(state);
        let effects = Self::load_availability(&mut selection, today, request, env);

        Self::advance(state, BookingStage::SlotSelection(selection));
        effects
    }

    fn with_players(
        state: &mut BookingFlowState,
        action: &'static str,
        update: impl FnOnce(&mut PlayerSelection),
    ) -> Effects {
        match &mut state.stage {
            BookingStage::PlayerCount(selection) => {
                update(selection);
                state.last_error = None;
                SmallVec::new()
            },
            _ => Self::reject_stage(state, action),
        }
    }

    fn enter_from_params(
        state: &mut BookingFlowState,
        target: ParamsTarget,
        params: &super::params::NavigationParams,
        env: &FlowEnvironment,
    ) -> Effects {
        let window = env.booking_window();
        let stage = match target {
            ParamsTarget::Players => params
                .player_selection(&env.catalog, &window)
                .map(BookingStage::PlayerCount),
            ParamsTarget::Payment => params
                .payment_summary(&env.catalog, &window)
                .map(BookingStage::Payment),
        };

        match stage {
            Ok(stage) => {
                Self::advance(state, stage);
                SmallVec::new()
            },
            Err(error) => Self::unavailable(state, &error),
        }
    }

    fn go_back(state: &mut BookingFlowState) -> Effects {
        let previous = state.history.pop().unwrap_or_default();
        tracing::info!(from = state.stage.name(), to = previous.name(), "Booking flow back");
        state.stage = previous;
        state.last_error = None;
        SmallVec::new()
    }

    fn pay_now(state: &mut BookingFlowState, user_id: UserId, env: &FlowEnvironment) -> Effects {
        let BookingStage::Payment(summary) = &mut state.stage else {
            return Self::reject_stage(state, "PayNow");
        };
        if summary.is_processing {
            tracing::debug!("Payment already processing");
            return SmallVec::new();
        }

        summary.is_processing = true;
        state.last_error = None;
        tracing::info!(total = summary.total_price(), method = ?summary.method, "Processing payment");

        smallvec![Effect::delay(
            env.payment_delay,
            FlowAction::PaymentProcessed {
                booking_id: BookingId::generate(),
                user_id,
            },
        )]
    }

    fn payment_processed(
        state: &mut BookingFlowState,
        booking_id: BookingId,
        user_id: UserId,
        env: &FlowEnvironment,
    ) -> Effects {
        let summary: PaymentSummary = match &state.stage {
            BookingStage::Payment(summary) if summary.is_processing => summary.clone(),
            _ => {
                tracing::debug!(stage = state.stage.name(), "Ignoring payment result");
                return SmallVec::new();
            },
        };

        let venue_name = summary.choice().venue().name.clone();
        let booking = summary.into_booking(booking_id, user_id, env.clock.now());
        tracing::info!(booking_id = %booking.id, total = booking.total_amount, "Booking confirmed");

        Self::advance(
            state,
            BookingStage::Confirmed(Confirmation {
                booking,
                venue_name,
            }),
        );
        // Confirmation replaces the flow; going back starts over
        state.history.clear();
        SmallVec::new()
    }

    fn exit(state: &mut BookingFlowState, destination: ExitDestination, action: &'static str) -> Effects {
        if state.confirmation().is_none() {
            return Self::reject_stage(state, action);
        }
        tracing::info!(?destination, "Leaving booking confirmation");
        state.exit = Some(destination);
        state.last_error = None;
        SmallVec::new()
    }
}

impl Reducer for FlowReducer {
    type State = BookingFlowState;
    type Action = FlowAction;
    type Environment = FlowEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            FlowAction::OpenVenue { venue_id } => Self::open_venue(state, &venue_id, env),

            FlowAction::CheckAvailability => Self::check_availability(state, env),

            FlowAction::SelectDate { date } => {
                if let Err(error) = Self::validate_select_date(state, date, env) {
                    return Self::reject(state, &error);
                }
                state.last_error = None;
                let request = Self::next_request(state);
                match &mut state.stage {
                    BookingStage::SlotSelection(selection) => {
                        Self::load_availability(selection, date, request, env)
                    },
                    _ => SmallVec::new(),
                }
            },

            FlowAction::SelectSport { sport } => match &mut state.stage {
                BookingStage::SlotSelection(selection) if selection.venue.supports(sport) => {
                    selection.selected_sport = sport;
                    state.last_error = None;
                    SmallVec::new()
                },
                BookingStage::SlotSelection(_) => {
                    Self::reject(state, &FlowError::UnsupportedSport(sport.to_string()))
                },
                _ => Self::reject_stage(state, "SelectSport"),
            },

            FlowAction::SelectSlot { start_time } => {
                if let Err(error) = Self::validate_select_slot(state, start_time) {
                    return Self::reject(state, &error);
                }
                if let BookingStage::SlotSelection(selection) = &mut state.stage {
                    selection.selected_slot = Some(start_time);
                }
                state.last_error = None;
                SmallVec::new()
            },

            FlowAction::ContinueToPlayers => match Self::slot_choice(state) {
                Ok(choice) => {
                    Self::advance(state, BookingStage::PlayerCount(PlayerSelection::new(choice)));
                    SmallVec::new()
                },
                Err(error) => Self::reject(state, &error),
            },

            FlowAction::IncrementPlayers => Self::with_players(state, "IncrementPlayers", |s| {
                s.increment();
            }),

            FlowAction::DecrementPlayers => Self::with_players(state, "DecrementPlayers", |s| {
                s.decrement();
            }),

            FlowAction::SetNeedMorePlayers { enabled } => {
                Self::with_players(state, "SetNeedMorePlayers", |s| {
                    s.set_need_more_players(enabled);
                })
            },

            FlowAction::IncrementPlayersNeeded => {
                Self::with_players(state, "IncrementPlayersNeeded", PlayerSelection::increment_needed)
            },

            FlowAction::DecrementPlayersNeeded => {
                Self::with_players(state, "DecrementPlayersNeeded", PlayerSelection::decrement_needed)
            },

            FlowAction::SetPlayersNeeded { count } => {
                Self::with_players(state, "SetPlayersNeeded", |s| {
                    if !s.set_needed(count) {
                        tracing::debug!(count, max = s.max_players_needed(), "Ignoring out-of-range players needed");
                    }
                })
            },

            FlowAction::ContinueToPayment => match state.player_selection() {
                Some(selection) => {
                    let summary = PaymentSummary::from_selection(selection);
                    Self::advance(state, BookingStage::Payment(summary));
                    SmallVec::new()
                },
                None => Self::reject_stage(state, "ContinueToPayment"),
            },

            FlowAction::SelectPaymentMethod { method } => match &mut state.stage {
                BookingStage::Payment(summary) if !summary.is_processing => {
                    summary.method = method;
                    state.last_error = None;
                    SmallVec::new()
                },
                BookingStage::Payment(_) => SmallVec::new(),
                _ => Self::reject_stage(state, "SelectPaymentMethod"),
            },

            FlowAction::PayNow { user_id } => Self::pay_now(state, user_id, env),

            FlowAction::ViewBookings => Self::exit(state, ExitDestination::Bookings, "ViewBookings"),

            FlowAction::GoHome => Self::exit(state, ExitDestination::Home, "GoHome"),

            FlowAction::GoBack => Self::go_back(state),

            FlowAction::EnterFromParams { target, params } => {
                Self::enter_from_params(state, target, &params, env)
            },

            // ========== Events ==========
            FlowAction::PaymentProcessed {
                booking_id,
                user_id,
            } => Self::payment_processed(state, booking_id, user_id, env),

            FlowAction::AvailabilityLoaded { .. } | FlowAction::ValidationFailed { .. } => {
                Self::apply_event(state, &action);
                SmallVec::new()
            },
        }
    }
}
