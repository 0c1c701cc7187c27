//! Booking-flow state and actions.
//!
//! Each stage owns a typed context built from the previous stage, so a
//! later stage can never hold data its predecessor did not validate.

use super::params::{NavigationParams, ParamsTarget};
use crate::error::FlowError;
use crate::types::{
    Availability, Booking, BookingId, BookingStatus, ClockTime, PaymentStatus, Slot, Sport,
    UserId, Venue, VenueId,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A chosen venue, date, sport and available slot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotChoice {
    venue: Venue,
    date: NaiveDate,
    sport: Sport,
    slot: Slot,
}

impl SlotChoice {
    /// Validates and freezes a slot choice
    ///
    /// # Errors
    ///
    /// - [`FlowError::UnsupportedSport`] if the venue does not offer `sport`
    /// - [`FlowError::SlotUnavailable`] if the slot is not bookable
    pub fn new(venue: Venue, date: NaiveDate, sport: Sport, slot: Slot) -> Result<Self, FlowError> {
        if !venue.supports(sport) {
            return Err(FlowError::UnsupportedSport(sport.to_string()));
        }
        if !slot.available {
            return Err(FlowError::SlotUnavailable(slot.start_time.to_string()));
        }
        Ok(Self {
            venue,
            date,
            sport,
            slot,
        })
    }

    /// Booked venue
    #[must_use]
    pub const fn venue(&self) -> &Venue {
        &self.venue
    }

    /// Booked date
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Sport to be played
    #[must_use]
    pub const fn sport(&self) -> Sport {
        self.sport
    }

    /// Booked slot
    #[must_use]
    pub const fn slot(&self) -> &Slot {
        &self.slot
    }
}

/// Player count negotiation over a [`SlotChoice`]
///
/// Invariants: `min_players <= player_count <= max_players` and
/// `players_needed <= max_players - player_count`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSelection {
    choice: SlotChoice,
    player_count: u32,
    need_more_players: bool,
    players_needed: u32,
}

impl PlayerSelection {
    /// Starts at the venue's minimum party size
    #[must_use]
    pub const fn new(choice: SlotChoice) -> Self {
        let player_count = choice.venue.min_players;
        Self {
            choice,
            player_count,
            need_more_players: false,
            players_needed: 0,
        }
    }

    /// Restores a negotiated party, checking it against the venue's bounds
    ///
    /// # Errors
    ///
    /// - [`FlowError::InvalidParameter`] if `player_count` is outside the
    ///   venue's range or `players_needed` exceeds the remaining places
    pub fn with_party(
        choice: SlotChoice,
        player_count: u32,
        need_more_players: bool,
        players_needed: u32,
    ) -> Result<Self, FlowError> {
        let venue = &choice.venue;
        if !(venue.min_players..=venue.max_players).contains(&player_count) {
            return Err(FlowError::InvalidParameter("players"));
        }
        if players_needed > venue.max_players - player_count {
            return Err(FlowError::InvalidParameter("playersNeeded"));
        }
        Ok(Self {
            choice,
            player_count,
            need_more_players,
            players_needed,
        })
    }

    /// The slot being booked
    #[must_use]
    pub const fn choice(&self) -> &SlotChoice {
        &self.choice
    }

    /// Current party size
    #[must_use]
    pub const fn player_count(&self) -> u32 {
        self.player_count
    }

    /// Whether the "need more players" counter is shown
    #[must_use]
    pub const fn need_more_players(&self) -> bool {
        self.need_more_players
    }

    /// Extra players wanted
    #[must_use]
    pub const fn players_needed(&self) -> u32 {
        self.players_needed
    }

    /// `ceil(hourly / player_count)`
    #[must_use]
    pub const fn price_per_player(&self) -> u32 {
        self.choice.venue.price_per_player(self.player_count)
    }

    /// Upper bound of the players-needed counter
    #[must_use]
    pub const fn max_players_needed(&self) -> u32 {
        self.choice.venue.max_players.saturating_sub(self.player_count)
    }

    /// One more player; `false` at the maximum
    pub fn increment(&mut self) -> bool {
        if self.player_count >= self.choice.venue.max_players {
            return false;
        }
        self.player_count += 1;
        self.players_needed = self.players_needed.min(self.max_players_needed());
        true
    }

    /// One fewer player; `false` at the minimum
    pub fn decrement(&mut self) -> bool {
        if self.player_count <= self.choice.venue.min_players {
            return false;
        }
        self.player_count -= 1;
        true
    }

    /// Show or hide the players-needed counter
    pub fn set_need_more_players(&mut self, enabled: bool) {
        self.need_more_players = enabled;
    }

    /// One more player wanted, clamped to the upper bound
    pub fn increment_needed(&mut self) {
        self.players_needed = (self.players_needed + 1).min(self.max_players_needed());
    }

    /// One fewer player wanted, never below zero
    pub fn decrement_needed(&mut self) {
        self.players_needed = self.players_needed.saturating_sub(1);
    }

    /// Set the players-needed count; out-of-range values are ignored
    pub fn set_needed(&mut self, count: u32) -> bool {
        if count > self.max_players_needed() {
            return false;
        }
        self.players_needed = count;
        true
    }
}

/// How the booking is paid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit or debit card
    #[default]
    Card,
    /// Mobile wallet
    Wallet,
    /// Bank transfer
    Bank,
}

/// Payment summary frozen from the player stage
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    choice: SlotChoice,
    player_count: u32,
    price_per_player: u32,
    need_more_players: bool,
    players_needed: u32,
    /// Selected payment method
    pub method: PaymentMethod,
    /// Whether payment is in flight
    pub is_processing: bool,
}

impl PaymentSummary {
    /// Freezes the negotiated player selection
    #[must_use]
    pub fn from_selection(selection: &PlayerSelection) -> Self {
        Self {
            choice: selection.choice.clone(),
            player_count: selection.player_count,
            price_per_player: selection.price_per_player(),
            need_more_players: selection.need_more_players,
            players_needed: selection.players_needed,
            method: PaymentMethod::default(),
            is_processing: false,
        }
    }

    /// The slot being booked
    #[must_use]
    pub const fn choice(&self) -> &SlotChoice {
        &self.choice
    }

    /// Party size
    #[must_use]
    pub const fn player_count(&self) -> u32 {
        self.player_count
    }

    /// Share per player
    #[must_use]
    pub const fn price_per_player(&self) -> u32 {
        self.price_per_player
    }

    /// Whether more players are wanted
    #[must_use]
    pub const fn need_more_players(&self) -> bool {
        self.need_more_players
    }

    /// Extra players wanted
    #[must_use]
    pub const fn players_needed(&self) -> u32 {
        self.players_needed
    }

    /// `price_per_player * player_count`; may exceed the hourly price
    #[must_use]
    pub const fn total_price(&self) -> u32 {
        self.price_per_player.saturating_mul(self.player_count)
    }

    /// The booking record produced once payment succeeds
    #[must_use]
    pub fn into_booking(self, id: BookingId, user_id: UserId, created_at: DateTime<Utc>) -> Booking {
        let total_amount = self.total_price();
        let slot = self.choice.slot;
        Booking {
            id,
            venue_id: self.choice.venue.id,
            user_id,
            date: self.choice.date,
            start_time: slot.start_time,
            end_time: slot.end_time,
            sport: self.choice.sport,
            total_players: self.player_count,
            price_per_player: self.price_per_player,
            total_amount,
            payment_status: PaymentStatus::Completed,
            booking_status: BookingStatus::Confirmed,
            created_at,
            need_players: self.need_more_players && self.players_needed > 0,
            players_needed: if self.need_more_players {
                self.players_needed
            } else {
                0
            },
        }
    }
}

/// Slot-selection stage context
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotSelection {
    /// Venue being booked
    pub venue: Venue,
    /// Date whose slots are shown
    pub selected_date: NaiveDate,
    /// Sport to be played
    pub selected_sport: Sport,
    /// Slots for `selected_date`, once loaded
    pub availability: Option<Availability>,
    /// Whether a load for `selected_date` is pending
    pub is_loading: bool,
    /// Request id of the most recent load; older results are discarded
    pub load_id: u64,
    /// Start of the chosen slot
    pub selected_slot: Option<ClockTime>,
}

/// The confirmed booking
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    /// The booking record
    pub booking: Booking,
    /// Venue display name
    pub venue_name: String,
}

/// Where the user went after confirmation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitDestination {
    /// The bookings list
    Bookings,
    /// The home screen
    Home,
}

/// Booking-flow stage
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum BookingStage {
    /// Nothing opened yet
    #[default]
    Start,
    /// Venue details shown
    VenueDetail {
        /// The venue
        venue: Venue,
    },
    /// Choosing date, sport and slot
    SlotSelection(SlotSelection),
    /// Negotiating the party size
    PlayerCount(PlayerSelection),
    /// Reviewing and paying
    Payment(PaymentSummary),
    /// Booked
    Confirmed(Confirmation),
    /// Required information missing
    Unavailable {
        /// Why the stage could not be shown
        message: String,
    },
}

impl BookingStage {
    /// Stable name for logs and errors
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::VenueDetail { .. } => "venue_detail",
            Self::SlotSelection(_) => "slot_selection",
            Self::PlayerCount(_) => "player_count",
            Self::Payment(_) => "payment",
            Self::Confirmed(_) => "confirmed",
            Self::Unavailable { .. } => "unavailable",
        }
    }

    /// Venue the stage is about, if any
    #[must_use]
    pub fn venue_id(&self) -> Option<&VenueId> {
        match self {
            Self::VenueDetail { venue } => Some(&venue.id),
            Self::SlotSelection(selection) => Some(&selection.venue.id),
            Self::PlayerCount(selection) => Some(&selection.choice.venue.id),
            Self::Payment(summary) => Some(&summary.choice.venue.id),
            Self::Confirmed(confirmation) => Some(&confirmation.booking.venue_id),
            Self::Start | Self::Unavailable { .. } => None,
        }
    }
}

/// State of one booking flow
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingFlowState {
    /// Current stage
    pub stage: BookingStage,
    /// Earlier stages, most recent last
    pub history: Vec<BookingStage>,
    /// Exit chosen on the confirmation stage
    pub exit: Option<ExitDestination>,
    /// Last rejected command (if any)
    pub last_error: Option<String>,
    /// Availability loads issued so far; numbers each load request
    pub availability_requests: u64,
}

impl BookingFlowState {
    /// Creates a flow with nothing opened
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot-selection context, if on that stage
    #[must_use]
    pub const fn slot_selection(&self) -> Option<&SlotSelection> {
        match &self.stage {
            BookingStage::SlotSelection(selection) => Some(selection),
            _ => None,
        }
    }

    /// The player-count context, if on that stage
    #[must_use]
    pub const fn player_selection(&self) -> Option<&PlayerSelection> {
        match &self.stage {
            BookingStage::PlayerCount(selection) => Some(selection),
            _ => None,
        }
    }

    /// The payment context, if on that stage
    #[must_use]
    pub const fn payment(&self) -> Option<&PaymentSummary> {
        match &self.stage {
            BookingStage::Payment(summary) => Some(summary),
            _ => None,
        }
    }

    /// The confirmed booking, if the flow finished
    #[must_use]
    pub const fn confirmation(&self) -> Option<&Confirmation> {
        match &self.stage {
            BookingStage::Confirmed(confirmation) => Some(confirmation),
            _ => None,
        }
    }
}

/// Actions representing commands and events of the booking flow
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FlowAction {
    // ========== Commands ==========
    /// Command: Show a venue's details
    OpenVenue {
        /// Venue to show
        venue_id: String,
    },

    /// Command: Move from venue details to slot selection
    CheckAvailability,

    /// Command: Show slots for another date
    SelectDate {
        /// Date to show
        date: NaiveDate,
    },

    /// Command: Choose the sport to play
    SelectSport {
        /// Sport to play
        sport: Sport,
    },

    /// Command: Choose a slot
    SelectSlot {
        /// Start of the slot
        start_time: ClockTime,
    },

    /// Command: Move from slot selection to player count
    ContinueToPlayers,

    /// Command: One more player
    IncrementPlayers,

    /// Command: One fewer player
    DecrementPlayers,

    /// Command: Toggle the players-needed counter
    SetNeedMorePlayers {
        /// Whether the counter is shown
        enabled: bool,
    },

    /// Command: One more player wanted
    IncrementPlayersNeeded,

    /// Command: One fewer player wanted
    DecrementPlayersNeeded,

    /// Command: Type the number of players wanted
    SetPlayersNeeded {
        /// Players wanted
        count: u32,
    },

    /// Command: Move from player count to payment
    ContinueToPayment,

    /// Command: Choose how to pay
    SelectPaymentMethod {
        /// Payment method
        method: PaymentMethod,
    },

    /// Command: Pay for the booking
    PayNow {
        /// Paying user
        user_id: UserId,
    },

    /// Command: Leave confirmation for the bookings list
    ViewBookings,

    /// Command: Leave confirmation for the home screen
    GoHome,

    /// Command: Return to the previous stage
    GoBack,

    /// Command: Rebuild a stage from flat navigation parameters
    EnterFromParams {
        /// Stage to rebuild
        target: ParamsTarget,
        /// Flat parameter set
        params: NavigationParams,
    },

    // ========== Events ==========
    /// Event: Slots for a date finished loading
    AvailabilityLoaded {
        /// Loaded slots
        availability: Availability,
        /// Load request this answers
        request: u64,
    },

    /// Event: Simulated payment finished
    PaymentProcessed {
        /// Id of the new booking
        booking_id: BookingId,
        /// Paying user
        user_id: UserId,
    },

    /// Event: Command validation failed
    ValidationFailed {
        /// Error message
        error: String,
    },
}

impl FlowAction {
    /// Stable name for logs and errors
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OpenVenue { .. } => "OpenVenue",
            Self::CheckAvailability => "CheckAvailability",
            Self::SelectDate { .. } => "SelectDate",
            Self::SelectSport { .. } => "SelectSport",
            Self::SelectSlot { .. } => "SelectSlot",
            Self::ContinueToPlayers => "ContinueToPlayers",
            Self::IncrementPlayers => "IncrementPlayers",
            Self::DecrementPlayers => "DecrementPlayers",
            Self::SetNeedMorePlayers { .. } => "SetNeedMorePlayers",
            Self::IncrementPlayersNeeded => "IncrementPlayersNeeded",
            Self::DecrementPlayersNeeded => "DecrementPlayersNeeded",
            Self::SetPlayersNeeded { .. } => "SetPlayersNeeded",
            Self::ContinueToPayment => "ContinueToPayment",
            Self::SelectPaymentMethod { .. } => "SelectPaymentMethod",
            Self::PayNow { .. } => "PayNow",
            Self::ViewBookings => "ViewBookings",
            Self::GoHome => "GoHome",
            Self::GoBack => "GoBack",
            Self::EnterFromParams { .. } => "EnterFromParams",
            Self::AvailabilityLoaded { .. } => "AvailabilityLoaded",
            Self::PaymentProcessed { .. } => "PaymentProcessed",
            Self::ValidationFailed { .. } => "ValidationFailed",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn choice(venue_id: &str) -> SlotChoice {
        let venue = Catalog::seeded().find_venue(venue_id).unwrap().clone();
        let hourly = venue.pricing.hourly;
        let sport = venue.default_sport().unwrap();
        SlotChoice::new(
            venue,
            NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
            sport,
            Slot {
                start_time: ClockTime::on_the_hour(18),
                end_time: ClockTime::on_the_hour(19),
                available: true,
                price: hourly,
            },
        )
        .unwrap()
    }

    #[test]
    fn slot_choice_rejects_unavailable_slot() {
        let venue = Catalog::seeded().find_venue("1").unwrap().clone();
        let result = SlotChoice::new(
            venue,
            NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
            Sport::Football,
            Slot {
                start_time: ClockTime::on_the_hour(7),
                end_time: ClockTime::on_the_hour(8),
                available: false,
                price: 1500,
            },
        );
        assert_eq!(result, Err(FlowError::SlotUnavailable("07:00".to_string())));
    }

    #[test]
    fn slot_choice_rejects_unsupported_sport() {
        let original = choice("1");
        let result = SlotChoice::new(
            original.venue().clone(),
            original.date(),
            Sport::Tennis,
            original.slot().clone(),
        );
        assert_eq!(result, Err(FlowError::UnsupportedSport("tennis".to_string())));
    }

    #[test]
    fn raising_player_count_reclamps_players_needed() {
        let mut selection = PlayerSelection::new(choice("1"));
        assert_eq!(selection.player_count(), 6);
        assert!(selection.set_needed(6));
        assert!(selection.increment());
        assert_eq!(selection.players_needed(), 5);
        assert!(!selection.set_needed(6));
    }

    #[test]
    fn restored_party_must_fit_the_venue() {
        let selection = PlayerSelection::with_party(choice("1"), 10, true, 2).unwrap();
        assert_eq!(selection.player_count(), 10);
        assert_eq!(selection.price_per_player(), 150);

        assert_eq!(
            PlayerSelection::with_party(choice("1"), 99, false, 0),
            Err(FlowError::InvalidParameter("players"))
        );
        assert_eq!(
            PlayerSelection::with_party(choice("1"), 5, false, 0),
            Err(FlowError::InvalidParameter("players"))
        );
        assert_eq!(
            PlayerSelection::with_party(choice("1"), 10, true, 3),
            Err(FlowError::InvalidParameter("playersNeeded"))
        );
    }

    #[test]
    fn stage_venue_follows_the_flow() {
        let selection = PlayerSelection::new(choice("3"));
        assert_eq!(
            BookingStage::PlayerCount(selection.clone()).venue_id(),
            Some(&VenueId::from("3"))
        );
        assert_eq!(
            BookingStage::Payment(PaymentSummary::from_selection(&selection)).venue_id(),
            Some(&VenueId::from("3"))
        );
        assert_eq!(BookingStage::Start.venue_id(), None);
    }

    #[test]
    fn summary_total_can_exceed_hourly_price() {
        let mut selection = PlayerSelection::new(choice("1"));
        selection.increment();
        assert_eq!(selection.price_per_player(), 215);

        let summary = PaymentSummary::from_selection(&selection);
        assert_eq!(summary.total_price(), 1505);
        assert_eq!(summary.method, PaymentMethod::Card);
    }

    #[test]
    fn booking_drops_players_needed_when_toggle_off() {
        let mut selection = PlayerSelection::new(choice("1"));
        selection.set_needed(2);

        let booking = PaymentSummary::from_selection(&selection).into_booking(
            BookingId::from("b"),
            UserId::from("1"),
            Utc::now(),
        );
        assert!(!booking.need_players);
        assert_eq!(booking.players_needed, 0);
        assert_eq!(booking.payment_status, PaymentStatus::Completed);
        assert_eq!(booking.booking_status, BookingStatus::Confirmed);
    }
}
