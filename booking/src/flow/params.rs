//! Flat navigation parameters.
//!
//! Deep links and screen resumption carry the flow's context as a flat
//! string map. This is the only place the string form exists: it is parsed
//! into typed stage contexts on the way in and rendered from them on the
//! way out. Numeric values fall back to zero when they do not parse, and
//! every value is checked against the venue and booking window as if the
//! user had entered it on the skipped screens.

use super::types::{PaymentSummary, PlayerSelection, SlotChoice};
use crate::availability::slot_hours;
use crate::catalog::Catalog;
use crate::error::FlowError;
use crate::types::{ClockTime, Slot, Sport};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Parameter keys
pub mod keys {
    /// Venue id
    pub const TURF_ID: &str = "turfId";
    /// `YYYY-MM-DD` date
    pub const DATE: &str = "date";
    /// `HH:MM` slot start
    pub const TIME: &str = "time";
    /// Sport name
    pub const SPORT: &str = "sport";
    /// Party size
    pub const PLAYERS: &str = "players";
    /// `true` when more players are wanted
    pub const NEED_PLAYERS: &str = "needPlayers";
    /// Extra players wanted
    pub const PLAYERS_NEEDED: &str = "playersNeeded";
    /// Share per player
    pub const PRICE_PER_PLAYER: &str = "pricePerPlayer";
}

/// Stage an [`EnterFromParams`](super::FlowAction::EnterFromParams) rebuilds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamsTarget {
    /// Player-count stage
    Players,
    /// Payment stage
    Payment,
}

/// Flat string-keyed parameter set
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationParams(BTreeMap<String, String>);

impl NavigationParams {
    /// Empty parameter set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one parameter
    #[must_use]
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    /// Raw value of a parameter
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Numeric value, zero when absent or malformed
    #[must_use]
    pub fn number(&self, key: &str) -> u32 {
        self.get(key)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0)
    }

    /// `true` only for the literal `"true"`
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    /// Parameters handed from slot selection to the player stage
    #[must_use]
    pub fn from_choice(choice: &SlotChoice) -> Self {
        Self::new()
            .with(keys::TURF_ID, &choice.venue().id)
            .with(keys::DATE, choice.date())
            .with(keys::TIME, choice.slot().start_time)
            .with(keys::SPORT, choice.sport())
    }

    /// Parameters handed from the player stage to payment
    #[must_use]
    pub fn from_selection(selection: &PlayerSelection) -> Self {
        Self::from_choice(selection.choice())
            .with(keys::PLAYERS, selection.player_count())
            .with(keys::NEED_PLAYERS, selection.need_more_players())
            .with(keys::PLAYERS_NEEDED, selection.players_needed())
            .with(keys::PRICE_PER_PLAYER, selection.price_per_player())
    }

    /// Rebuilds the slot choice these parameters describe
    ///
    /// The slot is taken as available once it lies on the venue's hourly
    /// grid: the flow already committed to it upstream.
    ///
    /// # Errors
    ///
    /// - [`FlowError::MissingParameter`] for a missing venue, date or time
    /// - [`FlowError::VenueNotFound`] for an unknown venue
    /// - [`FlowError::InvalidDate`] for a date outside `window`
    /// - [`FlowError::SlotUnavailable`] for a time that is not a slot start
    /// - [`FlowError::UnsupportedSport`] for a sport the venue does not offer
    pub fn slot_choice(
        &self,
        catalog: &Catalog,
        window: &RangeInclusive<NaiveDate>,
    ) -> Result<SlotChoice, FlowError> {
        let venue_id = self
            .get(keys::TURF_ID)
            .filter(|id| !id.is_empty())
            .ok_or(FlowError::MissingParameter(keys::TURF_ID))?;
        let venue = catalog
            .find_venue(venue_id)
            .ok_or_else(|| FlowError::VenueNotFound(venue_id.to_string()))?;

        let date = self
            .get(keys::DATE)
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
            .ok_or(FlowError::MissingParameter(keys::DATE))?;
        if !window.contains(&date) {
            return Err(FlowError::InvalidDate {
                date,
                first: *window.start(),
                last: *window.end(),
            });
        }

        let start_time: ClockTime = self
            .get(keys::TIME)
            .and_then(|time| time.parse().ok())
            .ok_or(FlowError::MissingParameter(keys::TIME))?;
        let on_grid = start_time.minute() == 0
            && slot_hours(venue.available_hours)
                .any(|hour| hour % 24 == u32::from(start_time.hour()));
        if !on_grid {
            return Err(FlowError::SlotUnavailable(start_time.to_string()));
        }

        let sport = match self.get(keys::SPORT) {
            Some(sport) => sport
                .parse::<Sport>()
                .map_err(|_| FlowError::UnsupportedSport(sport.to_string()))?,
            None => venue
                .default_sport()
                .ok_or(FlowError::MissingParameter(keys::SPORT))?,
        };

        let slot = Slot {
            start_time,
            end_time: start_time.next_hour(),
            available: true,
            price: venue.pricing.hourly,
        };

        SlotChoice::new(venue.clone(), date, sport, slot)
    }

    /// Rebuilds the player stage at the venue's minimum party size
    ///
    /// # Errors
    ///
    /// See [`NavigationParams::slot_choice`].
    pub fn player_selection(
        &self,
        catalog: &Catalog,
        window: &RangeInclusive<NaiveDate>,
    ) -> Result<PlayerSelection, FlowError> {
        self.slot_choice(catalog, window).map(PlayerSelection::new)
    }

    /// Rebuilds the payment stage
    ///
    /// The party is checked against the venue's bounds and the share is
    /// recomputed from the venue's hourly price; `pricePerPlayer` is only
    /// ever written, never trusted.
    ///
    /// # Errors
    ///
    /// - [`FlowError::InvalidParameter`] for a party the venue cannot host
    /// - anything [`NavigationParams::slot_choice`] returns
    pub fn payment_summary(
        &self,
        catalog: &Catalog,
        window: &RangeInclusive<NaiveDate>,
    ) -> Result<PaymentSummary, FlowError> {
        let choice = self.slot_choice(catalog, window)?;
        let selection = PlayerSelection::with_party(
            choice,
            self.number(keys::PLAYERS),
            self.flag(keys::NEED_PLAYERS),
            self.number(keys::PLAYERS_NEEDED),
        )?;
        Ok(PaymentSummary::from_selection(&selection))
    }
}

impl FromIterator<(String, String)> for NavigationParams {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn window() -> RangeInclusive<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()..=NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    fn payment_params() -> NavigationParams {
        NavigationParams::new()
            .with(keys::TURF_ID, "1")
            .with(keys::DATE, "2025-04-15")
            .with(keys::TIME, "18:00")
            .with(keys::SPORT, "football")
            .with(keys::PLAYERS, 10)
            .with(keys::NEED_PLAYERS, true)
            .with(keys::PLAYERS_NEEDED, 2)
            .with(keys::PRICE_PER_PLAYER, 150)
    }

    #[test]
    fn payment_summary_from_params() {
        let summary = payment_params()
            .payment_summary(&Catalog::seeded(), &window())
            .unwrap();

        assert_eq!(summary.player_count(), 10);
        assert_eq!(summary.total_price(), 1500);
        assert!(summary.need_more_players());
        assert_eq!(summary.players_needed(), 2);
        assert_eq!(summary.choice().slot().end_time.to_string(), "19:00");
    }

    #[test]
    fn price_is_recomputed_from_the_venue() {
        let summary = payment_params()
            .with(keys::PRICE_PER_PLAYER, 1)
            .payment_summary(&Catalog::seeded(), &window())
            .unwrap();

        assert_eq!(summary.price_per_player(), 150);
        assert_eq!(summary.total_price(), 1500);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let params = payment_params()
            .with(keys::PLAYERS, "ten")
            .with(keys::NEED_PLAYERS, "yes");

        assert_eq!(
            params.payment_summary(&Catalog::seeded(), &window()),
            Err(FlowError::InvalidParameter("players"))
        );
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let catalog = Catalog::seeded();

        let past = payment_params().with(keys::DATE, "1999-01-01");
        assert!(matches!(
            past.payment_summary(&catalog, &window()),
            Err(FlowError::InvalidDate { .. })
        ));

        // Venue 1 opens at 06:00
        let closed = payment_params().with(keys::TIME, "03:00");
        assert_eq!(
            closed.payment_summary(&catalog, &window()),
            Err(FlowError::SlotUnavailable("03:00".to_string()))
        );

        let half_past = payment_params().with(keys::TIME, "18:30");
        assert_eq!(
            half_past.slot_choice(&catalog, &window()),
            Err(FlowError::SlotUnavailable("18:30".to_string()))
        );

        let crowd = payment_params().with(keys::PLAYERS, 99);
        assert_eq!(
            crowd.payment_summary(&catalog, &window()),
            Err(FlowError::InvalidParameter("players"))
        );

        let wanted = payment_params().with(keys::PLAYERS_NEEDED, 40);
        assert_eq!(
            wanted.payment_summary(&catalog, &window()),
            Err(FlowError::InvalidParameter("playersNeeded"))
        );
    }

    #[test]
    fn after_midnight_slots_are_on_the_grid() {
        // Venue 3 is open 16:00 to 01:00
        let choice = payment_params()
            .with(keys::TURF_ID, "3")
            .with(keys::TIME, "00:00")
            .slot_choice(&Catalog::seeded(), &window())
            .unwrap();
        assert_eq!(choice.slot().end_time.to_string(), "01:00");
    }

    #[test]
    fn missing_or_unknown_venue_is_an_error() {
        let catalog = Catalog::seeded();

        let missing = NavigationParams::new().with(keys::DATE, "2025-04-15");
        assert_eq!(
            missing.slot_choice(&catalog, &window()),
            Err(FlowError::MissingParameter("turfId"))
        );

        let unknown = payment_params().with(keys::TURF_ID, "99");
        assert_eq!(
            unknown.slot_choice(&catalog, &window()),
            Err(FlowError::VenueNotFound("99".to_string()))
        );
    }

    #[test]
    fn missing_sport_defaults_to_venue_first_sport() {
        let params: NavigationParams = payment_params()
            .0
            .into_iter()
            .filter(|(key, _)| key != keys::SPORT)
            .collect();
        let choice = params
            .with(keys::TURF_ID, "2")
            .slot_choice(&Catalog::seeded(), &window())
            .unwrap();
        assert_eq!(choice.sport(), Sport::Football);
    }

    #[test]
    fn selection_renders_flat_params() {
        let selection = payment_params()
            .player_selection(&Catalog::seeded(), &window())
            .unwrap();
        let params = NavigationParams::from_selection(&selection);

        assert_eq!(params.get(keys::PLAYERS), Some("6"));
        assert_eq!(params.get(keys::PRICE_PER_PLAYER), Some("250"));
        assert_eq!(params.get(keys::NEED_PLAYERS), Some("false"));
        assert_eq!(params.get(keys::TIME), Some("18:00"));
    }
}
