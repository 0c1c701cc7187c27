//! Hourly slot generation.
//!
//! Slots run on the hour from the opening hour up to the closing hour.
//! Minutes are truncated, so a venue opening at `05:30` starts with the
//! `05:00` slot. A closing time at or before the opening time means the
//! venue stays open past midnight and the window wraps.

use crate::catalog::Catalog;
use crate::types::{Availability, ClockTime, OperatingHours, Slot, VenueId};
use chrono::NaiveDate;
use rand::Rng;
use std::sync::Arc;
use turf_booking_core::environment::SlotOracle;

/// Default probability that a slot is free
pub const DEFAULT_SLOT_AVAILABILITY: f64 = 0.8;

/// Draws each slot's availability independently at random
#[derive(Debug, Clone, Copy)]
pub struct RandomSlotOracle {
    probability: f64,
}

impl RandomSlotOracle {
    /// Oracle answering "available" with the given probability, clamped to `0..=1`
    #[must_use]
    pub fn new(probability: f64) -> Self {
        let probability = if probability.is_nan() {
            DEFAULT_SLOT_AVAILABILITY
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self { probability }
    }

    /// Configured success probability
    #[must_use]
    pub const fn probability(&self) -> f64 {
        self.probability
    }
}

impl Default for RandomSlotOracle {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_AVAILABILITY)
    }
}

impl SlotOracle for RandomSlotOracle {
    fn is_available(&self, _venue_id: &str, _date: NaiveDate, _hour: u32) -> bool {
        rand::thread_rng().gen_bool(self.probability)
    }
}

/// Start hours of every slot in the opening window
///
/// Hours past midnight are reported as `24..`; take them modulo 24 for the
/// wall-clock time.
pub fn slot_hours(hours: OperatingHours) -> std::ops::Range<u32> {
    let opening = u32::from(hours.opening.hour());
    let closing = u32::from(hours.closing.hour());

    if closing > opening {
        opening..closing
    } else {
        opening..closing + 24
    }
}

/// Builds [`Availability`] for catalog venues
#[derive(Clone)]
pub struct AvailabilityGenerator {
    catalog: Arc<Catalog>,
    oracle: Arc<dyn SlotOracle>,
}

impl AvailabilityGenerator {
    /// Creates a generator over `catalog` asking `oracle` about each slot
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, oracle: Arc<dyn SlotOracle>) -> Self {
        Self { catalog, oracle }
    }

    /// Hourly slots of `venue_id` on `date`
    ///
    /// An unknown venue yields an empty slot list. Each call draws
    /// availability afresh.
    #[must_use]
    pub fn generate_availability(&self, venue_id: &VenueId, date: NaiveDate) -> Availability {
        let Some(venue) = self.catalog.find_venue(venue_id.as_str()) else {
            tracing::debug!(%venue_id, "No availability for unknown turf");
            return Availability {
                venue_id: venue_id.clone(),
                date,
                slots: Vec::new(),
            };
        };

        let slots = slot_hours(venue.available_hours)
            .map(|hour| {
                let start_time = ClockTime::on_the_hour(hour);
                Slot {
                    start_time,
                    end_time: start_time.next_hour(),
                    available: self.oracle.is_available(venue_id.as_str(), date, hour % 24),
                    price: venue.pricing.hourly,
                }
            })
            .collect();

        Availability {
            venue_id: venue_id.clone(),
            date,
            slots,
        }
    }
}

impl std::fmt::Debug for AvailabilityGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityGenerator")
            .field("venues", &self.catalog.venues().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Always(bool);

    impl SlotOracle for Always {
        fn is_available(&self, _venue_id: &str, _date: NaiveDate, _hour: u32) -> bool {
            self.0
        }
    }

    fn generator(available: bool) -> AvailabilityGenerator {
        AvailabilityGenerator::new(Arc::new(Catalog::seeded()), Arc::new(Always(available)))
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 15).unwrap()
    }

    #[test]
    fn daytime_venue_has_one_slot_per_hour() {
        let availability = generator(true).generate_availability(&VenueId::from("1"), date());

        assert_eq!(availability.slots.len(), 17);
        assert_eq!(availability.slots[0].start_time.to_string(), "06:00");
        assert_eq!(availability.slots[16].end_time.to_string(), "23:00");
        assert!(availability.slots.iter().all(|s| s.price == 1500));
    }

    #[test]
    fn half_hour_opening_is_truncated() {
        let availability = generator(true).generate_availability(&VenueId::from("2"), date());

        assert_eq!(availability.slots.len(), 17);
        assert_eq!(availability.slots[0].start_time.to_string(), "05:00");
        assert_eq!(availability.slots[16].start_time.to_string(), "21:00");
    }

    #[test]
    fn overnight_venue_wraps_past_midnight() {
        let availability = generator(true).generate_availability(&VenueId::from("3"), date());

        assert_eq!(availability.slots.len(), 9);
        let last = availability.slots.last().unwrap();
        assert_eq!(last.start_time.to_string(), "00:00");
        assert_eq!(last.end_time.to_string(), "01:00");
        assert_eq!(availability.slots[7].end_time.to_string(), "00:00");
    }

    #[test]
    fn equal_opening_and_closing_is_open_all_day() {
        let hours = OperatingHours {
            opening: ClockTime::on_the_hour(8),
            closing: ClockTime::on_the_hour(8),
        };
        assert_eq!(slot_hours(hours).len(), 24);
    }

    #[test]
    fn unknown_venue_yields_no_slots() {
        let availability = generator(true).generate_availability(&VenueId::from("42"), date());
        assert!(availability.slots.is_empty());
        assert_eq!(availability.venue_id.as_str(), "42");
    }

    #[test]
    fn oracle_decides_availability() {
        let availability = generator(false).generate_availability(&VenueId::from("4"), date());
        assert_eq!(availability.available_count(), 0);
    }

    #[test]
    fn random_oracle_clamps_probability() {
        assert!((RandomSlotOracle::new(3.0).probability() - 1.0).abs() < f64::EPSILON);
        assert!(RandomSlotOracle::new(-1.0).probability().abs() < f64::EPSILON);
        assert!(
            (RandomSlotOracle::new(f64::NAN).probability() - DEFAULT_SLOT_AVAILABILITY).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn random_oracle_averages_near_probability() {
        let oracle = RandomSlotOracle::default();
        let draws = 20_000;
        let hits = (0..draws)
            .filter(|hour| oracle.is_available("1", date(), hour % 24))
            .count();
        #[allow(clippy::cast_precision_loss)]
        let ratio = hits as f64 / f64::from(draws);
        assert!((0.77..0.83).contains(&ratio), "ratio was {ratio}");
    }
}
