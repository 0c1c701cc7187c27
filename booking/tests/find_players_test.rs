//! Find-players listing over the seeded ledger and catalog.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use turf_booking::types::{BookingId, Sport};
use turf_booking::{BookingLedger, BookingTab, Catalog, DateBucket, PlayerFilter, VenueFilter};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
}

#[test]
fn open_booking_appears_only_in_its_bucket() {
    let ledger = BookingLedger::seeded();
    let catalog = Catalog::seeded();
    let booking1 = BookingId::from("booking1");

    let ids = |filter: &PlayerFilter, today| -> Vec<BookingId> {
        ledger
            .find_players(&catalog, filter, today)
            .into_iter()
            .map(|booking| booking.id.clone())
            .collect()
    };

    let today = PlayerFilter::all().with_bucket(DateBucket::Today);
    let tomorrow = PlayerFilter::all().with_bucket(DateBucket::Tomorrow);
    assert_eq!(ids(&today, day(15)), vec![booking1.clone()]);
    assert!(ids(&today, day(14)).is_empty());
    assert_eq!(ids(&tomorrow, day(14)), vec![booking1]);
    assert!(ids(&PlayerFilter::all().with_query("arena"), day(1)).is_empty());
}

#[test]
fn blank_query_matches_everything_open() {
    let ledger = BookingLedger::seeded();
    let filter = PlayerFilter::all().with_query("   ");
    assert_eq!(ledger.find_players(&Catalog::seeded(), &filter, day(1)).len(), 1);
}

#[test]
fn venue_search_and_booking_tabs_agree_with_seed_data() {
    let catalog = Catalog::seeded();
    let cricket: Vec<_> = catalog
        .search(&VenueFilter::all().with_sport(Sport::Cricket))
        .into_iter()
        .map(|venue| venue.id.to_string())
        .collect();
    assert_eq!(cricket, vec!["2", "4"]);

    let ledger = BookingLedger::seeded();
    let upcoming = ledger.bookings_by_tab(BookingTab::Upcoming);
    assert!(upcoming.iter().all(|booking| catalog.find_venue(booking.venue_id.as_str()).is_some()));
}
