//! Bookings ledger.
//!
//! Static prior bookings and player join requests, with the per-viewer
//! filters behind the bookings tabs, the find-players list and the admin
//! dashboard.

use crate::catalog::Catalog;
use crate::types::{
    Booking, BookingId, BookingStatus, ClockTime, PaymentStatus, PlayerRequest, RequestStatus,
    Sport, UserId, Venue, VenueId,
};
use chrono::{DateTime, Days, NaiveDate, Utc};

/// Tabs of the bookings screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookingTab {
    /// Confirmed bookings
    Upcoming,
    /// Played bookings
    Completed,
    /// Cancelled bookings
    Cancelled,
}

impl BookingTab {
    const fn status(self) -> BookingStatus {
        match self {
            Self::Upcoming => BookingStatus::Confirmed,
            Self::Completed => BookingStatus::Completed,
            Self::Cancelled => BookingStatus::Cancelled,
        }
    }
}

/// Date filter of the find-players screen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DateBucket {
    /// Any date
    #[default]
    All,
    /// Today only
    Today,
    /// Tomorrow only
    Tomorrow,
    /// The day after tomorrow, standing in for the weekend
    Weekend,
}

impl DateBucket {
    fn contains(self, date: NaiveDate, today: NaiveDate) -> bool {
        let offset = match self {
            Self::All => return true,
            Self::Today => 0,
            Self::Tomorrow => 1,
            Self::Weekend => 2,
        };
        today.checked_add_days(Days::new(offset)) == Some(date)
    }
}

/// Find-players filter
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerFilter {
    /// Case-insensitive substring of venue name, city or sport
    pub query: Option<String>,
    /// Date bucket
    pub bucket: DateBucket,
}

impl PlayerFilter {
    /// Filter matching every open booking
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to a search query
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Restrict to a date bucket
    #[must_use]
    pub const fn with_bucket(mut self, bucket: DateBucket) -> Self {
        self.bucket = bucket;
        self
    }
}

/// Admin dashboard summary
#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard<'a> {
    /// Venues owned by the admin
    pub venues: Vec<&'a Venue>,
    /// Bookings on those venues
    pub bookings: Vec<&'a Booking>,
    /// Number of bookings
    pub total_bookings: usize,
    /// Number of confirmed bookings
    pub confirmed_bookings: usize,
    /// Sum of booking totals
    pub total_revenue: u64,
}

/// Read-only bookings and join requests
#[derive(Clone, Debug, Default)]
pub struct BookingLedger {
    bookings: Vec<Booking>,
    requests: Vec<PlayerRequest>,
}

impl BookingLedger {
    /// Creates a ledger over the given records
    #[must_use]
    pub const fn new(bookings: Vec<Booking>, requests: Vec<PlayerRequest>) -> Self {
        Self { bookings, requests }
    }

    /// All bookings
    #[must_use]
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Bookings shown on a bookings-screen tab
    #[must_use]
    pub fn bookings_by_tab(&self, tab: BookingTab) -> Vec<&Booking> {
        let status = tab.status();
        self.bookings
            .iter()
            .filter(|booking| booking.booking_status == status)
            .collect()
    }

    /// Bookings made by one user
    #[must_use]
    pub fn bookings_for_user(&self, user_id: &UserId) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|booking| &booking.user_id == user_id)
            .collect()
    }

    /// Open bookings looking for players
    ///
    /// A booking is listed when it is confirmed and still needs players.
    /// The query and the date bucket must both match. With a non-blank
    /// query, bookings whose venue is unknown never match.
    #[must_use]
    pub fn find_players(
        &self,
        catalog: &Catalog,
        filter: &PlayerFilter,
        today: NaiveDate,
    ) -> Vec<&Booking> {
        let query = filter
            .query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
            .map(str::to_lowercase);

        self.bookings
            .iter()
            .filter(|booking| booking.is_open_to_players())
            .filter(|booking| match &query {
                Some(query) => catalog
                    .find_venue(booking.venue_id.as_str())
                    .is_some_and(|venue| {
                        venue.name.to_lowercase().contains(query)
                            || venue.location.city.to_lowercase().contains(query)
                            || booking.sport.as_str().contains(query)
                    }),
                None => true,
            })
            .filter(|booking| filter.bucket.contains(booking.date, today))
            .collect()
    }

    /// Join requests for one booking
    #[must_use]
    pub fn requests_for_booking(&self, booking_id: &BookingId) -> Vec<&PlayerRequest> {
        self.requests
            .iter()
            .filter(|request| &request.booking_id == booking_id)
            .collect()
    }

    /// Admin dashboard for the venues `owner_id` owns
    #[must_use]
    pub fn dashboard<'a>(&'a self, catalog: &'a Catalog, owner_id: &UserId) -> Dashboard<'a> {
        let venues = catalog.owned_by(owner_id);
        let bookings: Vec<&Booking> = self
            .bookings
            .iter()
            .filter(|booking| venues.iter().any(|venue| venue.id == booking.venue_id))
            .collect();

        Dashboard {
            total_bookings: bookings.len(),
            confirmed_bookings: bookings
                .iter()
                .filter(|booking| booking.booking_status == BookingStatus::Confirmed)
                .count(),
            total_revenue: bookings
                .iter()
                .map(|booking| u64::from(booking.total_amount))
                .sum(),
            venues,
            bookings,
        }
    }

    /// The two reference bookings and their join requests
    #[must_use]
    pub fn seeded() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
        let at = |text: &str| {
            DateTime::parse_from_rfc3339(text)
                .map(|time| time.with_timezone(&Utc))
                .unwrap_or_default()
        };

        let bookings = vec![
            Booking {
                id: BookingId::from("booking1"),
                venue_id: VenueId::from("1"),
                user_id: UserId::from("1"),
                date: date(2025, 4, 15),
                start_time: ClockTime::literal(18, 0),
                end_time: ClockTime::literal(19, 0),
                sport: Sport::Football,
                total_players: 10,
                price_per_player: 150,
                total_amount: 1500,
                payment_status: PaymentStatus::Completed,
                booking_status: BookingStatus::Confirmed,
                created_at: at("2025-04-10T15:30:00Z"),
                need_players: true,
                players_needed: 2,
            },
            Booking {
                id: BookingId::from("booking2"),
                venue_id: VenueId::from("2"),
                user_id: UserId::from("1"),
                date: date(2025, 4, 20),
                start_time: ClockTime::literal(16, 0),
                end_time: ClockTime::literal(18, 0),
                sport: Sport::Cricket,
                total_players: 22,
                price_per_player: 180,
                total_amount: 4000,
                payment_status: PaymentStatus::Completed,
                booking_status: BookingStatus::Confirmed,
                created_at: at("2025-04-12T10:15:00Z"),
                need_players: false,
                players_needed: 0,
            },
        ];

        let requests = vec![
            PlayerRequest {
                id: "req1".to_string(),
                booking_id: BookingId::from("booking1"),
                user_id: UserId::from("player2"),
                user_name: "Rahul Sharma".to_string(),
                user_avatar: Some("https://i.pravatar.cc/150?u=player2".to_string()),
                status: RequestStatus::Pending,
                requested_at: at("2025-04-12T14:30:00Z"),
            },
            PlayerRequest {
                id: "req2".to_string(),
                booking_id: BookingId::from("booking1"),
                user_id: UserId::from("player3"),
                user_name: "Priya Patel".to_string(),
                user_avatar: Some("https://i.pravatar.cc/150?u=player3".to_string()),
                status: RequestStatus::Accepted,
                requested_at: at("2025-04-11T09:45:00Z"),
            },
        ];

        Self::new(bookings, requests)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 13).unwrap()
    }

    #[test]
    fn tabs_partition_by_status() {
        let ledger = BookingLedger::seeded();
        assert_eq!(ledger.bookings_by_tab(BookingTab::Upcoming).len(), 2);
        assert!(ledger.bookings_by_tab(BookingTab::Completed).is_empty());
        assert!(ledger.bookings_by_tab(BookingTab::Cancelled).is_empty());
    }

    #[test]
    fn find_players_lists_only_bookings_needing_players() {
        let ledger = BookingLedger::seeded();
        let open = ledger.find_players(&Catalog::seeded(), &PlayerFilter::all(), today());

        let ids: Vec<_> = open.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["booking1"]);
    }

    #[test]
    fn find_players_query_and_bucket_both_apply() {
        let ledger = BookingLedger::seeded();
        let catalog = Catalog::seeded();

        let by_city = PlayerFilter::all().with_query("mumbai");
        assert_eq!(ledger.find_players(&catalog, &by_city, today()).len(), 1);

        let weekend = by_city.clone().with_bucket(DateBucket::Weekend);
        assert_eq!(ledger.find_players(&catalog, &weekend, today()).len(), 1);

        let tomorrow = by_city.with_bucket(DateBucket::Tomorrow);
        assert!(ledger.find_players(&catalog, &tomorrow, today()).is_empty());

        let cricket = PlayerFilter::all().with_query("Cricket");
        assert!(ledger.find_players(&catalog, &cricket, today()).is_empty());
    }

    #[test]
    fn requests_are_grouped_by_booking() {
        let ledger = BookingLedger::seeded();
        assert_eq!(ledger.requests_for_booking(&BookingId::from("booking1")).len(), 2);
        assert!(ledger.requests_for_booking(&BookingId::from("booking2")).is_empty());
    }

    #[test]
    fn dashboard_totals_for_owner() {
        let ledger = BookingLedger::seeded();
        let catalog = Catalog::seeded();

        let dashboard = ledger.dashboard(&catalog, &UserId::from("2"));
        assert_eq!(dashboard.venues.len(), 4);
        assert_eq!(dashboard.total_bookings, 2);
        assert_eq!(dashboard.confirmed_bookings, 2);
        assert_eq!(dashboard.total_revenue, 5500);

        let nobody = ledger.dashboard(&catalog, &UserId::from("1"));
        assert!(nobody.venues.is_empty());
        assert_eq!(nobody.total_revenue, 0);
    }

    #[test]
    fn bookings_for_user_filters_on_booker() {
        let ledger = BookingLedger::seeded();
        assert_eq!(ledger.bookings_for_user(&UserId::from("1")).len(), 2);
        assert!(ledger.bookings_for_user(&UserId::from("2")).is_empty());
    }
}
