//! Domain types for the turf booking service.
//!
//! Venues, slots, bookings, join requests and session users. Field names
//! serialize in camelCase and enum values in `snake_case`, matching the
//! reference data set and the persisted session record.

use crate::error::ParseError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier text
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a venue
    VenueId
);
string_id!(
    /// Unique identifier for a booking
    BookingId
);
string_id!(
    /// Unique identifier for a user
    UserId
);

impl BookingId {
    /// Creates a new random `BookingId`
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl UserId {
    /// Creates a new random `UserId`
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }
}

/// A 24-hour `HH:MM` wall-clock time
///
/// Always valid once constructed: hour `0..=23`, minute `0..=59`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Creates a clock time, rejecting out-of-range components
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if `hour > 23` or `minute > 59`.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ParseError> {
        if hour > 23 {
            return Err(ParseError {
                input: format!("{hour:02}:{minute:02}"),
                reason: "hour must be between 00 and 23",
            });
        }
        if minute > 59 {
            return Err(ParseError {
                input: format!("{hour:02}:{minute:02}"),
                reason: "minute must be between 00 and 59",
            });
        }
        Ok(Self { hour, minute })
    }

    /// Start of the given hour; the hour wraps modulo 24
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // value is below 24 after the modulo
    pub const fn on_the_hour(hour: u32) -> Self {
        Self {
            hour: (hour % 24) as u8,
            minute: 0,
        }
    }

    /// Literal times in the reference data; components must already be in range
    pub(crate) const fn literal(hour: u8, minute: u8) -> Self {
        Self {
            hour: hour % 24,
            minute: minute % 60,
        }
    }

    /// Hour component (0-23)
    #[must_use]
    pub const fn hour(self) -> u8 {
        self.hour
    }

    /// Minute component (0-59)
    #[must_use]
    pub const fn minute(self) -> u8 {
        self.minute
    }

    /// The same minute one hour later, wrapping past midnight
    #[must_use]
    pub const fn next_hour(self) -> Self {
        Self {
            hour: (self.hour + 1) % 24,
            minute: self.minute,
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ParseError {
            input: s.to_string(),
            reason,
        };

        let (hour, minute) = s.split_once(':').ok_or_else(|| invalid("expected HH:MM"))?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid("expected HH:MM"));
        }
        let hour = hour.parse().map_err(|_| invalid("hour is not a number"))?;
        let minute = minute.parse().map_err(|_| invalid("minute is not a number"))?;

        Self::new(hour, minute).map_err(|e| invalid(e.reason))
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Sports a venue can host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    /// Football
    Football,
    /// Cricket
    Cricket,
    /// Tennis
    Tennis,
    /// Basketball
    Basketball,
    /// Volleyball
    Volleyball,
    /// Badminton
    Badminton,
    /// Hockey
    Hockey,
}

impl Sport {
    /// Every sport, in home-screen order
    pub const ALL: [Self; 7] = [
        Self::Football,
        Self::Cricket,
        Self::Basketball,
        Self::Tennis,
        Self::Volleyball,
        Self::Badminton,
        Self::Hockey,
    ];

    /// Lowercase name as stored in the data set
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Football => "football",
            Self::Cricket => "cricket",
            Self::Tennis => "tennis",
            Self::Basketball => "basketball",
            Self::Volleyball => "volleyball",
            Self::Badminton => "badminton",
            Self::Hockey => "hockey",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sport| sport.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown sport '{s}'"))
    }
}

/// Playing surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Surface {
    NaturalGrass,
    ArtificialGrass,
    Synthetic,
    Clay,
    Concrete,
    Wood,
}

/// On-site amenity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Facility {
    Parking,
    ChangingRooms,
    Showers,
    Floodlights,
    EquipmentRental,
    Refreshments,
    SpectatorArea,
}

/// Geographic position
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

/// Postal location of a venue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// State or province
    pub state: String,
    /// Map position
    pub coordinates: Coordinates,
}

/// Flat hourly price
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    /// Price of one hour in whole currency units
    pub hourly: u32,
    /// ISO currency code
    pub currency: String,
}

/// Daily opening window
///
/// `closing <= opening` means the venue stays open past midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    /// Opening time
    pub opening: ClockTime,
    /// Closing time
    pub closing: ClockTime,
}

/// Average review score
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Mean score out of 5
    pub average: f64,
    /// Number of reviews
    pub count: u32,
}

/// Admin who owns a venue
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Owner's user id
    pub id: UserId,
    /// Owner's display name
    pub name: String,
}

/// A bookable sports ground
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    /// Unique identifier
    pub id: VenueId,
    /// Display name
    pub name: String,
    /// Marketing description
    pub description: String,
    /// Where the venue is
    pub location: Location,
    /// Sports that can be booked here (first is the default)
    pub sports: Vec<Sport>,
    /// Surfaces available
    pub surfaces: Vec<Surface>,
    /// Amenities available
    pub facilities: Vec<Facility>,
    /// Photo URLs
    pub photos: Vec<String>,
    /// Hourly price
    pub pricing: Pricing,
    /// Opening window
    pub available_hours: OperatingHours,
    /// Smallest party that can book
    pub min_players: u32,
    /// Largest party that can book
    pub max_players: u32,
    /// Review score
    pub rating: Rating,
    /// Owning admin
    pub owner: Owner,
}

impl Venue {
    /// Whether the venue offers `sport`
    #[must_use]
    pub fn supports(&self, sport: Sport) -> bool {
        self.sports.contains(&sport)
    }

    /// Sport preselected on the slot-selection stage
    #[must_use]
    pub fn default_sport(&self) -> Option<Sport> {
        self.sports.first().copied()
    }

    /// Share of the hourly price for a party of `players`, rounded up
    #[must_use]
    pub const fn price_per_player(&self, players: u32) -> u32 {
        price_per_player(self.pricing.hourly, players)
    }
}

/// `ceil(hourly / players)`; a party of zero pays the whole hour
#[must_use]
pub const fn price_per_player(hourly: u32, players: u32) -> u32 {
    if players == 0 {
        return hourly;
    }
    hourly.div_ceil(players)
}

/// One bookable hour
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Slot start
    pub start_time: ClockTime,
    /// Slot end (one hour later)
    pub end_time: ClockTime,
    /// Whether the slot can be booked
    pub available: bool,
    /// Hourly price
    pub price: u32,
}

/// Slots generated for a venue on one date
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// Venue the slots belong to
    #[serde(rename = "turfId")]
    pub venue_id: VenueId,
    /// Calendar date
    pub date: NaiveDate,
    /// Hourly slots in chronological order
    pub slots: Vec<Slot>,
}

impl Availability {
    /// Slot starting at `start`, if any
    #[must_use]
    pub fn slot_at(&self, start: ClockTime) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.start_time == start)
    }

    /// Number of bookable slots
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.available).count()
    }
}

/// Payment state of a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Lifecycle state of a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

/// A reservation of one venue slot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Unique identifier
    pub id: BookingId,
    /// Booked venue
    #[serde(rename = "turfId")]
    pub venue_id: VenueId,
    /// Booking user
    pub user_id: UserId,
    /// Calendar date
    pub date: NaiveDate,
    /// Start of the booked time
    pub start_time: ClockTime,
    /// End of the booked time
    pub end_time: ClockTime,
    /// Sport played
    pub sport: Sport,
    /// Party size
    pub total_players: u32,
    /// Share paid by each player
    pub price_per_player: u32,
    /// Total charged
    pub total_amount: u32,
    /// Payment state
    pub payment_status: PaymentStatus,
    /// Lifecycle state
    pub booking_status: BookingStatus,
    /// When the booking was made
    pub created_at: DateTime<Utc>,
    /// Whether the booker is looking for more players
    pub need_players: bool,
    /// How many more players are wanted
    pub players_needed: u32,
}

impl Booking {
    /// Listed on the find-players screen
    #[must_use]
    pub fn is_open_to_players(&self) -> bool {
        self.need_players
            && self.players_needed > 0
            && self.booking_status == BookingStatus::Confirmed
    }
}

/// State of a request to join a booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

/// A third-party request to join a booking
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    /// Unique identifier
    pub id: String,
    /// Booking being joined
    pub booking_id: BookingId,
    /// Requesting user
    pub user_id: UserId,
    /// Requesting user's display name
    pub user_name: String,
    /// Requesting user's avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,
    /// Request state
    pub status: RequestStatus,
    /// When the request was made
    pub requested_at: DateTime<Utc>,
}

/// Account role
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Books venues and joins matches
    Player,
    /// Owns venues
    Admin,
}

/// The signed-in user, persisted under the `"user"` key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Sign-in email
    pub email: String,
    /// Account role
    pub role: Role,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Whether the user may open the admin dashboard
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clock_time_parses_and_pads() {
        let time: ClockTime = "05:30".parse().unwrap();
        assert_eq!(time.hour(), 5);
        assert_eq!(time.minute(), 30);
        assert_eq!(time.to_string(), "05:30");
        assert_eq!("9:00".parse::<ClockTime>().unwrap().to_string(), "09:00");
    }

    #[test]
    fn clock_time_rejects_out_of_range() {
        assert!("24:00".parse::<ClockTime>().is_err());
        assert!("12:60".parse::<ClockTime>().is_err());
        assert!("noon".parse::<ClockTime>().is_err());
        assert!("12:5".parse::<ClockTime>().is_err());
    }

    #[test]
    fn next_hour_wraps_at_midnight() {
        assert_eq!(ClockTime::on_the_hour(23).next_hour(), ClockTime::on_the_hour(0));
        assert_eq!(ClockTime::on_the_hour(24), ClockTime::on_the_hour(0));
    }

    #[test]
    fn price_per_player_rounds_up() {
        assert_eq!(price_per_player(1500, 6), 250);
        assert_eq!(price_per_player(1500, 7), 215);
        assert_eq!(price_per_player(1500, 0), 1500);
    }

    #[test]
    fn user_serializes_in_camel_case() {
        let user = User {
            id: UserId::from("1"),
            name: "John Player".to_string(),
            email: "player@example.com".to_string(),
            role: Role::Player,
            avatar: None,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "player");
        assert!(json.get("avatar").is_none());
    }

    #[test]
    fn sport_parses_case_insensitively() {
        assert_eq!("Cricket".parse::<Sport>().unwrap(), Sport::Cricket);
        assert!("curling".parse::<Sport>().is_err());
    }
}
