//! Venue catalog.
//!
//! An in-memory, read-only list of venues with lookup by id, the home-screen
//! search, and the owner filter used by the admin dashboard.

use crate::types::{
    ClockTime, Coordinates, Facility, Location, OperatingHours, Owner, Pricing, Rating, Sport,
    Surface, UserId, Venue, VenueId,
};

/// Home-screen venue filter
///
/// Both parts are optional; when both are set a venue must match both.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VenueFilter {
    /// Only venues offering this sport
    pub sport: Option<Sport>,
    /// Case-insensitive substring of name, city or description
    pub query: Option<String>,
}

impl VenueFilter {
    /// Filter matching every venue
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one sport
    #[must_use]
    pub fn with_sport(mut self, sport: Sport) -> Self {
        self.sport = Some(sport);
        self
    }

    /// Restrict to a search query; blank queries match everything
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    fn matches(&self, venue: &Venue) -> bool {
        if self.sport.is_some_and(|sport| !venue.supports(sport)) {
            return false;
        }

        match self.query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                let query = query.to_lowercase();
                venue.name.to_lowercase().contains(&query)
                    || venue.location.city.to_lowercase().contains(&query)
                    || venue.description.to_lowercase().contains(&query)
            },
            _ => true,
        }
    }
}

/// Read-only venue list
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    venues: Vec<Venue>,
}

impl Catalog {
    /// Creates a catalog over the given venues
    #[must_use]
    pub const fn new(venues: Vec<Venue>) -> Self {
        Self { venues }
    }

    /// All venues in catalog order
    #[must_use]
    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    /// The venue with this id, if any
    #[must_use]
    pub fn find_venue(&self, id: &str) -> Option<&Venue> {
        self.venues.iter().find(|venue| venue.id.as_str() == id)
    }

    /// Venues matching the home-screen filter, in catalog order
    #[must_use]
    pub fn search(&self, filter: &VenueFilter) -> Vec<&Venue> {
        self.venues.iter().filter(|venue| filter.matches(venue)).collect()
    }

    /// Venues owned by an admin
    #[must_use]
    pub fn owned_by(&self, owner_id: &UserId) -> Vec<&Venue> {
        self.venues
            .iter()
            .filter(|venue| &venue.owner.id == owner_id)
            .collect()
    }

    /// The four reference venues
    #[must_use]
    #[allow(clippy::too_many_lines)] // static reference data
    pub fn seeded() -> Self {
        let owner = || Owner {
            id: UserId::from("2"),
            name: "Admin User".to_string(),
        };
        let inr = |hourly| Pricing {
            hourly,
            currency: "INR".to_string(),
        };
        let photos = |urls: &[&str]| -> Vec<String> { urls.iter().map(ToString::to_string).collect() };

        Self::new(vec![
            Venue {
                id: VenueId::from("1"),
                name: "Green Valley Football Turf".to_string(),
                description: "State-of-the-art football turf with premium artificial grass and professional floodlights for night games.".to_string(),
                location: Location {
                    address: "123 Sports Lane, Green Park".to_string(),
                    city: "Mumbai".to_string(),
                    state: "Maharashtra".to_string(),
                    coordinates: Coordinates {
                        latitude: 19.0760,
                        longitude: 72.8777,
                    },
                },
                sports: vec![Sport::Football],
                surfaces: vec![Surface::ArtificialGrass],
                facilities: vec![
                    Facility::Parking,
                    Facility::ChangingRooms,
                    Facility::Floodlights,
                    Facility::Refreshments,
                ],
                photos: photos(&[
                    "https://images.pexels.com/photos/186239/pexels-photo-186239.jpeg",
                    "https://images.pexels.com/photos/114296/pexels-photo-114296.jpeg",
                    "https://images.pexels.com/photos/8032834/pexels-photo-8032834.jpeg",
                ]),
                pricing: inr(1500),
                available_hours: OperatingHours {
                    opening: ClockTime::literal(6, 0),
                    closing: ClockTime::literal(23, 0),
                },
                min_players: 6,
                max_players: 12,
                rating: Rating {
                    average: 4.7,
                    count: 152,
                },
                owner: owner(),
            },
            Venue {
                id: VenueId::from("2"),
                name: "SportzHub Arena".to_string(),
                description: "Multi-sport facility featuring high-quality surfaces for football, cricket, and basketball with excellent amenities.".to_string(),
                location: Location {
                    address: "45 Athletic Avenue, Whitefield".to_string(),
                    city: "Bangalore".to_string(),
                    state: "Karnataka".to_string(),
                    coordinates: Coordinates {
                        latitude: 12.9716,
                        longitude: 77.5946,
                    },
                },
                sports: vec![Sport::Football, Sport::Cricket, Sport::Basketball],
                surfaces: vec![Surface::ArtificialGrass, Surface::Synthetic],
                facilities: vec![
                    Facility::Parking,
                    Facility::ChangingRooms,
                    Facility::Showers,
                    Facility::Floodlights,
                    Facility::EquipmentRental,
                    Facility::Refreshments,
                    Facility::SpectatorArea,
                ],
                photos: photos(&[
                    "https://images.pexels.com/photos/399187/pexels-photo-399187.jpeg",
                    "https://images.pexels.com/photos/3628912/pexels-photo-3628912.jpeg",
                    "https://images.pexels.com/photos/1263426/pexels-photo-1263426.jpeg",
                ]),
                pricing: inr(2000),
                available_hours: OperatingHours {
                    opening: ClockTime::literal(5, 30),
                    closing: ClockTime::literal(22, 30),
                },
                min_players: 4,
                max_players: 22,
                rating: Rating {
                    average: 4.9,
                    count: 213,
                },
                owner: owner(),
            },
            Venue {
                id: VenueId::from("3"),
                name: "Urban Kicks".to_string(),
                description: "Centrally located football turf with night play facilities and a vibrant atmosphere.".to_string(),
                location: Location {
                    address: "78 Downtown Road, Andheri".to_string(),
                    city: "Mumbai".to_string(),
                    state: "Maharashtra".to_string(),
                    coordinates: Coordinates {
                        latitude: 19.1136,
                        longitude: 72.8697,
                    },
                },
                sports: vec![Sport::Football],
                surfaces: vec![Surface::Synthetic],
                facilities: vec![
                    Facility::Floodlights,
                    Facility::Refreshments,
                    Facility::EquipmentRental,
                ],
                photos: photos(&[
                    "https://images.pexels.com/photos/1619860/pexels-photo-1619860.jpeg",
                    "https://images.pexels.com/photos/3621104/pexels-photo-3621104.jpeg",
                ]),
                pricing: inr(1200),
                available_hours: OperatingHours {
                    opening: ClockTime::literal(16, 0),
                    closing: ClockTime::literal(1, 0),
                },
                min_players: 6,
                max_players: 12,
                rating: Rating {
                    average: 4.2,
                    count: 89,
                },
                owner: owner(),
            },
            Venue {
                id: VenueId::from("4"),
                name: "Premium Sports Complex".to_string(),
                description: "Luxury sports facility with multiple turfs, premium amenities, and professional coaching available.".to_string(),
                location: Location {
                    address: "10 Elite Street, Jubilee Hills".to_string(),
                    city: "Hyderabad".to_string(),
                    state: "Telangana".to_string(),
                    coordinates: Coordinates {
                        latitude: 17.4256,
                        longitude: 78.4069,
                    },
                },
                sports: vec![
                    Sport::Football,
                    Sport::Tennis,
                    Sport::Cricket,
                    Sport::Basketball,
                ],
                surfaces: vec![Surface::ArtificialGrass, Surface::Clay, Surface::Concrete],
                facilities: vec![
                    Facility::Parking,
                    Facility::ChangingRooms,
                    Facility::Showers,
                    Facility::Floodlights,
                    Facility::EquipmentRental,
                    Facility::Refreshments,
                    Facility::SpectatorArea,
                ],
                photos: photos(&[
                    "https://images.pexels.com/photos/3601422/pexels-photo-3601422.jpeg",
                    "https://images.pexels.com/photos/5885700/pexels-photo-5885700.jpeg",
                    "https://images.pexels.com/photos/128457/pexels-photo-128457.jpeg",
                ]),
                pricing: inr(2500),
                available_hours: OperatingHours {
                    opening: ClockTime::literal(6, 0),
                    closing: ClockTime::literal(22, 0),
                },
                min_players: 2,
                max_players: 22,
                rating: Rating {
                    average: 4.8,
                    count: 176,
                },
                owner: owner(),
            },
        ])
    }
}
