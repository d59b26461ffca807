//! Airport records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DomainError, TimezoneRecordId};

/// Primary identifier of an airport row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AirportId(pub String);

impl AirportId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Facility type, as classified by the geography import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportType {
    Balloonport,
    Closed,
    Heliport,
    LargeAirport,
    MediumAirport,
    SeaplaneBase,
    #[default]
    SmallAirport,
}

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Latitude must be in [-90, 90] and longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        let valid = (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(DomainError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// An airport's non-owning reference to a timezone record.
///
/// The record id and the airport-level refresh stamp live in one value so
/// they are always replaced together: nobody can observe a new record paired
/// with an old stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneLink {
    pub record: TimezoneRecordId,
    /// When this airport's link was last confirmed. `None` for links set
    /// by an import rather than a resolution.
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// An airport with its geography and optional timezone link.
#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub id: AirportId,
    /// ICAO code or other ident; may be empty for unregistered fields.
    pub ident: String,
    /// IATA code, unique when present.
    pub iata_code: Option<String>,
    pub name: String,
    pub airport_type: AirportType,
    pub coordinates: Coordinates,
    pub elevation_ft: Option<f64>,
    pub continent: Option<String>,
    pub iso_country: String,
    pub iso_region: Option<String>,
    pub municipality: Option<String>,
    pub scheduled_service: bool,
    pub gps_code: Option<String>,
    pub local_code: Option<String>,
    pub home_link: Option<String>,
    pub wikipedia_link: Option<String>,
    pub keywords: Option<String>,
    pub timezone: Option<TimezoneLink>,
    /// Bumped by the store on every write.
    pub updated: DateTime<Utc>,
}

impl Airport {
    /// A minimal airport; the remaining fields can be filled in with struct
    /// update syntax.
    pub fn new(
        id: impl Into<String>,
        ident: impl Into<String>,
        name: impl Into<String>,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            id: AirportId::new(id),
            ident: ident.into(),
            iata_code: None,
            name: name.into(),
            airport_type: AirportType::default(),
            coordinates,
            elevation_ft: None,
            continent: None,
            iso_country: String::new(),
            iso_region: None,
            municipality: None,
            scheduled_service: false,
            gps_code: None,
            local_code: None,
            home_link: None,
            wikipedia_link: None,
            keywords: None,
            timezone: None,
            updated: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// The IATA code if present, otherwise the ident.
    pub fn display_code(&self) -> &str {
        self.iata_code.as_deref().unwrap_or(&self.ident)
    }
}

impl fmt::Display for Airport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.display_code())
    }
}
