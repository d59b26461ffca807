//! Response views for airport lookups.
//!
//! Views are owned snapshots built from an airport and its linked record at
//! one point in time. They hold no references back into the stores.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Airport, AirportType, OffsetSeconds, TimezoneRecord};

/// Timezone portion of an airport view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimezoneView {
    pub canonical_id: Option<String>,
    pub display_name: Option<String>,
    pub raw_offset_seconds: Option<i32>,
    pub dst_offset_seconds: Option<i32>,
    pub total_offset_hours: f64,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub aliases: Vec<String>,
}

impl TimezoneView {
    pub fn from_record(record: &TimezoneRecord) -> Self {
        Self {
            canonical_id: record.canonical_id.as_ref().map(|id| id.to_string()),
            display_name: record.display_name.clone(),
            raw_offset_seconds: record.raw_offset.map(OffsetSeconds::secs),
            dst_offset_seconds: record.dst_offset.map(OffsetSeconds::secs),
            total_offset_hours: record.total_offset_hours(),
            last_refreshed: record.last_refreshed,
            aliases: record.aliases.iter().cloned().collect(),
        }
    }
}

/// An airport as returned by the lookup API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportView {
    pub id: String,
    pub ident: String,
    pub iata_code: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub airport_type: AirportType,
    pub latitude: f64,
    pub longitude: f64,
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
    /// Linked timezone, if the link resolves to a record.
    pub timezone: Option<TimezoneView>,
    pub updated: DateTime<Utc>,
}

impl AirportView {
    /// Build a view from an airport and the record its link resolves to.
    pub fn build(airport: &Airport, record: Option<&TimezoneRecord>) -> Self {
        Self {
            id: airport.id.to_string(),
            ident: airport.ident.clone(),
            iata_code: airport.iata_code.clone(),
            name: airport.name.clone(),
            airport_type: airport.airport_type,
            latitude: airport.coordinates.latitude(),
            longitude: airport.coordinates.longitude(),
            elevation_ft: airport.elevation_ft,
            continent: airport.continent.clone(),
            iso_country: airport.iso_country.clone(),
            iso_region: airport.iso_region.clone(),
            municipality: airport.municipality.clone(),
            scheduled_service: airport.scheduled_service,
            gps_code: airport.gps_code.clone(),
            local_code: airport.local_code.clone(),
            home_link: airport.home_link.clone(),
            wikipedia_link: airport.wikipedia_link.clone(),
            keywords: airport.keywords.clone(),
            timezone: record.map(TimezoneView::from_record),
            updated: airport.updated,
        }
    }
}
