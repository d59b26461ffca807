//! JSON seed data for the in-memory store.
//!
//! A seed document lists timezone records and airports. Airports refer to
//! timezones by canonical identifier:
//!
//! ```json
//! {
//!   "timezones": [{"timezone_id": "Europe/London", "raw_offset": 0, "dst_offset": 0}],
//!   "airports": [{"id": "EGLL", "ident": "EGLL", "iata_code": "LHR", "name": "Heathrow",
//!                 "latitude": 51.47, "longitude": -0.46, "timezone": "Europe/London"}]
//! }
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use crate::domain::{Airport, AirportType, Coordinates, OffsetSeconds, TimezoneId, TimezoneLink};

use super::StoreError;
use super::memory::{MemoryStore, Tables};

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    timezones: Vec<SeedTimezone>,
    #[serde(default)]
    airports: Vec<SeedAirport>,
}

#[derive(Debug, Deserialize)]
struct SeedTimezone {
    timezone_id: TimezoneId,
    timezone_name: Option<String>,
    raw_offset: Option<OffsetSeconds>,
    dst_offset: Option<OffsetSeconds>,
    #[serde(default)]
    aliases: Vec<String>,
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct SeedAirport {
    id: String,
    #[serde(default)]
    ident: String,
    iata_code: Option<String>,
    name: String,
    #[serde(rename = "type", default)]
    airport_type: AirportType,
    latitude: f64,
    longitude: f64,
    elevation_ft: Option<f64>,
    continent: Option<String>,
    #[serde(default)]
    iso_country: String,
    iso_region: Option<String>,
    municipality: Option<String>,
    #[serde(default)]
    scheduled_service: bool,
    gps_code: Option<String>,
    local_code: Option<String>,
    home_link: Option<String>,
    wikipedia_link: Option<String>,
    keywords: Option<String>,
    /// Canonical id of the linked timezone.
    timezone: Option<TimezoneId>,
    timezone_refreshed: Option<DateTime<Utc>>,
}

/// Counts of rows loaded from a seed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub timezones: usize,
    pub airports: usize,
}

impl MemoryStore {
    /// Load a seed document from disk.
    pub async fn load_seed(&self, path: impl AsRef<Path>) -> Result<SeedSummary, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| StoreError::Seed {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;

        let summary = self.load_seed_str(&json).await?;
        info!(
            path = %path.display(),
            timezones = summary.timezones,
            airports = summary.airports,
            "loaded seed data"
        );
        Ok(summary)
    }

    /// Load a seed document from a JSON string.
    ///
    /// The whole document is applied under one write lock and is all or
    /// nothing: on error the store is left as it was.
    pub async fn load_seed_str(&self, json: &str) -> Result<SeedSummary, StoreError> {
        let seed: SeedFile = serde_json::from_str(json).map_err(|e| StoreError::Seed {
            message: format!("invalid seed document: {e}"),
        })?;

        let mut tables = self.inner.write().await;
        let summary = SeedSummary {
            timezones: seed.timezones.len(),
            airports: seed.airports.len(),
        };

        let mut staged = tables.clone();
        for tz in seed.timezones {
            apply_timezone(&mut staged, tz);
        }

        for row in seed.airports {
            let airport = build_airport(&mut staged, row)?;
            staged.upsert_airport(airport)?;
        }

        *tables = staged;
        Ok(summary)
    }
}

fn apply_timezone(tables: &mut Tables, tz: SeedTimezone) {
    let (record, _) = tables.get_or_create(&tz.timezone_id);
    record.display_name = tz.timezone_name;
    record.raw_offset = tz.raw_offset;
    record.dst_offset = tz.dst_offset;
    record.last_refreshed = tz.last_updated;
    record.aliases = tz
        .aliases
        .into_iter()
        .filter(|a| a != tz.timezone_id.as_str())
        .collect();
}

fn build_airport(tables: &mut Tables, row: SeedAirport) -> Result<Airport, StoreError> {
    let coordinates = Coordinates::new(row.latitude, row.longitude).map_err(|e| StoreError::Seed {
        message: format!("airport {}: {}", row.id, e),
    })?;

    // Referenced zones that were not declared get an empty record, which the
    // freshness policy treats as stale.
    let timezone = row.timezone.map(|canonical_id| {
        let (record, _) = tables.get_or_create(&canonical_id);
        TimezoneLink {
            record: record.id,
            refreshed_at: row.timezone_refreshed,
        }
    });

    Ok(Airport {
        iata_code: row.iata_code.filter(|c| !c.is_empty()),
        airport_type: row.airport_type,
        elevation_ft: row.elevation_ft,
        continent: row.continent,
        iso_country: row.iso_country,
        iso_region: row.iso_region,
        municipality: row.municipality,
        scheduled_service: row.scheduled_service,
        gps_code: row.gps_code,
        local_code: row.local_code,
        home_link: row.home_link,
        wikipedia_link: row.wikipedia_link,
        keywords: row.keywords,
        timezone,
        ..Airport::new(row.id, row.ident, row.name, coordinates)
    })
}
