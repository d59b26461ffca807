//! Record stores for airports and timezone records.
//!
//! The traits here are the boundary to persistence. The lookup core only
//! needs keyed reads, an atomic "get or create by canonical identifier" for
//! timezone records and an atomic replacement of an airport's timezone link.
//! [`MemoryStore`] implements all of them over in-process tables.

mod memory;
mod seed;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Airport, AirportId, LookupCode, TimezoneId, TimezoneLink, TimezoneRecord, TimezoneRecordId,
};
use crate::resolver::ResolvedTimezone;

pub use memory::MemoryStore;
pub use seed::SeedSummary;

/// Errors from the record stores.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("airport {0} not found")]
    AirportNotFound(AirportId),

    #[error("timezone record {0} not found")]
    TimezoneNotFound(TimezoneRecordId),

    /// A row tried to claim an IATA code another airport holds
    #[error("IATA code {code} already belongs to airport {existing}")]
    DuplicateIata { code: String, existing: AirportId },

    /// Deletion refused while airports still link the record
    #[error("timezone record {record} is linked by {airports} airport(s)")]
    InUse {
        record: TimezoneRecordId,
        airports: usize,
    },

    /// Seed file could not be read or parsed
    #[error("seed error: {message}")]
    Seed { message: String },
}

/// Result of an upsert by canonical identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted {
    pub record: TimezoneRecord,
    /// True if no record existed for the identifier before.
    pub created: bool,
}

/// Keyed access to airports.
#[async_trait]
pub trait AirportStore: Send + Sync {
    /// Find an airport by IATA code or ident, depending on the code's kind.
    async fn find_by_code(&self, code: &LookupCode) -> Result<Option<Airport>, StoreError>;

    /// Fetch an airport by primary id.
    async fn get(&self, id: &AirportId) -> Result<Option<Airport>, StoreError>;

    /// Primary ids of every airport, in id order.
    async fn ids(&self) -> Result<Vec<AirportId>, StoreError>;

    /// Replace the airport's timezone link in a single write.
    ///
    /// Fails if the airport or the linked record does not exist.
    async fn set_timezone_link(
        &self,
        id: &AirportId,
        link: TimezoneLink,
    ) -> Result<Airport, StoreError>;
}

/// Keyed access to timezone records.
#[async_trait]
pub trait TimezoneStore: Send + Sync {
    async fn get(&self, id: TimezoneRecordId) -> Result<Option<TimezoneRecord>, StoreError>;

    async fn find_by_canonical_id(
        &self,
        canonical_id: &TimezoneId,
    ) -> Result<Option<TimezoneRecord>, StoreError>;

    /// Create or update the record for `resolved.canonical_id` in one atomic
    /// step, stamping it with `now`. Concurrent calls for the same identifier
    /// never produce two records.
    async fn upsert_resolved(
        &self,
        resolved: &ResolvedTimezone,
        now: DateTime<Utc>,
    ) -> Result<Upserted, StoreError>;

    /// Delete a record. Refused while any airport links it.
    async fn delete(&self, id: TimezoneRecordId) -> Result<(), StoreError>;
}

/// Bulk import of airport geography.
#[async_trait]
pub trait AirportLoader: Send + Sync {
    /// Insert or replace airports by primary id. An incoming row without a
    /// timezone link keeps the existing one. Returns the number of rows written.
    ///
    /// The batch is all or nothing: if any row is rejected, no row is written.
    async fn upsert_airports(&self, rows: Vec<Airport>) -> Result<usize, StoreError>;
}

/// Bulk annotation of timezone records with alias sets.
#[async_trait]
pub trait AliasLoader: Send + Sync {
    /// Apply a `canonical id -> aliases` table to existing records. Returns the
    /// number of records annotated; records are never created.
    async fn apply_aliases(&self, table: &BTreeMap<String, Vec<String>>)
    -> Result<usize, StoreError>;
}
