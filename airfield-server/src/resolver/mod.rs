//! External timezone resolver.
//!
//! Maps a coordinate pair and an instant to a timezone descriptor. The
//! production implementation calls the Google Maps Time Zone API; tests use
//! the scripted [`MockResolver`].
//!
//! Key characteristics of the API:
//! - Offsets are returned in seconds and reflect DST at the given timestamp
//! - Failures come both as HTTP statuses and as a `status` field in a 200 body
//! - `ZERO_RESULTS` means the point has no timezone (e.g. open ocean)

mod client;
mod error;
mod mock;
mod types;

use async_trait::async_trait;

use crate::domain::{Coordinates, OffsetSeconds, TimezoneId};

pub use client::{ResolverConfig, TimezoneApiClient};
pub use error::ResolverError;
pub use mock::{MockBehaviour, MockResolver};
pub use types::TimezoneApiResponse;

/// A successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTimezone {
    pub canonical_id: TimezoneId,
    pub display_name: String,
    pub raw_offset: OffsetSeconds,
    pub dst_offset: OffsetSeconds,
}

/// Source of truth for the timezone at a point.
#[async_trait]
pub trait TimezoneResolver: Send + Sync {
    /// Resolve the timezone in effect at `coordinates` at unix time `timestamp`.
    async fn resolve(
        &self,
        coordinates: Coordinates,
        timestamp: i64,
    ) -> Result<ResolvedTimezone, ResolverError>;
}
