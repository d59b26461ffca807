//! Time Zone API response DTO.
//!
//! Maps directly to the JSON returned by the Google Maps Time Zone API.
//! Fields other than `status` are optional because the API omits them on
//! failure.

use serde::Deserialize;

use crate::domain::{OffsetSeconds, TimezoneId};

use super::ResolvedTimezone;
use super::error::ResolverError;

/// Body status that marks success.
const STATUS_OK: &str = "OK";

/// Body status that marks "no timezone at this point".
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Response from the `timezone/json` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimezoneApiResponse {
    /// `OK`, `ZERO_RESULTS`, `INVALID_REQUEST`, `OVER_QUERY_LIMIT`, ...
    pub status: String,

    /// Canonical identifier (e.g. "America/Los_Angeles").
    pub time_zone_id: Option<String>,

    /// Long display name (e.g. "Pacific Daylight Time").
    pub time_zone_name: Option<String>,

    /// Standard offset from UTC in seconds.
    pub raw_offset: Option<i64>,

    /// DST offset in seconds at the requested timestamp.
    pub dst_offset: Option<i64>,

    /// Explanation accompanying a non-OK status.
    pub error_message: Option<String>,
}

impl TimezoneApiResponse {
    /// Interpret the body, turning non-OK statuses and missing or invalid
    /// fields into errors.
    pub fn into_resolved(self) -> Result<ResolvedTimezone, ResolverError> {
        match self.status.as_str() {
            STATUS_OK => {}
            STATUS_ZERO_RESULTS => return Err(ResolverError::NotFound),
            _ => {
                return Err(ResolverError::Status {
                    status: self.status,
                    message: self.error_message,
                });
            }
        }

        let malformed = |message: String| ResolverError::Json {
            message,
            body: None,
        };

        let canonical_id = self
            .time_zone_id
            .ok_or_else(|| malformed("missing timeZoneId".to_string()))?;
        let canonical_id = TimezoneId::parse(&canonical_id).map_err(|e| malformed(e.to_string()))?;

        let display_name = self
            .time_zone_name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| malformed("missing timeZoneName".to_string()))?;

        let raw_offset = self
            .raw_offset
            .ok_or_else(|| malformed("missing rawOffset".to_string()))?;
        let raw_offset = OffsetSeconds::new(raw_offset).map_err(|e| malformed(e.to_string()))?;

        let dst_offset = self
            .dst_offset
            .ok_or_else(|| malformed("missing dstOffset".to_string()))?;
        let dst_offset = OffsetSeconds::new(dst_offset).map_err(|e| malformed(e.to_string()))?;

        Ok(ResolvedTimezone {
            canonical_id,
            display_name,
            raw_offset,
            dst_offset,
        })
    }
}
