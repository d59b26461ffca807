//! Timezone records and identifiers.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DomainError;

/// Canonical identifier that marks a placeholder rather than a resolved zone.
const PLACEHOLDER_ID: &str = "UTC";

/// Largest offset magnitude accepted, in seconds (12 hours).
const MAX_OFFSET_SECS: i32 = 43_200;

/// Stable key of a stored timezone record.
///
/// Airports refer to records through this id rather than holding them,
/// so many airports can share one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimezoneRecordId(pub u64);

impl fmt::Display for TimezoneRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tz#{}", self.0)
    }
}

/// A canonical timezone identifier in region/city form (e.g. `America/Los_Angeles`).
///
/// This is the deduplication key for timezone records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimezoneId(String);

impl TimezoneId {
    /// Parse an identifier. It must be non-empty and free of whitespace.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidTimezoneId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the neutral default that stands in for "unknown".
    pub fn is_placeholder(&self) -> bool {
        self.0.eq_ignore_ascii_case(PLACEHOLDER_ID)
    }
}

impl TryFrom<String> for TimezoneId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TimezoneId> for String {
    fn from(id: TimezoneId) -> Self {
        id.0
    }
}

impl fmt::Display for TimezoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An offset from UTC in seconds, within [-43200, 43200].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct OffsetSeconds(i32);

impl OffsetSeconds {
    pub fn new(secs: i64) -> Result<Self, DomainError> {
        if secs.abs() > i64::from(MAX_OFFSET_SECS) {
            return Err(DomainError::OffsetOutOfRange(secs));
        }
        // In range, so the narrowing cannot truncate.
        Ok(Self(secs as i32))
    }

    pub fn secs(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for OffsetSeconds {
    type Error = DomainError;

    fn try_from(secs: i64) -> Result<Self, Self::Error> {
        Self::new(secs)
    }
}

impl From<OffsetSeconds> for i32 {
    fn from(o: OffsetSeconds) -> Self {
        o.0
    }
}

/// A stored timezone descriptor.
///
/// Every field but the id is optional: rows created by the alias loader or
/// imported by hand may be incomplete, and the freshness policy treats an
/// incomplete record as stale.
#[derive(Debug, Clone, PartialEq)]
pub struct TimezoneRecord {
    pub id: TimezoneRecordId,
    /// Canonical identifier; at most one record exists per value.
    pub canonical_id: Option<TimezoneId>,
    /// Human-readable name (e.g. "Pacific Daylight Time").
    pub display_name: Option<String>,
    /// Standard offset from UTC.
    pub raw_offset: Option<OffsetSeconds>,
    /// Additional daylight-saving offset in effect when last resolved.
    pub dst_offset: Option<OffsetSeconds>,
    /// Legacy and alternate identifiers for this zone.
    pub aliases: BTreeSet<String>,
    /// When the offsets were last confirmed by the resolver.
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl TimezoneRecord {
    /// A new record with only an id and canonical identifier.
    pub fn new(id: TimezoneRecordId, canonical_id: Option<TimezoneId>) -> Self {
        Self {
            id,
            canonical_id,
            display_name: None,
            raw_offset: None,
            dst_offset: None,
            aliases: BTreeSet::new(),
            last_refreshed: None,
        }
    }

    /// Whether all of canonical id, display name and both offsets are present.
    pub fn is_complete(&self) -> bool {
        self.canonical_id.is_some()
            && self.display_name.as_deref().is_some_and(|n| !n.is_empty())
            && self.raw_offset.is_some()
            && self.dst_offset.is_some()
    }

    /// Total offset (raw + DST) in hours.
    ///
    /// A missing raw offset yields 0; a missing DST offset counts as 0.
    pub fn total_offset_hours(&self) -> f64 {
        let Some(raw) = self.raw_offset else {
            return 0.0;
        };
        let dst = self.dst_offset.map_or(0, OffsetSeconds::secs);
        f64::from(raw.secs() + dst) / 3600.0
    }
}

impl fmt::Display for TimezoneRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.total_offset_hours();
        let sign = if hours >= 0.0 { "+" } else { "" };
        match &self.canonical_id {
            Some(id) => write!(f, "{id} (UTC{sign}{hours})"),
            None => write!(f, "UTC{sign}{hours}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pacific() -> TimezoneRecord {
        TimezoneRecord {
            display_name: Some("Pacific Time".to_string()),
            raw_offset: Some(OffsetSeconds::new(-28_800).unwrap()),
            dst_offset: Some(OffsetSeconds::new(3_600).unwrap()),
            ..TimezoneRecord::new(
                TimezoneRecordId(1),
                Some(TimezoneId::parse("America/Los_Angeles").unwrap()),
            )
        }
    }

    #[test]
    fn total_offset_in_hours() {
        assert_eq!(pacific().total_offset_hours(), -7.0);

        let mut india = pacific();
        india.raw_offset = Some(OffsetSeconds::new(19_800).unwrap());
        india.dst_offset = Some(OffsetSeconds::new(0).unwrap());
        assert_eq!(india.total_offset_hours(), 5.5);
    }

    #[test]
    fn missing_offsets() {
        let mut record = pacific();
        record.dst_offset = None;
        assert_eq!(record.total_offset_hours(), -8.0);

        record.raw_offset = None;
        record.dst_offset = Some(OffsetSeconds::new(3_600).unwrap());
        assert_eq!(record.total_offset_hours(), 0.0);
    }

    #[test]
    fn completeness() {
        assert!(pacific().is_complete());

        let mut record = pacific();
        record.display_name = Some(String::new());
        assert!(!record.is_complete());

        let mut record = pacific();
        record.dst_offset = None;
        assert!(!record.is_complete());

        let record = TimezoneRecord::new(TimezoneRecordId(2), None);
        assert!(!record.is_complete());
    }

    #[test]
    fn display() {
        assert_eq!(pacific().to_string(), "America/Los_Angeles (UTC-7)");

        let mut record = TimezoneRecord::new(TimezoneRecordId(3), None);
        record.raw_offset = Some(OffsetSeconds::new(19_800).unwrap());
        assert_eq!(record.to_string(), "UTC+5.5");
    }

    #[test]
    fn offset_bounds() {
        assert!(OffsetSeconds::new(43_200).is_ok());
        assert!(OffsetSeconds::new(-43_200).is_ok());
        assert_eq!(
            OffsetSeconds::new(43_201),
            Err(DomainError::OffsetOutOfRange(43_201))
        );
        assert!(serde_json::from_str::<OffsetSeconds>("-50400").is_err());
        assert_eq!(
            serde_json::from_str::<OffsetSeconds>("3600").unwrap().secs(),
            3600
        );
    }

    #[test]
    fn timezone_id_rules() {
        assert!(TimezoneId::parse("").is_err());
        assert!(TimezoneId::parse("America/Los Angeles").is_err());
        assert!(TimezoneId::parse("UTC").unwrap().is_placeholder());
        assert!(TimezoneId::parse("utc").unwrap().is_placeholder());
        assert!(!TimezoneId::parse("Etc/GMT+8").unwrap().is_placeholder());
    }
}
