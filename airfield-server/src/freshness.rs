//! Timezone freshness policy.
//!
//! Decides whether an airport's timezone data can be served as-is or must be
//! re-resolved. Two stamps are checked independently: the record's own
//! `last_refreshed` (shared by every airport linked to it) and the airport's
//! link stamp. A record refreshed through one airport does not make every
//! other airport sharing it fresh.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{Airport, TimezoneRecord};

/// Configuration for the freshness policy.
#[derive(Debug, Clone)]
pub struct FreshnessConfig {
    /// Maximum age of a record's offsets, in days.
    pub record_stale_days: i64,

    /// Maximum age of an airport's link stamp, in days.
    pub link_stale_days: i64,
}

impl FreshnessConfig {
    pub fn new(record_stale_days: i64, link_stale_days: i64) -> Self {
        Self {
            record_stale_days,
            link_stale_days,
        }
    }

    /// Returns the record staleness window as a Duration.
    pub fn record_window(&self) -> Duration {
        window(self.record_stale_days)
    }

    /// Returns the link staleness window as a Duration.
    pub fn link_window(&self) -> Duration {
        window(self.link_stale_days)
    }
}

/// Saturates instead of panicking when `days` is beyond chrono's range.
fn window(days: i64) -> Duration {
    Duration::try_days(days).unwrap_or(if days < 0 { Duration::MIN } else { Duration::MAX })
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            record_stale_days: 90,
            link_stale_days: 30,
        }
    }
}

/// Outcome of a freshness assessment, with the reason when stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Fresh,
    /// No link, or the link points at a record that no longer exists.
    NoRecord,
    /// Record lacks an offset, identifier or display name.
    Incomplete,
    /// Record holds the neutral "UTC" placeholder.
    Placeholder,
    RecordNeverRefreshed,
    RecordExpired,
    LinkNeverRefreshed,
    LinkExpired,
}

impl Staleness {
    pub fn is_stale(self) -> bool {
        self != Staleness::Fresh
    }

    /// Short label for logs.
    pub fn reason(self) -> &'static str {
        match self {
            Staleness::Fresh => "fresh",
            Staleness::NoRecord => "no timezone record",
            Staleness::Incomplete => "record incomplete",
            Staleness::Placeholder => "placeholder identifier",
            Staleness::RecordNeverRefreshed => "record never refreshed",
            Staleness::RecordExpired => "record expired",
            Staleness::LinkNeverRefreshed => "link never refreshed",
            Staleness::LinkExpired => "link expired",
        }
    }
}

/// Pure staleness decision over an airport and its linked record.
#[derive(Debug, Clone, Default)]
pub struct FreshnessPolicy {
    config: FreshnessConfig,
}

impl FreshnessPolicy {
    pub fn new(config: FreshnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FreshnessConfig {
        &self.config
    }

    /// Assess an airport as of `now`.
    ///
    /// `record` is the record the airport's link resolves to, if any. Checks
    /// run in a fixed order and the first failing one is reported.
    pub fn assess(
        &self,
        airport: &Airport,
        record: Option<&TimezoneRecord>,
        now: DateTime<Utc>,
    ) -> Staleness {
        let (Some(link), Some(record)) = (airport.timezone.as_ref(), record) else {
            return Staleness::NoRecord;
        };

        if link.record != record.id {
            return Staleness::NoRecord;
        }

        if !record.is_complete() {
            return Staleness::Incomplete;
        }

        if record.canonical_id.as_ref().is_some_and(|id| id.is_placeholder()) {
            return Staleness::Placeholder;
        }

        match record.last_refreshed {
            None => return Staleness::RecordNeverRefreshed,
            Some(at) if now.signed_duration_since(at) > self.config.record_window() => {
                return Staleness::RecordExpired;
            }
            Some(_) => {}
        }

        match link.refreshed_at {
            None => Staleness::LinkNeverRefreshed,
            Some(at) if now.signed_duration_since(at) > self.config.link_window() => {
                Staleness::LinkExpired
            }
            Some(_) => Staleness::Fresh,
        }
    }

    /// Whether the airport's timezone must be re-resolved.
    pub fn is_stale(
        &self,
        airport: &Airport,
        record: Option<&TimezoneRecord>,
        now: DateTime<Utc>,
    ) -> bool {
        self.assess(airport, record, now).is_stale()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Coordinates, OffsetSeconds, TimezoneId, TimezoneLink, TimezoneRecordId,
    };
    use chrono::TimeZone;

    pub(super) fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    pub(super) fn record(id: &str, refreshed: Option<DateTime<Utc>>) -> TimezoneRecord {
        TimezoneRecord {
            display_name: Some("Pacific Time".to_string()),
            raw_offset: Some(OffsetSeconds::new(-28_800).unwrap()),
            dst_offset: Some(OffsetSeconds::new(3_600).unwrap()),
            last_refreshed: refreshed,
            ..TimezoneRecord::new(TimezoneRecordId(7), Some(TimezoneId::parse(id).unwrap()))
        }
    }

    pub(super) fn airport(link_refreshed: Option<Option<DateTime<Utc>>>) -> Airport {
        let coords = Coordinates::new(33.9425, -118.408056).unwrap();
        let mut airport = Airport::new("KLAX", "KLAX", "Los Angeles International", coords);
        airport.timezone = link_refreshed.map(|refreshed_at| TimezoneLink {
            record: TimezoneRecordId(7),
            refreshed_at,
        });
        airport
    }

    #[test]
    fn default_config() {
        let config = FreshnessConfig::default();
        assert_eq!(config.record_stale_days, 90);
        assert_eq!(config.link_stale_days, 30);
        assert_eq!(config.record_window(), Duration::days(90));
        assert_eq!(config.link_window(), Duration::days(30));
    }

    #[test]
    fn fresh_when_everything_recent() {
        let policy = FreshnessPolicy::default();
        let rec = record("America/Los_Angeles", Some(now() - Duration::days(1)));
        let apt = airport(Some(Some(now() - Duration::days(1))));
        assert_eq!(policy.assess(&apt, Some(&rec), now()), Staleness::Fresh);
        assert!(!policy.is_stale(&apt, Some(&rec), now()));
    }

    #[test]
    fn unlinked_is_stale() {
        let policy = FreshnessPolicy::default();
        let rec = record("America/Los_Angeles", Some(now()));
        assert_eq!(policy.assess(&airport(None), None, now()), Staleness::NoRecord);
        // A record passed in without a matching link does not count.
        assert_eq!(
            policy.assess(&airport(None), Some(&rec), now()),
            Staleness::NoRecord
        );
    }

    #[test]
    fn dangling_or_mismatched_link_is_stale() {
        let policy = FreshnessPolicy::default();
        let apt = airport(Some(Some(now())));
        assert_eq!(policy.assess(&apt, None, now()), Staleness::NoRecord);

        let mut other = record("America/Los_Angeles", Some(now()));
        other.id = TimezoneRecordId(99);
        assert_eq!(policy.assess(&apt, Some(&other), now()), Staleness::NoRecord);
    }

    #[test]
    fn incomplete_record_is_stale() {
        let policy = FreshnessPolicy::default();
        let apt = airport(Some(Some(now())));

        let mut rec = record("America/Los_Angeles", Some(now()));
        rec.raw_offset = None;
        assert_eq!(policy.assess(&apt, Some(&rec), now()), Staleness::Incomplete);

        let mut rec = record("America/Los_Angeles", Some(now()));
        rec.display_name = None;
        assert_eq!(policy.assess(&apt, Some(&rec), now()), Staleness::Incomplete);

        let mut rec = record("America/Los_Angeles", Some(now()));
        rec.canonical_id = None;
        assert_eq!(policy.assess(&apt, Some(&rec), now()), Staleness::Incomplete);
    }

    #[test]
    fn placeholder_is_stale() {
        let policy = FreshnessPolicy::default();
        let apt = airport(Some(Some(now())));
        let rec = record("UTC", Some(now()));
        assert_eq!(policy.assess(&apt, Some(&rec), now()), Staleness::Placeholder);
    }

    #[test]
    fn out_of_range_window_saturates() {
        let config = FreshnessConfig::new(i64::MAX, 30);
        assert_eq!(config.record_window(), Duration::MAX);

        let policy = FreshnessPolicy::new(config);
        let rec = record("America/Los_Angeles", Some(now() - Duration::days(1)));
        let apt = airport(Some(Some(now() - Duration::days(1))));
        assert_eq!(policy.assess(&apt, Some(&rec), now()), Staleness::Fresh);
    }

    #[test]
    fn record_window_boundary() {
        let policy = FreshnessPolicy::default();
        let apt = airport(Some(Some(now())));

        let rec = record("America/Los_Angeles", Some(now() - Duration::days(90)));
        assert_eq!(policy.assess(&apt, Some(&rec), now()), Staleness::Fresh);

        let rec = record(
            "America/Los_Angeles",
            Some(now() - Duration::days(90) - Duration::seconds(1)),
        );
        assert_eq!(policy.assess(&apt, Some(&rec), now()), Staleness::RecordExpired);

        let rec = record("America/Los_Angeles", None);
        assert_eq!(
            policy.assess(&apt, Some(&rec), now()),
            Staleness::RecordNeverRefreshed
        );
    }

    #[test]
    fn link_window_is_shorter() {
        let policy = FreshnessPolicy::default();
        let rec = record("America/Los_Angeles", Some(now() - Duration::days(1)));

        let apt = airport(Some(Some(now() - Duration::days(45))));
        assert_eq!(policy.assess(&apt, Some(&rec), now()), Staleness::LinkExpired);

        let apt = airport(Some(None));
        assert_eq!(
            policy.assess(&apt, Some(&rec), now()),
            Staleness::LinkNeverRefreshed
        );
    }

    #[test]
    fn custom_windows() {
        let policy = FreshnessPolicy::new(FreshnessConfig::new(1, 1));
        let rec = record("America/Los_Angeles", Some(now() - Duration::days(2)));
        let apt = airport(Some(Some(now())));
        assert!(policy.is_stale(&apt, Some(&rec), now()));
    }

    #[test]
    fn reasons_are_distinct() {
        assert_eq!(Staleness::Fresh.reason(), "fresh");
        assert!(!Staleness::Fresh.is_stale());
        assert!(Staleness::Placeholder.is_stale());
        assert_ne!(Staleness::RecordExpired.reason(), Staleness::LinkExpired.reason());
    }
}

#[cfg(test)]
mod proptests {
    use super::tests::{airport, now, record};
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Airports without a link are always stale
        #[test]
        fn unlinked_always_stale(days_ago in 0i64..1000) {
            let policy = FreshnessPolicy::default();
            let rec = record("Europe/London", Some(now() - Duration::days(days_ago)));
            prop_assert!(policy.is_stale(&airport(None), Some(&rec), now()));
            prop_assert!(policy.is_stale(&airport(None), None, now()));
        }

        /// The UTC placeholder is stale regardless of how recent it is
        #[test]
        fn placeholder_always_stale(secs_ago in 0i64..(200 * 86_400)) {
            let policy = FreshnessPolicy::default();
            let at = now() - Duration::seconds(secs_ago);
            let rec = record("UTC", Some(at));
            prop_assert!(policy.is_stale(&airport(Some(Some(at))), Some(&rec), now()));
        }

        /// Complete, non-placeholder data within both windows is fresh
        #[test]
        fn within_windows_fresh(
            record_secs in 0i64..=(90 * 86_400),
            link_secs in 0i64..=(30 * 86_400),
        ) {
            let policy = FreshnessPolicy::default();
            let rec = record("Asia/Tokyo", Some(now() - Duration::seconds(record_secs)));
            let apt = airport(Some(Some(now() - Duration::seconds(link_secs))));
            prop_assert!(!policy.is_stale(&apt, Some(&rec), now()));
        }
    }
}
