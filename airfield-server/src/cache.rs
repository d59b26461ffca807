//! Read-through cache for lookup responses.
//!
//! Entries are keyed by (normalized code, include-timezone flag): an
//! enriched lookup and a bare lookup are different responses and must not
//! be served for each other. Each entry holds an owned snapshot of the view,
//! so later store writes cannot change what a cached response says.
//!
//! Cached responses are authoritative for their TTL, even if the underlying
//! timezone goes stale in the meantime.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache as MokaCache;

use crate::domain::LookupCode;
use crate::service::AirportView;

/// Default TTL: 24 hours.
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest TTL moka accepts (1000 years).
pub const MAX_TTL: Duration = Duration::from_secs(1000 * 365 * 24 * 60 * 60);

/// Cache key for lookup responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub code: LookupCode,
    pub include_timezone: bool,
}

impl CacheKey {
    pub fn new(code: LookupCode, include_timezone: bool) -> Self {
        Self {
            code,
            include_timezone,
        }
    }
}

/// A cached response with its write time.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub payload: Arc<AirportView>,
    pub written_at: DateTime<Utc>,
}

/// Configuration for the response cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl CacheConfig {
    /// Set a custom TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum number of entries.
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_capacity: 10_000,
        }
    }
}

/// Cache for lookup responses.
#[derive(Clone)]
pub struct ResponseCache {
    entries: MokaCache<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a new cache with the given configuration.
    ///
    /// A TTL above [`MAX_TTL`] is clamped to it.
    pub fn new(config: &CacheConfig) -> Self {
        let ttl = config.ttl.min(MAX_TTL);
        let entries = MokaCache::builder()
            .time_to_live(ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { entries, ttl }
    }

    /// Get a live entry. Expired entries are treated as misses.
    pub async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).await
    }

    /// Store a snapshot of `view` under `key`, stamped with the current time.
    pub async fn put(&self, key: CacheKey, view: AirportView) -> CacheEntry {
        let entry = CacheEntry {
            payload: Arc::new(view),
            written_at: Utc::now(),
        };
        self.entries.insert(key, entry.clone()).await;
        entry
    }

    /// Whether a live entry exists for `key`.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Get cache statistics (for monitoring). Eventually consistent.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// The TTL applied to every entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Airport, CodeKind, Coordinates};

    fn view(name: &str) -> AirportView {
        let coords = Coordinates::new(33.9425, -118.408056).unwrap();
        AirportView::build(&Airport::new("KLAX", "KLAX", name, coords), None)
    }

    fn key(code: &str, include_timezone: bool) -> CacheKey {
        CacheKey::new(
            LookupCode::parse(CodeKind::Iata, code).unwrap(),
            include_timezone,
        )
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(86_400));
        assert_eq!(config.max_capacity, 10_000);
    }

    #[test]
    fn cache_creation() {
        let cache = ResponseCache::new(&CacheConfig::default());
        assert_eq!(cache.entry_count(), 0);
        assert_eq!(cache.ttl(), Duration::from_secs(86_400));
    }

    #[test]
    fn oversized_ttl_is_clamped() {
        let config = CacheConfig::default().with_ttl(Duration::from_secs(u64::MAX));
        let cache = ResponseCache::new(&config);
        assert_eq!(cache.ttl(), MAX_TTL);
    }

    #[tokio::test]
    async fn put_then_get_returns_equal_payload() {
        let cache = ResponseCache::new(&CacheConfig::default());
        let written = cache.put(key("LAX", true), view("Los Angeles")).await;

        let entry = cache.get(&key("lax", true)).await.unwrap();
        assert_eq!(*entry.payload, view("Los Angeles"));
        assert_eq!(entry.written_at, written.written_at);
    }

    #[tokio::test]
    async fn flag_is_part_of_key() {
        let cache = ResponseCache::new(&CacheConfig::default());
        cache.put(key("LAX", false), view("bare")).await;

        assert!(cache.get(&key("LAX", true)).await.is_none());
        assert!(cache.contains(&key("LAX", false)));
        assert!(!cache.contains(&key("LAX", true)));
    }

    #[tokio::test]
    async fn kind_is_part_of_key() {
        let cache = ResponseCache::new(&CacheConfig::default());
        cache.put(key("ABC", true), view("iata")).await;

        let ident = CacheKey::new(LookupCode::parse(CodeKind::Icao, "ABC").unwrap(), true);
        assert!(cache.get(&ident).await.is_none());
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let config = CacheConfig::default().with_ttl(Duration::from_millis(50));
        let cache = ResponseCache::new(&config);
        cache.put(key("LAX", true), view("Los Angeles")).await;
        assert!(cache.get(&key("LAX", true)).await.is_some());

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(cache.get(&key("LAX", true)).await.is_none());
        assert!(!cache.contains(&key("LAX", true)));
    }

    #[tokio::test]
    async fn invalidate_all_clears() {
        let cache = ResponseCache::new(&CacheConfig::default());
        cache.put(key("LAX", true), view("Los Angeles")).await;
        cache.invalidate_all();
        assert!(cache.get(&key("LAX", true)).await.is_none());
    }
}
