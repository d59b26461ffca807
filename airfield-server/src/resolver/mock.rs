//! Mock resolver for testing without API access.
//!
//! Serves a scripted behaviour and counts calls, so tests can assert how
//! many times the external service would have been hit.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Coordinates, OffsetSeconds, TimezoneId};

use super::error::ResolverError;
use super::{ResolvedTimezone, TimezoneResolver};

/// What the mock does when called.
#[derive(Debug, Clone)]
pub enum MockBehaviour {
    /// Return this timezone for every location.
    Respond(ResolvedTimezone),
    /// Fail as if the API returned this HTTP status.
    HttpStatus(u16),
    /// Answer `ZERO_RESULTS`.
    NotFound,
    /// Never answer.
    Hang,
}

/// Mock resolver with a swappable behaviour and a call counter.
#[derive(Clone)]
pub struct MockResolver {
    behaviour: Arc<RwLock<MockBehaviour>>,
    calls: Arc<AtomicUsize>,
    latency: Duration,
}

impl MockResolver {
    pub fn new(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour: Arc::new(RwLock::new(behaviour)),
            calls: Arc::new(AtomicUsize::new(0)),
            latency: Duration::ZERO,
        }
    }

    /// A mock that always resolves to the given zone.
    ///
    /// # Panics
    ///
    /// If the identifier or offsets are invalid.
    pub fn responding(canonical_id: &str, display_name: &str, raw: i64, dst: i64) -> Self {
        Self::new(MockBehaviour::Respond(ResolvedTimezone {
            canonical_id: TimezoneId::parse(canonical_id).expect("valid timezone id"),
            display_name: display_name.to_string(),
            raw_offset: OffsetSeconds::new(raw).expect("valid raw offset"),
            dst_offset: OffsetSeconds::new(dst).expect("valid dst offset"),
        }))
    }

    /// Delay every answer by `latency`, to make concurrent calls overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Replace the behaviour for subsequent calls.
    pub async fn set_behaviour(&self, behaviour: MockBehaviour) {
        *self.behaviour.write().await = behaviour;
    }

    /// Number of `resolve` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimezoneResolver for MockResolver {
    async fn resolve(
        &self,
        _coordinates: Coordinates,
        _timestamp: i64,
    ) -> Result<ResolvedTimezone, ResolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let behaviour = self.behaviour.read().await.clone();
        match behaviour {
            MockBehaviour::Respond(resolved) => Ok(resolved),
            MockBehaviour::HttpStatus(status) => Err(ResolverError::ApiError {
                status,
                message: format!("mock status {status}"),
            }),
            MockBehaviour::NotFound => Err(ResolverError::NotFound),
            MockBehaviour::Hang => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lax() -> Coordinates {
        Coordinates::new(33.9425, -118.408056).unwrap()
    }

    #[tokio::test]
    async fn responds_and_counts() {
        let mock = MockResolver::responding("America/Los_Angeles", "Pacific Time", -28_800, 3_600);

        let resolved = mock.resolve(lax(), 0).await.unwrap();
        assert_eq!(resolved.canonical_id.as_str(), "America/Los_Angeles");
        mock.resolve(lax(), 0).await.unwrap();

        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn behaviour_can_change() {
        let mock = MockResolver::new(MockBehaviour::HttpStatus(500));
        let err = mock.resolve(lax(), 0).await.unwrap_err();
        assert_eq!(err.to_string(), "API error 500: mock status 500");

        mock.set_behaviour(MockBehaviour::NotFound).await;
        assert!(mock.resolve(lax(), 0).await.unwrap_err().is_not_found());
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn clones_share_counter() {
        let mock = MockResolver::new(MockBehaviour::NotFound);
        let clone = mock.clone();
        let _ = clone.resolve(lax(), 0).await;
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn hang_never_answers() {
        let mock = MockResolver::new(MockBehaviour::Hang);
        let result =
            tokio::time::timeout(Duration::from_millis(20), mock.resolve(lax(), 0)).await;
        assert!(result.is_err());
    }
}
