//! Timezone refresh coordinator.
//!
//! Checks the freshness policy, calls the resolver for stale airports,
//! upserts the resulting record by canonical identifier and re-links the
//! airport. A failed refresh leaves the airport and its previous record
//! untouched, and is reported as an outcome rather than an error: callers
//! carry on with whatever timezone data exists.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::{Airport, TimezoneLink, TimezoneRecord};
use crate::freshness::FreshnessPolicy;
use crate::resolver::{ResolverError, TimezoneResolver};
use crate::store::{AirportStore, StoreError, TimezoneStore};

/// Default deadline for one resolver call.
const DEFAULT_RESOLVER_TIMEOUT: Duration = Duration::from_secs(10);

/// Progress is logged every this many airports during a sweep.
const SWEEP_PROGRESS_EVERY: usize = 100;

/// Why a refresh did not complete.
#[derive(Debug, thiserror::Error)]
pub enum RefreshFailure {
    #[error("resolver failed: {0}")]
    Resolver(#[from] ResolverError),

    #[error("store failed: {0}")]
    Store(#[from] StoreError),

    /// The detached refresh task panicked or was cancelled
    #[error("refresh task aborted: {0}")]
    Aborted(String),
}

/// Result of [`RefreshCoordinator::refresh_if_needed`].
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Data was fresh; no external call was made.
    Unchanged,
    /// The airport now links to this record.
    Updated(TimezoneRecord),
    /// Nothing was written.
    Failed(RefreshFailure),
}

impl RefreshOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, RefreshOutcome::Updated(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RefreshOutcome::Failed(_))
    }
}

/// Counts from a full sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub total: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Orchestrates policy check, resolution and store writes.
#[derive(Clone)]
pub struct RefreshCoordinator {
    resolver: Arc<dyn TimezoneResolver>,
    airports: Arc<dyn AirportStore>,
    timezones: Arc<dyn TimezoneStore>,
    policy: FreshnessPolicy,
    resolver_timeout: Duration,
}

impl RefreshCoordinator {
    pub fn new(
        resolver: Arc<dyn TimezoneResolver>,
        airports: Arc<dyn AirportStore>,
        timezones: Arc<dyn TimezoneStore>,
        policy: FreshnessPolicy,
    ) -> Self {
        Self {
            resolver,
            airports,
            timezones,
            policy,
            resolver_timeout: DEFAULT_RESOLVER_TIMEOUT,
        }
    }

    /// Set the deadline for a single resolver call.
    pub fn with_resolver_timeout(mut self, timeout: Duration) -> Self {
        self.resolver_timeout = timeout;
        self
    }

    pub fn policy(&self) -> &FreshnessPolicy {
        &self.policy
    }

    /// Refresh the airport's timezone if the policy says it is stale.
    pub async fn refresh_if_needed(&self, airport: &Airport) -> RefreshOutcome {
        self.refresh_if_needed_at(airport, Utc::now()).await
    }

    /// As [`refresh_if_needed`](Self::refresh_if_needed), evaluated at `now`.
    ///
    /// The airport is re-read from the store so the decision uses its current
    /// state, not the caller's copy.
    pub async fn refresh_if_needed_at(
        &self,
        airport: &Airport,
        now: DateTime<Utc>,
    ) -> RefreshOutcome {
        match self.try_refresh(airport, now).await {
            Ok(Some(record)) => RefreshOutcome::Updated(record),
            Ok(None) => RefreshOutcome::Unchanged,
            Err(failure) => {
                warn!(airport = %airport.id, error = %failure, "timezone refresh failed");
                RefreshOutcome::Failed(failure)
            }
        }
    }

    /// Run the refresh on its own task.
    ///
    /// If the caller is dropped (e.g. the client disconnects), the task still
    /// finishes and its store writes are kept.
    pub async fn refresh_detached(&self, airport: Airport) -> RefreshOutcome {
        let this = self.clone();
        let id = airport.id.clone();
        let task = tokio::spawn(async move { this.refresh_if_needed(&airport).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(airport = %id, error = %e, "refresh task did not complete");
                RefreshOutcome::Failed(RefreshFailure::Aborted(e.to_string()))
            }
        }
    }

    /// `Ok(None)` when fresh, `Ok(Some(record))` after a successful refresh.
    async fn try_refresh(
        &self,
        airport: &Airport,
        now: DateTime<Utc>,
    ) -> Result<Option<TimezoneRecord>, RefreshFailure> {
        let current = self
            .airports
            .get(&airport.id)
            .await?
            .ok_or_else(|| StoreError::AirportNotFound(airport.id.clone()))?;

        let record = match current.timezone {
            Some(link) => self.timezones.get(link.record).await?,
            None => None,
        };

        let staleness = self.policy.assess(&current, record.as_ref(), now);
        if !staleness.is_stale() {
            debug!(airport = %current.id, "timezone fresh");
            return Ok(None);
        }

        debug!(airport = %current.id, reason = staleness.reason(), "timezone stale, resolving");

        let resolved = tokio::time::timeout(
            self.resolver_timeout,
            self.resolver.resolve(current.coordinates, now.timestamp()),
        )
        .await
        .map_err(|_| ResolverError::Timeout(self.resolver_timeout))??;

        let upserted = self.timezones.upsert_resolved(&resolved, now).await?;

        let link = TimezoneLink {
            record: upserted.record.id,
            refreshed_at: Some(now),
        };
        self.airports.set_timezone_link(&current.id, link).await?;

        info!(
            airport = %current.id,
            timezone = %upserted.record,
            created = upserted.created,
            "timezone refreshed"
        );

        Ok(Some(upserted.record))
    }

    /// Refresh every airport in turn, pausing `delay` after each resolver
    /// call to stay under the API's rate limit.
    pub async fn refresh_all(&self, delay: Duration) -> Result<SweepSummary, StoreError> {
        let ids = self.airports.ids().await?;
        let mut summary = SweepSummary {
            total: ids.len(),
            ..SweepSummary::default()
        };

        info!(total = summary.total, "starting timezone sweep");

        for (i, id) in ids.iter().enumerate() {
            // Removed since the id list was taken
            let Some(airport) = self.airports.get(id).await? else {
                continue;
            };

            let called = match self.refresh_if_needed(&airport).await {
                RefreshOutcome::Unchanged => {
                    summary.unchanged += 1;
                    false
                }
                RefreshOutcome::Updated(_) => {
                    summary.updated += 1;
                    true
                }
                RefreshOutcome::Failed(RefreshFailure::Resolver(_)) => {
                    summary.failed += 1;
                    true
                }
                RefreshOutcome::Failed(_) => {
                    summary.failed += 1;
                    false
                }
            };

            if (i + 1) % SWEEP_PROGRESS_EVERY == 0 {
                info!(processed = i + 1, total = summary.total, "sweep progress");
            }

            if called && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }

        info!(
            updated = summary.updated,
            unchanged = summary.unchanged,
            failed = summary.failed,
            total = summary.total,
            "finished timezone sweep"
        );

        Ok(summary)
    }
}
