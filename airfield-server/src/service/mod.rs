//! Airport lookup service.
//!
//! Ties the stores, the refresh coordinator and the response cache together.
//! A lookup normalises the code, serves from cache when it can, otherwise
//! reads the airport, optionally refreshes its timezone, and caches the view
//! it returns. Resolver failures never reach the caller.

mod view;

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::{CacheKey, ResponseCache};
use crate::domain::{Airport, AirportId, CodeKind, DomainError, LookupCode};
use crate::refresh::{RefreshCoordinator, RefreshOutcome};
use crate::store::{AirportStore, StoreError, TimezoneStore};

pub use view::{AirportView, TimezoneView};

/// Request-level lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The code was empty or malformed
    #[error(transparent)]
    BadRequest(#[from] DomainError),

    #[error("{0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Airport lookup with read-through caching and timezone refresh.
#[derive(Clone)]
pub struct LookupService {
    airports: Arc<dyn AirportStore>,
    timezones: Arc<dyn TimezoneStore>,
    coordinator: RefreshCoordinator,
    cache: ResponseCache,
}

impl LookupService {
    pub fn new(
        airports: Arc<dyn AirportStore>,
        timezones: Arc<dyn TimezoneStore>,
        coordinator: RefreshCoordinator,
        cache: ResponseCache,
    ) -> Self {
        Self {
            airports,
            timezones,
            coordinator,
            cache,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Look up an airport by IATA code or ident.
    ///
    /// With `include_timezone`, a stale timezone is refreshed before the view
    /// is built. The refresh outcome does not affect the result.
    pub async fn lookup(
        &self,
        raw_code: &str,
        kind: CodeKind,
        include_timezone: bool,
    ) -> Result<Arc<AirportView>, LookupError> {
        let code = LookupCode::parse(kind, raw_code)?;
        let key = CacheKey::new(code.clone(), include_timezone);

        if let Some(entry) = self.cache.get(&key).await {
            debug!(code = ?code, include_timezone, "cache hit");
            return Ok(entry.payload);
        }
        debug!(code = ?code, include_timezone, "cache miss");

        let Some(mut airport) = self.airports.find_by_code(&code).await? else {
            info!(code = ?code, "no matching airport");
            return Err(LookupError::NotFound(format!(
                "no airport matches {} code {}",
                code.kind(),
                code.as_str()
            )));
        };

        if include_timezone {
            match self.coordinator.refresh_detached(airport.clone()).await {
                RefreshOutcome::Unchanged => {}
                RefreshOutcome::Updated(record) => {
                    debug!(airport = %airport.id, timezone = %record, "serving refreshed timezone");
                }
                // Already logged by the coordinator; serve what we have.
                RefreshOutcome::Failed(_) => {}
            }

            // Pick up the new link, if any.
            if let Some(current) = self.airports.get(&airport.id).await? {
                airport = current;
            }
        }

        let view = self.build_view(&airport).await?;
        let entry = self.cache.put(key, view).await;
        Ok(entry.payload)
    }

    /// Fetch an airport by primary id. Never refreshes and bypasses the cache.
    pub async fn get_by_id(&self, id: &AirportId) -> Result<AirportView, LookupError> {
        let airport = self
            .airports
            .get(id)
            .await?
            .ok_or_else(|| LookupError::NotFound(format!("no airport with id {id}")))?;
        self.build_view(&airport).await
    }

    async fn build_view(&self, airport: &Airport) -> Result<AirportView, LookupError> {
        let record = match airport.timezone {
            Some(link) => self.timezones.get(link.record).await?,
            None => None,
        };
        Ok(AirportView::build(airport, record.as_ref()))
    }
}
