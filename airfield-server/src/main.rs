use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use airfield_server::cache::ResponseCache;
use airfield_server::config::Settings;
use airfield_server::freshness::FreshnessPolicy;
use airfield_server::refresh::RefreshCoordinator;
use airfield_server::resolver::TimezoneApiClient;
use airfield_server::service::LookupService;
use airfield_server::store::MemoryStore;
use airfield_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("airfield_server=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env().expect("Invalid configuration");
    if settings.api_key.is_empty() {
        warn!("GOOGLE_MAPS_API_KEY not set. Timezone refreshes will fail.");
    }

    // Load airports and timezones
    let store = Arc::new(MemoryStore::new());
    if let Some(path) = &settings.seed_file {
        store.load_seed(path).await.expect("Failed to load seed file");
    }
    info!(
        airports = store.airport_count().await,
        timezones = store.timezone_count().await,
        "store ready"
    );

    // Create timezone resolver
    let resolver = TimezoneApiClient::new(settings.resolver_config())
        .expect("Failed to create timezone client");

    let coordinator = RefreshCoordinator::new(
        Arc::new(resolver),
        store.clone(),
        store.clone(),
        FreshnessPolicy::new(settings.freshness_config()),
    )
    .with_resolver_timeout(settings.resolver_timeout());

    let cache = ResponseCache::new(&settings.cache_config());
    let lookup = LookupService::new(store.clone(), store, coordinator.clone(), cache);

    // Spawn background task to sweep all airports periodically
    if let Some(period) = settings.sweep_interval() {
        let delay = settings.sweep_delay();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // First tick is immediate, skip it
            loop {
                interval.tick().await;
                if let Err(e) = coordinator.refresh_all(delay).await {
                    error!(error = %e, "timezone sweep failed");
                }
            }
        });
        info!(every_secs = period.as_secs(), "background timezone sweep enabled");
    }

    let app = create_router(AppState::new(lookup));

    let addr = settings.bind;
    info!("Airfield server listening on http://{addr}");
    info!("  GET /health");
    info!("  GET /api/airports/by_iata?code=LAX&include_timezone=true");
    info!("  GET /api/airports/by_icao?code=KLAX&include_timezone=true");
    info!("  GET /api/airports/{{id}}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
