//! Time Zone API HTTP client.
//!
//! Handles authentication, concurrency limiting and status mapping for the
//! Google Maps Time Zone API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::Coordinates;

use super::error::ResolverError;
use super::types::TimezoneApiResponse;
use super::{ResolvedTimezone, TimezoneResolver};

/// Default endpoint for the Time Zone API.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/timezone/json";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for the Time Zone API client.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// API key, sent as the `key` query parameter
    pub api_key: String,
    /// Endpoint URL (defaults to production)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ResolverConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Google Maps Time Zone API client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct TimezoneApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    semaphore: Arc<Semaphore>,
}

impl TimezoneApiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ResolverConfig) -> Result<Self, ResolverError> {
        if config.max_concurrent == 0 {
            return Err(ResolverError::NotConfigured(
                "max_concurrent must be at least 1".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            api_key: config.api_key,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }
}

#[async_trait]
impl TimezoneResolver for TimezoneApiClient {
    async fn resolve(
        &self,
        coordinates: Coordinates,
        timestamp: i64,
    ) -> Result<ResolvedTimezone, ResolverError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ResolverError::NotConfigured("semaphore closed".to_string()))?;

        let location = format!("{},{}", coordinates.latitude(), coordinates.longitude());
        debug!(%location, timestamp, "requesting timezone");

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("location", location),
                ("timestamp", timestamp.to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ResolverError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ResolverError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResolverError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        parse_body(&body)
    }
}

/// Parse and interpret a 2xx response body.
fn parse_body(body: &str) -> Result<ResolvedTimezone, ResolverError> {
    let parsed: TimezoneApiResponse =
        serde_json::from_str(body).map_err(|e| ResolverError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })?;

    parsed.into_resolved()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = ResolverConfig::new("test-key")
            .with_base_url("http://localhost:8080")
            .with_max_concurrent(10)
            .with_timeout(60);

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.max_concurrent, 10);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn config_defaults() {
        let config = ResolverConfig::new("test-key");

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn client_creation() {
        assert!(TimezoneApiClient::new(ResolverConfig::new("test-key")).is_ok());

        let config = ResolverConfig::new("test-key").with_max_concurrent(0);
        assert!(matches!(
            TimezoneApiClient::new(config),
            Err(ResolverError::NotConfigured(_))
        ));
    }

    #[test]
    fn non_json_body_keeps_excerpt() {
        let body = format!("<html>{}</html>", "x".repeat(1000));
        match parse_body(&body) {
            Err(ResolverError::Json { body: Some(excerpt), .. }) => {
                assert_eq!(excerpt.chars().count(), 500);
                assert!(excerpt.starts_with("<html>"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn ok_body_resolves() {
        let resolved = parse_body(
            r#"{"dstOffset":0,"rawOffset":0,"status":"OK","timeZoneId":"Europe/London","timeZoneName":"Greenwich Mean Time"}"#,
        )
        .unwrap();
        assert_eq!(resolved.canonical_id.as_str(), "Europe/London");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_http_error() {
        // Bind then drop, so nothing is listening on the port.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = ResolverConfig::new("test-key")
            .with_base_url(format!("http://127.0.0.1:{port}/timezone/json"))
            .with_timeout(2);
        let client = TimezoneApiClient::new(config).unwrap();
        let coords = Coordinates::new(33.9425, -118.408056).unwrap();

        let result = client.resolve(coords, 1_700_000_000).await;
        assert!(matches!(result, Err(ResolverError::Http(_))));
    }
}
