//! Process settings read from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheConfig, MAX_TTL};
use crate::freshness::FreshnessConfig;
use crate::resolver::ResolverConfig;

/// Upper bound for either staleness window (about a century).
pub const MAX_STALE_DAYS: i64 = 36_500;

/// Upper bound for the response-cache TTL.
pub const MAX_CACHE_TTL_SECS: u64 = MAX_TTL.as_secs();

/// Settings could not be read from the environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Everything the binary needs to wire the service.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Empty when unset; resolver calls will then be rejected upstream.
    pub api_key: String,
    pub timezone_api_url: Option<String>,
    pub resolver_timeout_secs: u64,
    pub record_stale_days: i64,
    pub link_stale_days: i64,
    pub cache_ttl_secs: u64,
    pub cache_capacity: u64,
    pub seed_file: Option<PathBuf>,
    /// Zero disables the background sweep.
    pub sweep_interval_secs: u64,
    pub sweep_delay_ms: u64,
    pub bind: SocketAddr,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            timezone_api_url: None,
            resolver_timeout_secs: 10,
            record_stale_days: 90,
            link_stale_days: 30,
            cache_ttl_secs: 86_400,
            cache_capacity: 10_000,
            seed_file: None,
            sweep_interval_secs: 0,
            sweep_delay_ms: 100,
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through `lookup`, falling back to defaults for unset or
    /// blank variables.
    ///
    /// Values that parse but are out of range are rejected too.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let settings = Self {
            api_key: get("GOOGLE_MAPS_API_KEY").unwrap_or_default(),
            timezone_api_url: get("AIRFIELD_TIMEZONE_API_URL"),
            resolver_timeout_secs: parse(
                "AIRFIELD_RESOLVER_TIMEOUT_SECS",
                get("AIRFIELD_RESOLVER_TIMEOUT_SECS"),
                defaults.resolver_timeout_secs,
            )?,
            record_stale_days: parse(
                "AIRFIELD_RECORD_STALE_DAYS",
                get("AIRFIELD_RECORD_STALE_DAYS"),
                defaults.record_stale_days,
            )?,
            link_stale_days: parse(
                "AIRFIELD_LINK_STALE_DAYS",
                get("AIRFIELD_LINK_STALE_DAYS"),
                defaults.link_stale_days,
            )?,
            cache_ttl_secs: parse(
                "AIRFIELD_CACHE_TTL_SECS",
                get("AIRFIELD_CACHE_TTL_SECS"),
                defaults.cache_ttl_secs,
            )?,
            cache_capacity: parse(
                "AIRFIELD_CACHE_CAPACITY",
                get("AIRFIELD_CACHE_CAPACITY"),
                defaults.cache_capacity,
            )?,
            seed_file: get("AIRFIELD_SEED_FILE").map(PathBuf::from),
            sweep_interval_secs: parse(
                "AIRFIELD_SWEEP_INTERVAL_SECS",
                get("AIRFIELD_SWEEP_INTERVAL_SECS"),
                defaults.sweep_interval_secs,
            )?,
            sweep_delay_ms: parse(
                "AIRFIELD_SWEEP_DELAY_MS",
                get("AIRFIELD_SWEEP_DELAY_MS"),
                defaults.sweep_delay_ms,
            )?,
            bind: parse("AIRFIELD_BIND", get("AIRFIELD_BIND"), defaults.bind)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check that every numeric setting is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        in_range(
            "AIRFIELD_RECORD_STALE_DAYS",
            self.record_stale_days,
            1,
            MAX_STALE_DAYS,
        )?;
        in_range(
            "AIRFIELD_LINK_STALE_DAYS",
            self.link_stale_days,
            1,
            MAX_STALE_DAYS,
        )?;
        in_range(
            "AIRFIELD_CACHE_TTL_SECS",
            self.cache_ttl_secs,
            1,
            MAX_CACHE_TTL_SECS,
        )?;
        in_range(
            "AIRFIELD_RESOLVER_TIMEOUT_SECS",
            self.resolver_timeout_secs,
            1,
            u64::MAX,
        )?;
        Ok(())
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        let config = ResolverConfig::new(&self.api_key).with_timeout(self.resolver_timeout_secs);
        match &self.timezone_api_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }

    pub fn freshness_config(&self) -> FreshnessConfig {
        FreshnessConfig::new(self.record_stale_days, self.link_stale_days)
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default()
            .with_ttl(Duration::from_secs(self.cache_ttl_secs))
            .with_max_capacity(self.cache_capacity)
    }

    pub fn resolver_timeout(&self) -> Duration {
        Duration::from_secs(self.resolver_timeout_secs)
    }

    /// `None` when the sweep is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }

    pub fn sweep_delay(&self) -> Duration {
        Duration::from_millis(self.sweep_delay_ms)
    }
}

fn parse<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse() {
            Ok(parsed) => Ok(parsed),
            Err(e) => Err(ConfigError {
                var,
                reason: e.to_string(),
                value,
            }),
        },
    }
}

fn in_range<T>(var: &'static str, value: T, min: T, max: T) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(ConfigError {
            var,
            value: value.to_string(),
            reason: format!("must be between {min} and {max}"),
        });
    }
    Ok(())
}
