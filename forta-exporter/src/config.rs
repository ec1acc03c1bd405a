//! Top-level configuration for the exporter.
//!
//! This module aggregates configuration for:
//!
//! - the poll loop (interval + scanner address),
//! - the upstream clients (health URL, SLA API base URL, request timeout),
//! - the metrics exporter (listen address).
//!
//! Configuration is read once at startup from environment variables and
//! is immutable afterwards. [`ExporterConfig::from_lookup`] takes an
//! arbitrary key lookup so tests don't have to touch the process
//! environment.

use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const ENV_POLLING_INTERVAL: &str = "POLLING_INTERVAL_SECONDS";
pub const ENV_APP_PORT: &str = "APP_PORT";
pub const ENV_EXPORTER_PORT: &str = "EXPORTER_PORT";
pub const ENV_SCANNER_ADDRESS: &str = "SCANNER_ADDRESS";
pub const ENV_HEALTH_URL: &str = "HEALTH_URL";
pub const ENV_SLA_API_URL: &str = "SLA_API_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT_SECONDS";

/// Configuration for the two upstream HTTP sources.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    /// Full URL of the node health report, e.g. `"http://localhost:8090/health"`.
    pub health_url: String,
    /// Base URL of the stats API; `/stats/sla/scanner/{address}` is appended.
    pub sla_api_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Port of the upstream application. Reported at startup only.
    pub app_port: u16,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            health_url: "http://localhost:8090/health".to_string(),
            sla_api_url: "https://api.forta.network".to_string(),
            timeout: Duration::from_secs(10),
            app_port: 80,
        }
    }
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9877)),
        }
    }
}

/// Configuration for the poll loop.
#[derive(Clone, Debug)]
pub struct PollConfig {
    /// Sleep between the end of one tick and the start of the next.
    pub interval: Duration,
    /// Scanner address whose SLA is fetched and used as the SLA label.
    pub scanner_address: String,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15),
            scanner_address: String::new(),
        }
    }
}

/// Top-level configuration for the exporter process.
#[derive(Clone, Debug, Default)]
pub struct ExporterConfig {
    pub poll: PollConfig,
    pub upstream: UpstreamConfig,
    pub metrics: MetricsConfig,
}

impl ExporterConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration from an arbitrary variable lookup.
    ///
    /// Unset variables fall back to the defaults; set but unparsable
    /// variables are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_POLLING_INTERVAL)? {
            if secs == 0 {
                return Err(invalid(ENV_POLLING_INTERVAL, "0", "must be greater than zero"));
            }
            cfg.poll.interval = Duration::from_secs(secs);
        }
        if let Some(address) = lookup(ENV_SCANNER_ADDRESS) {
            cfg.poll.scanner_address = address.trim().to_string();
        }

        if let Some(port) = parse_var::<u16, _>(&lookup, ENV_APP_PORT)? {
            cfg.upstream.app_port = port;
        }
        if let Some(url) = non_empty(&lookup, ENV_HEALTH_URL) {
            cfg.upstream.health_url = url;
        }
        if let Some(url) = non_empty(&lookup, ENV_SLA_API_URL) {
            cfg.upstream.sla_api_url = url;
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, ENV_REQUEST_TIMEOUT)? {
            if secs == 0 {
                return Err(invalid(ENV_REQUEST_TIMEOUT, "0", "must be greater than zero"));
            }
            cfg.upstream.timeout = Duration::from_secs(secs);
        }

        if let Some(port) = parse_var::<u16, _>(&lookup, ENV_EXPORTER_PORT)? {
            cfg.metrics.listen_addr.set_port(port);
        }

        Ok(cfg)
    }

    /// `true` when a hung upstream request could outlast a whole poll interval.
    pub fn timeout_exceeds_interval(&self) -> bool {
        self.upstream.timeout >= self.poll.interval
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(key, &raw, &e.to_string())),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
