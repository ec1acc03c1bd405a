//! Clients for the two upstream data sources.
//!
//! [`NodeSource`] abstracts over "fetch the SLA" and "fetch the health
//! report" so the poll loop can be driven by an in-memory source in tests.
//! [`HttpNodeSource`] is the real implementation.

pub mod http;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::{HealthReport, SlaReport};

pub use http::HttpNodeSource;

/// Upstream resources read once per poll tick.
#[async_trait]
pub trait NodeSource: Send + Sync {
    /// Fetches the SLA statistics of `scanner_address`.
    async fn fetch_sla(&self, scanner_address: &str) -> Result<SlaReport, FetchError>;

    /// Fetches the node's health report.
    async fn fetch_health(&self) -> Result<HealthReport, FetchError>;
}
