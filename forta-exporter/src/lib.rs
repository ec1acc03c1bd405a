//! Forta node exporter library crate.
//!
//! Polls a Forta scan node's `/health` report and the public scanner SLA
//! statistic, and republishes both as Prometheus gauges:
//!
//! - wire and domain types, plus the status / chain id mappings (`types`),
//! - health record extraction into a typed view (`extract`),
//! - upstream HTTP clients (`client`),
//! - Prometheus metrics and the `/metrics` exporter (`metrics`),
//! - the fixed-interval poll loop (`poller`),
//! - environment-driven configuration (`config`).
//!
//! The `forta-exporter` binary wires these together; everything here can
//! also be constructed in isolation, which is how the tests use it.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod poller;
pub mod types;

// Re-export top-level configuration types.
pub use config::{ExporterConfig, MetricsConfig, PollConfig, UpstreamConfig};

// Re-export error types.
pub use error::{ConfigError, FetchError};

// Re-export the upstream interfaces and the HTTP client.
pub use client::{HttpNodeSource, NodeSource};

// Re-export extraction and the poll loop.
pub use extract::{AgentPool, ChainInfo, ComponentStatus, NodeHealth, strip_block_prefix};
pub use poller::{Poller, TickOutcome};

// Re-export metrics registry and node metrics.
pub use metrics::{MetricsRegistry, MetricsServer, NodeMetrics};

// Re-export domain types at the crate root for convenience.
pub use types::*;

/// Type alias for the poll loop as run by the binary.
pub type DefaultPoller = Poller<HttpNodeSource>;
