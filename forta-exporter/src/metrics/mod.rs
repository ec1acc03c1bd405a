//! Metrics for the exporter.
//!
//! This module defines the Prometheus gauges derived from the node health
//! report and the scanner SLA, and exposes a small HTTP exporter that
//! serves `/metrics` in Prometheus text format.
//!
//! Typical usage:
//!
//! ```ignore
//! use std::net::SocketAddr;
//! use std::sync::Arc;
//! use forta_exporter::metrics::{MetricsRegistry, MetricsServer};
//!
//! let registry = Arc::new(MetricsRegistry::new()?);
//! let addr: SocketAddr = "0.0.0.0:9877".parse()?;
//!
//! // Bind up front, then serve in the background:
//! let server = MetricsServer::bind(addr).await?;
//! tokio::spawn(server.serve(registry.clone()));
//!
//! // Elsewhere in the code:
//! registry.node.record_sla("0xABC", 0.987);
//! ```

pub mod prometheus;

pub use prometheus::{MetricsRegistry, MetricsServer, NodeMetrics};
