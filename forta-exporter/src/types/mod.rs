//! Wire and domain types shared across the exporter.
//!
//! The upstream node reports its health as a loosely-typed list of named
//! records. This module gives that payload a fixed shape ([`HealthReport`])
//! and defines the two closed vocabularies the exporter maps into gauge
//! values and labels: node status codes ([`NodeStatus`]) and chain ids
//! ([`network_name`]).

/// Health report records returned by the node's `/health` endpoint.
pub mod health;
/// Chain id to network name mapping.
pub mod network;
/// Scanner SLA statistics returned by the public stats API.
pub mod sla;
/// Status string to ordinal code mapping.
pub mod status;

pub use health::{HealthRecord, HealthReport};
pub use network::network_name;
pub use sla::{SlaReport, SlaStatistics};
pub use status::{NodeStatus, status_code};
