//! Poll loop.
//!
//! Every tick runs two independent units in sequence:
//!
//! 1. the SLA unit fetches the scanner SLA and sets `forta_sla`,
//! 2. the health unit fetches the node health report, extracts it via
//!    [`NodeHealth::from_report`] and sets the node gauges.
//!
//! A failing unit is logged and skipped; the gauges it would have written
//! keep their previous values. The loop itself never ends on its own.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::client::NodeSource;
use crate::extract::NodeHealth;
use crate::metrics::MetricsRegistry;

/// What one tick managed to publish.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The SLA gauge was updated.
    pub sla_updated: bool,
    /// Number of health metrics updated; `None` if the fetch failed.
    pub health_updated: Option<usize>,
}

/// Drives a [`NodeSource`] on a fixed interval and publishes into a
/// [`MetricsRegistry`].
pub struct Poller<S> {
    source: S,
    metrics: Arc<MetricsRegistry>,
    scanner_address: String,
    interval: Duration,
}

impl<S: NodeSource> Poller<S> {
    pub fn new(
        source: S,
        metrics: Arc<MetricsRegistry>,
        scanner_address: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            metrics,
            scanner_address: scanner_address.into(),
            interval,
        }
    }

    /// Runs ticks forever, sleeping `interval` after each one.
    pub async fn run(&self) {
        info!(
            interval_secs = self.interval.as_secs(),
            scanner_address = %self.scanner_address,
            "poll loop started"
        );

        loop {
            self.poll_once().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Runs both units once.
    pub async fn poll_once(&self) -> TickOutcome {
        let start = Instant::now();
        let outcome = TickOutcome {
            sla_updated: self.poll_sla().await,
            health_updated: self.poll_health().await,
        };

        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            sla_updated = outcome.sla_updated,
            health_updated = ?outcome.health_updated,
            "poll tick finished"
        );
        outcome
    }

    async fn poll_sla(&self) -> bool {
        match self.source.fetch_sla(&self.scanner_address).await {
            Ok(report) => {
                self.metrics
                    .node
                    .record_sla(&self.scanner_address, report.average());
                true
            }
            Err(e) => {
                warn!(url = e.url(), "error fetching SLA data: {e}");
                false
            }
        }
    }

    async fn poll_health(&self) -> Option<usize> {
        match self.source.fetch_health().await {
            Ok(report) => {
                let health = NodeHealth::from_report(&report);
                self.metrics.node.record_health(&health);
                Some(health.present())
            }
            Err(e) => {
                warn!(url = e.url(), "error fetching health data: {e}");
                None
            }
        }
    }
}
