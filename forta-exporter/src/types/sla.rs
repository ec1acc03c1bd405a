use serde::{Deserialize, Serialize};

/// Response of `GET /stats/sla/scanner/{address}`.
///
/// Only the fields the exporter reads are modelled; anything else in the
/// body is ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlaReport {
    pub statistics: SlaStatistics,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlaStatistics {
    /// Average SLA score over the service's reporting window.
    pub avg: f64,
}

impl SlaReport {
    pub fn average(&self) -> f64 {
        self.statistics.avg
    }
}
