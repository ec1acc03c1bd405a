//! Health record extraction.
//!
//! Turns one [`HealthReport`] into a typed [`NodeHealth`] view: each known
//! record name is looked up independently, so a record missing from the
//! payload (or carrying an unparsable value) only leaves its own field
//! empty. Nothing in here fails.

use tracing::{debug, warn};

use crate::types::{HealthReport, NodeStatus, network_name};

pub const VERSION: &str = "forta.version";
pub const SCANNER_SUMMARY: &str = "forta.container.forta-scanner.summary";
pub const SCANNER_LAST_BLOCK: &str = "forta.container.forta-scanner.service.block-feed.last-block";
pub const INSPECTOR: &str = "forta.container.forta-inspector";
pub const JSON_RPC: &str = "forta.container.forta-json-rpc";
pub const SUPERVISOR: &str = "forta.container.forta-supervisor";
pub const UPDATER: &str = "forta.container.forta-updater";
pub const AGENTS_TOTAL: &str = "forta.container.forta-scanner.service.agent-pool.agents.total";
pub const AGENTS_LAGGING: &str = "forta.container.forta-scanner.service.agent-pool.agents.lagging";
pub const CHAIN_ID: &str = "forta.container.forta-inspector.service.inspector.scan-api.chain-id";

/// Status of one node container, ready to be exported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentStatus {
    pub status: NodeStatus,
    /// Value of the `detail` label.
    pub detail: String,
}

/// Size of the scanner's agent pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentPool {
    pub total: u64,
    /// Lagging agent count, kept verbatim since it is only used as a label.
    pub lagging: String,
}

/// Chain the node is scanning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainInfo {
    pub chain_id: u64,
    /// Network name, empty for chains we don't know.
    pub network: &'static str,
}

/// Everything the exporter reads out of one health report.
///
/// `None` means "don't touch that metric this tick".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeHealth {
    pub version: Option<String>,
    pub scanner: Option<ComponentStatus>,
    pub block_height: Option<u64>,
    pub inspector: Option<ComponentStatus>,
    pub json_rpc: Option<ComponentStatus>,
    pub supervisor: Option<ComponentStatus>,
    pub updater: Option<ComponentStatus>,
    pub agent_pool: Option<AgentPool>,
    pub chain: Option<ChainInfo>,
}

impl NodeHealth {
    pub fn from_report(report: &HealthReport) -> Self {
        Self {
            version: detail(report, VERSION).map(str::to_string),
            scanner: scanner_status(report),
            block_height: numeric_detail(report, SCANNER_LAST_BLOCK),
            inspector: component_status(report, INSPECTOR),
            json_rpc: component_status(report, JSON_RPC),
            supervisor: component_status(report, SUPERVISOR),
            updater: component_status(report, UPDATER),
            agent_pool: agent_pool(report),
            chain: numeric_detail(report, CHAIN_ID).map(|chain_id| ChainInfo {
                chain_id,
                network: network_name(chain_id),
            }),
        }
    }

    /// Number of metrics this view would update.
    pub fn present(&self) -> usize {
        [
            self.version.is_some(),
            self.scanner.is_some(),
            self.block_height.is_some(),
            self.inspector.is_some(),
            self.json_rpc.is_some(),
            self.supervisor.is_some(),
            self.updater.is_some(),
            self.agent_pool.is_some(),
            self.chain.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

/// Strips a leading `"at block <digits>. "` from a scanner summary.
///
/// The block number is exported separately; leaving it in the label would
/// create a new series for every block. Only a leading prefix is removed,
/// and only once.
pub fn strip_block_prefix(detail: &str) -> &str {
    let Some(rest) = detail.strip_prefix("at block ") else {
        return detail;
    };
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return detail;
    }
    rest[digits..].strip_prefix(". ").unwrap_or(detail)
}

fn detail<'a>(report: &'a HealthReport, name: &str) -> Option<&'a str> {
    let found = report.find_detail(name);
    if found.is_none() {
        debug!(record = name, "health record missing");
    }
    found
}

fn numeric_detail(report: &HealthReport, name: &str) -> Option<u64> {
    let raw = detail(report, name)?;
    match raw.trim().parse::<u64>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(record = name, details = raw, "health record is not an integer: {e}");
            None
        }
    }
}

fn component_status(report: &HealthReport, name: &str) -> Option<ComponentStatus> {
    let Some(record) = report.find(name) else {
        debug!(record = name, "health record missing");
        return None;
    };
    Some(ComponentStatus {
        status: NodeStatus::parse(&record.status),
        detail: record.details.clone(),
    })
}

/// A healthy scanner summary is exported with an empty detail: it only
/// ever reads `"at block N."`.
fn scanner_status(report: &HealthReport) -> Option<ComponentStatus> {
    let mut component = component_status(report, SCANNER_SUMMARY)?;
    component.detail = if component.status.is_ok() {
        String::new()
    } else {
        strip_block_prefix(&component.detail).to_string()
    };
    Some(component)
}

fn agent_pool(report: &HealthReport) -> Option<AgentPool> {
    let total = numeric_detail(report, AGENTS_TOTAL)?;
    let lagging = detail(report, AGENTS_LAGGING)?;
    Some(AgentPool {
        total,
        lagging: lagging.to_string(),
    })
}
