//! Prometheus-backed metrics and HTTP exporter.
//!
//! This module defines a [`MetricsRegistry`] that owns a Prometheus
//! registry and the node gauges ([`NodeMetrics`]), and an async HTTP
//! exporter that serves `/metrics` using `hyper`.
//!
//! Gauges are overwritten, never accumulated. Label combinations that stop
//! appearing keep their last value: nothing is ever removed from a vec.

use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, body::Incoming, header, server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use prometheus::{self, Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};

use crate::extract::{ComponentStatus, NodeHealth};

/// Gauges describing one Forta scan node.
///
/// Registered into a [`Registry`] and updated by the poll loop. Each
/// gauge is internally atomic, so scrapes never observe a torn value.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Node version, always `1`, labeled by the version string.
    pub version: GaugeVec,
    /// Scanner status code, labeled by the cleaned summary detail.
    pub scanner_status: GaugeVec,
    /// Last block fed to the scanner.
    pub scanner_block_height: Gauge,
    pub inspector_status: GaugeVec,
    pub json_rpc_status: GaugeVec,
    pub supervisor_status: GaugeVec,
    pub updater_status: GaugeVec,
    /// Total agents in the pool, labeled by the lagging agent count.
    pub agent_pool: GaugeVec,
    /// Chain id, labeled by network name.
    pub chain_id: GaugeVec,
    /// Average SLA of the configured scanner address.
    pub sla: GaugeVec,
}

impl NodeMetrics {
    /// Registers the node metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let version = gauge_vec(registry, "version", "Forta node version", &["forta_version"])?;
        let scanner_status = gauge_vec(
            registry,
            "scanner_status",
            "Forta scanner status, 0 means ok",
            &["detail"],
        )?;

        let scanner_block_height = Gauge::with_opts(Opts::new(
            "scanner_block_height",
            "Forta scanner last block fed",
        ))?;
        registry.register(Box::new(scanner_block_height.clone()))?;

        let inspector_status = gauge_vec(
            registry,
            "inspector_status",
            "Forta inspector status, 0 means ok",
            &["detail"],
        )?;
        let json_rpc_status = gauge_vec(
            registry,
            "json_rpc_status",
            "Forta json rpc status, 0 means ok",
            &["detail"],
        )?;
        let supervisor_status = gauge_vec(
            registry,
            "supervisor_status",
            "Forta supervisor status, 0 means ok",
            &["detail"],
        )?;
        let updater_status = gauge_vec(
            registry,
            "updater_status",
            "Forta updater status, 0 means ok",
            &["detail"],
        )?;
        let agent_pool = gauge_vec(
            registry,
            "agent_pool",
            "Number of Forta agent pool",
            &["agent_lag_count"],
        )?;
        let chain_id = gauge_vec(
            registry,
            "chainid",
            "Chain id of the chain forta node is running",
            &["network"],
        )?;
        let sla = gauge_vec(
            registry,
            "sla",
            "SLA for the scanner address",
            &["scanner_address"],
        )?;

        Ok(Self {
            version,
            scanner_status,
            scanner_block_height,
            inspector_status,
            json_rpc_status,
            supervisor_status,
            updater_status,
            agent_pool,
            chain_id,
            sla,
        })
    }

    /// Publishes the SLA average for `scanner_address`.
    pub fn record_sla(&self, scanner_address: &str, average: f64) {
        self.sla.with_label_values(&[scanner_address]).set(average);
    }

    /// Publishes every field present in `health`; absent fields leave
    /// their gauges untouched.
    pub fn record_health(&self, health: &NodeHealth) {
        if let Some(version) = &health.version {
            self.version.with_label_values(&[version.as_str()]).set(1.0);
        }
        if let Some(scanner) = &health.scanner {
            set_status(&self.scanner_status, scanner);
        }
        if let Some(height) = health.block_height {
            self.scanner_block_height.set(height as f64);
        }
        if let Some(inspector) = &health.inspector {
            set_status(&self.inspector_status, inspector);
        }
        if let Some(json_rpc) = &health.json_rpc {
            set_status(&self.json_rpc_status, json_rpc);
        }
        if let Some(supervisor) = &health.supervisor {
            set_status(&self.supervisor_status, supervisor);
        }
        if let Some(updater) = &health.updater {
            set_status(&self.updater_status, updater);
        }
        if let Some(pool) = &health.agent_pool {
            self.agent_pool
                .with_label_values(&[pool.lagging.as_str()])
                .set(pool.total as f64);
        }
        if let Some(chain) = &health.chain {
            self.chain_id
                .with_label_values(&[chain.network])
                .set(chain.chain_id as f64);
        }
    }
}

fn gauge_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<GaugeVec, prometheus::Error> {
    let gauge = GaugeVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

fn set_status(gauge: &GaugeVec, component: &ComponentStatus) {
    gauge
        .with_label_values(&[component.detail.as_str()])
        .set(component.status.code() as f64);
}

/// Wrapper around a Prometheus registry and the node metrics.
///
/// This is the main handle you pass around in the exporter. It can be
/// wrapped in an [`Arc`] and shared between the poll loop and the HTTP
/// server.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub node: NodeMetrics,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with a fresh underlying `Registry`
    /// (namespace `forta`) and registers the node metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("forta".to_string()), None)?;
        let node = NodeMetrics::register(&registry)?;
        Ok(Self { registry, node })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            error!("failed to encode Prometheus metrics: {e}");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// The `/metrics` listener.
///
/// Binding and serving are separate steps so the binary can refuse to
/// start when the port is taken instead of polling with nothing exposed.
///
/// ```ignore
/// let server = MetricsServer::bind("0.0.0.0:9877".parse()?).await?;
/// tokio::spawn(server.serve(registry.clone()));
/// ```
pub struct MetricsServer {
    listener: TcpListener,
}

impl MetricsServer {
    pub async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    /// Address actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves `GET /metrics` until the task is dropped. Every other path is
    /// a 404. Failed accepts are logged and retried; they never stop the
    /// listener.
    pub async fn serve(self, metrics: Arc<MetricsRegistry>) {
        if let Ok(addr) = self.listener.local_addr() {
            info!("metrics exporter listening on http://{addr}/metrics");
        }

        loop {
            let stream = match self.listener.accept().await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    warn!("failed to accept metrics connection: {e}");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            let metrics = metrics.clone();
            tokio::spawn(async move {
                let svc = service_fn(move |req| handle_request(req, metrics.clone()));
                if let Err(e) = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), svc)
                    .await
                {
                    debug!("metrics connection closed with error: {e}");
                }
            });
        }
    }
}

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

async fn handle_request(
    req: Request<Incoming>,
    metrics: Arc<MetricsRegistry>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(route(req.method(), req.uri().path(), &metrics))
}

fn route(method: &Method, path: &str, metrics: &MetricsRegistry) -> Response<Full<Bytes>> {
    let (status, content_type, body) = match (method, path) {
        (&Method::GET, "/metrics") => (
            StatusCode::OK,
            "text/plain; version=0.0.4",
            metrics.gather_text(),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            "text/plain",
            "not found".to_string(),
        ),
    };

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(content_type),
    );
    response
}
