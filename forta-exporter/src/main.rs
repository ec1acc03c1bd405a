// src/main.rs
//
// Exporter binary:
//
// - configuration from environment variables
// - Prometheus metrics exporter on /metrics
// - poll loop over the node health report and the scanner SLA
// - exits cleanly on Ctrl-C

use std::sync::Arc;

use tokio::signal;

use forta_exporter::{
    DefaultPoller, ExporterConfig, HttpNodeSource, MetricsRegistry, MetricsServer,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "forta_exporter=info".to_string()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cfg = ExporterConfig::from_env().map_err(|e| format!("invalid configuration: {e}"))?;

    tracing::info!(
        listen_addr = %cfg.metrics.listen_addr,
        health_url = %cfg.upstream.health_url,
        sla_api_url = %cfg.upstream.sla_api_url,
        app_port = cfg.upstream.app_port,
        interval_secs = cfg.poll.interval.as_secs(),
        timeout_secs = cfg.upstream.timeout.as_secs(),
        "forta exporter starting"
    );
    if cfg.poll.scanner_address.is_empty() {
        tracing::warn!("SCANNER_ADDRESS is not set; SLA requests will fail");
    }
    if cfg.timeout_exceeds_interval() {
        tracing::warn!(
            "request timeout ({}s) is not shorter than the polling interval ({}s)",
            cfg.upstream.timeout.as_secs(),
            cfg.poll.interval.as_secs()
        );
    }

    // ---------------------------
    // Metrics registry + exporter
    // ---------------------------

    let metrics = Arc::new(
        MetricsRegistry::new()
            .map_err(|e| format!("failed to initialise metrics registry: {e}"))?,
    );

    let addr = cfg.metrics.listen_addr;
    let server = MetricsServer::bind(addr)
        .await
        .map_err(|e| format!("failed to bind {addr}: {e}"))?;
    tokio::spawn(server.serve(metrics.clone()));

    // ---------------------------
    // Upstream client + poll loop
    // ---------------------------

    let source = HttpNodeSource::from_config(&cfg.upstream)
        .map_err(|e| format!("failed to create HTTP client: {e}"))?;

    let poller: DefaultPoller = DefaultPoller::new(
        source,
        metrics,
        cfg.poll.scanner_address.clone(),
        cfg.poll.interval,
    );

    tokio::select! {
        _ = poller.run() => {}
        _ = shutdown_signal() => {}
    }

    Ok(())
}

/// Waits for Ctrl-C or SIGTERM, used for graceful shutdown.
///
/// A handler that cannot be installed never resolves, so the exporter
/// keeps running instead of exiting straight away.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
