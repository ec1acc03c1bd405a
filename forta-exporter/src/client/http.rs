//! HTTP-based upstream client.
//!
//! Talks to two endpoints:
//!
//! ```text
//! GET {sla_api_url}/stats/sla/scanner/{address}
//! { "statistics": { "avg": 0.987 } }
//!
//! GET {health_url}
//! [ { "name": "forta.version", "status": "info", "details": "v0.5.6" }, ... ]
//! ```
//!
//! No retries: a failed request is reported once and the next tick tries
//! again.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::client::NodeSource;
use crate::config::UpstreamConfig;
use crate::error::FetchError;
use crate::types::{HealthReport, SlaReport};

/// reqwest-backed [`NodeSource`].
///
/// The underlying client pools connections and is cheap to clone.
#[derive(Clone, Debug)]
pub struct HttpNodeSource {
    client: Client,
    health_url: String,
    sla_api_url: String,
}

impl HttpNodeSource {
    /// Builds a source with a per-request `timeout`.
    pub fn new(
        health_url: impl Into<String>,
        sla_api_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let sla_api_url = sla_api_url.into();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("forta-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport {
                url: sla_api_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            health_url: health_url.into(),
            sla_api_url,
        })
    }

    pub fn from_config(cfg: &UpstreamConfig) -> Result<Self, FetchError> {
        Self::new(cfg.health_url.clone(), cfg.sla_api_url.clone(), cfg.timeout)
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }

    /// URL of the SLA statistics for `scanner_address`.
    pub fn sla_url(&self, scanner_address: &str) -> String {
        // Avoid accidental double slashes.
        format!(
            "{}/stats/sla/scanner/{}",
            self.sla_api_url.trim_end_matches('/'),
            scanner_address
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: format!("failed to read body: {e}"),
        })?;

        decode(url, &body)
    }
}

/// Decodes a JSON body, mapping any failure to [`FetchError::Protocol`].
fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, FetchError> {
    serde_json::from_slice(body).map_err(|e| FetchError::Protocol {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl NodeSource for HttpNodeSource {
    async fn fetch_sla(&self, scanner_address: &str) -> Result<SlaReport, FetchError> {
        let url = self.sla_url(scanner_address);
        self.get_json(&url).await
    }

    async fn fetch_health(&self) -> Result<HealthReport, FetchError> {
        self.get_json(&self.health_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(sla_api_url: &str) -> HttpNodeSource {
        HttpNodeSource::new(
            "http://localhost:8090/health",
            sla_api_url,
            Duration::from_secs(1),
        )
        .expect("client should build")
    }

    #[test]
    fn sla_url_is_templated_with_address() {
        let src = source("https://api.forta.network");
        assert_eq!(
            src.sla_url("0xABC"),
            "https://api.forta.network/stats/sla/scanner/0xABC"
        );
        assert_eq!(src.health_url(), "http://localhost:8090/health");
    }

    #[test]
    fn sla_url_avoids_double_slash() {
        let src = source("http://stats.local/");
        assert_eq!(src.sla_url("0x1"), "http://stats.local/stats/sla/scanner/0x1");
    }

    #[test]
    fn decode_reports_protocol_errors() {
        let err = decode::<SlaReport>("http://x/sla", b"<html>bad gateway</html>").unwrap_err();
        match err {
            FetchError::Protocol { url, .. } => assert_eq!(url, "http://x/sla"),
            other => panic!("unexpected error variant: {other:?}"),
        }

        let err = decode::<HealthReport>("http://x/health", br#"{"statistics":{}}"#).unwrap_err();
        assert!(matches!(err, FetchError::Protocol { .. }));
    }

    #[test]
    fn decode_accepts_expected_shapes() {
        let sla: SlaReport =
            decode("http://x/sla", br#"{"statistics":{"avg":0.987}}"#).expect("sla decodes");
        assert_eq!(sla.average(), 0.987);

        let health: HealthReport = decode(
            "http://x/health",
            br#"[{"name":"forta.version","status":"info","details":"v0.5.6"}]"#,
        )
        .expect("health decodes");
        assert_eq!(health.find_detail("forta.version"), Some("v0.5.6"));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let src = HttpNodeSource::new(
            "http://127.0.0.1:9/health",
            "http://127.0.0.1:9",
            Duration::from_millis(500),
        )
        .expect("client should build");

        let err = src.fetch_health().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }), "got {err:?}");
        assert_eq!(err.url(), "http://127.0.0.1:9/health");
    }

    /// Serves one canned HTTP response to the first connection and returns
    /// the URL to request.
    async fn one_shot_server(response: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        format!("http://{addr}/health")
    }

    #[tokio::test]
    async fn non_success_status_is_a_status_error() {
        let url = one_shot_server(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        let src = HttpNodeSource::new(url.clone(), "http://127.0.0.1:9", Duration::from_secs(2))
            .expect("client should build");

        let err = src.fetch_health().await.unwrap_err();
        match err {
            FetchError::Status { url: failed, status } => {
                assert_eq!(status, 503);
                assert_eq!(failed, url);
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_protocol_error() {
        let url = one_shot_server(
            "HTTP/1.1 200 OK\r\ncontent-type: text/html\r\ncontent-length: 9\r\nconnection: close\r\n\r\nnot json!",
        )
        .await;
        let src = HttpNodeSource::new(url.clone(), "http://127.0.0.1:9", Duration::from_secs(2))
            .expect("client should build");

        let err = src.fetch_health().await.unwrap_err();
        assert!(matches!(err, FetchError::Protocol { .. }), "got {err:?}");
        assert_eq!(err.url(), url);
    }
}
