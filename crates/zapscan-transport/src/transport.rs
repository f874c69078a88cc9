//! Transport layer: one JSON call against the engine's control surface
//!
//! A call either yields the parsed JSON body or a `TransportError`. There are
//! no retries here; callers decide whether a failure matters.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::types::Endpoint;

/// Why a control call produced no data
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {endpoint} timed out after {seconds}s")]
    Timeout { endpoint: Endpoint, seconds: u64 },

    #[error("Engine returned status {status} for {endpoint}: {message}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        message: String,
    },

    #[error("Response from {endpoint} is not valid JSON: {source}")]
    InvalidJson {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response from {endpoint} has no usable `{field}` field")]
    MissingField {
        endpoint: Endpoint,
        field: &'static str,
    },

    #[error("Invalid engine endpoint: {0}")]
    InvalidEndpoint(String),
}

impl From<TransportError> for zapscan_core::Error {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Status {
                status, message, ..
            } => zapscan_core::Error::Api { status, message },
            TransportError::InvalidEndpoint(msg) => zapscan_core::Error::Configuration(msg),
            other => zapscan_core::Error::Transport(other.to_string()),
        }
    }
}

/// A single request/response call against the engine
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one call and return the parsed JSON body
    async fn call(&self, endpoint: Endpoint, params: &[(&str, &str)])
        -> Result<Value, TransportError>;

    /// Base URL used for diagnostics
    fn describe(&self) -> String;
}

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Engine base URL (e.g., "http://localhost:8080"). A path prefix such
    /// as "http://gateway/zap" is kept in front of every API path.
    pub base_url: String,
    /// API key, sent as `X-ZAP-API-Key` when set
    pub api_key: Option<String>,
    /// Upper bound on one call
    pub request_timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:8080"),
            api_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// reqwest-backed transport
pub struct HttpTransport {
    base_url: Url,
    api_key: Option<String>,
    timeout: Duration,
    http: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| TransportError::InvalidEndpoint(format!("{}: {}", config.base_url, e)))?;
        // `join` replaces the last path segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(format!("zapscan/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url,
            api_key: config.api_key,
            timeout: config.request_timeout,
            http,
        })
    }

    fn url_for(&self, endpoint: Endpoint) -> Result<Url, TransportError> {
        self.base_url
            .join(endpoint.path().trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidEndpoint(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(
        &self,
        endpoint: Endpoint,
        params: &[(&str, &str)],
    ) -> Result<Value, TransportError> {
        let url = self.url_for(endpoint)?;
        debug!("GET {} {:?}", url, params);

        let mut request = self.http.get(url).query(params);
        if let Some(key) = &self.api_key {
            request = request.header("X-ZAP-API-Key", key);
        }

        let res = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout {
                    endpoint,
                    seconds: self.timeout.as_secs(),
                }
            } else {
                TransportError::Http(e)
            }
        })?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint,
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|source| TransportError::InvalidJson { endpoint, source })
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response and hand back the request line
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let text = String::from_utf8_lossy(&request).to_string();
            text.lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn transport(base_url: String) -> HttpTransport {
        HttpTransport::new(HttpTransportConfig {
            base_url,
            api_key: Some("k".into()),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_call_parses_json_and_encodes_params() {
        let (base, server) = serve_once("200 OK", r#"{"alerts": []}"#).await;
        let transport = transport(base);

        let value = transport
            .call(Endpoint::Alerts, &[("baseurl", "http://localhost:3000")])
            .await
            .unwrap();
        assert_eq!(value["alerts"], serde_json::json!([]));

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /JSON/core/view/alerts/?baseurl=http%3A%2F%2Flocalhost%3A3000"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_failure() {
        let (base, _server) = serve_once("400 Bad Request", r#"{"code":"url_not_found"}"#).await;
        let err = transport(base).call(Endpoint::Version, &[]).await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_non_json_body_is_failure() {
        let (base, _server) = serve_once("200 OK", "<html>proxy error</html>").await;
        let err = transport(base).call(Endpoint::Version, &[]).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidJson { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = transport(format!("http://{}", addr))
            .call(Endpoint::Version, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Http(_)));
    }

    #[tokio::test]
    async fn test_base_url_path_prefix_is_kept() {
        let (base, server) = serve_once("200 OK", r#"{"version": "2.14.0"}"#).await;
        let transport = transport(format!("{}/zap", base));

        transport.call(Endpoint::Version, &[]).await.unwrap();

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /zap/JSON/core/view/version/"));
    }

    #[tokio::test]
    async fn test_silent_engine_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let transport = HttpTransport::new(HttpTransportConfig {
            base_url: format!("http://{}", addr),
            api_key: None,
            request_timeout: Duration::from_secs(1),
        })
        .unwrap();

        let err = transport.call(Endpoint::Version, &[]).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Timeout {
                endpoint: Endpoint::Version,
                seconds: 1
            }
        ));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = HttpTransport::new(HttpTransportConfig {
            base_url: "not a url".into(),
            ..Default::default()
        });
        assert!(matches!(result, Err(TransportError::InvalidEndpoint(_))));
    }
}
