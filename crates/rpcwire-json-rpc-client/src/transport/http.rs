//! HTTP transport: POSTs each payload as `application/json`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};
use url::Url;

use crate::error::{JsonRpcClientResult, TransportError};
use crate::transport::Transport;

/// HTTP transport for the JSON-RPC client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(endpoint: &str) -> JsonRpcClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("rpcwire-json-rpc-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Self::with_client(endpoint, client)
    }

    /// Create HTTP transport with custom client
    pub fn with_client(endpoint: &str, client: Client) -> JsonRpcClientResult<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| TransportError::ConnectionFailed(format!("Invalid URL: {}", e)))?;

        // Validate URL scheme
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::ConnectionFailed(format!(
                "Invalid scheme for HTTP transport: {}",
                url.scheme()
            ))
            .into());
        }

        Ok(Self {
            client,
            endpoint: url,
        })
    }

    pub fn url(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&mut self, payload: String) -> JsonRpcClientResult<String> {
        debug!(endpoint = %self.endpoint, bytes = payload.len(), "POST JSON-RPC payload");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(status = %status, "JSON-RPC endpoint returned an error status");
            return Err(TransportError::Http(format!("HTTP error {}: {}", status, error_text)).into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Http(format!("Failed to read response body: {}", e)))?;
        Ok(body)
    }

    fn endpoint(&self) -> String {
        self.endpoint.to_string()
    }
}
