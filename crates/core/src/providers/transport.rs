use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

/// A raw HTTP response: status plus unparsed body. Deserialization is the
/// caller's job — the gateway knows the payload shape, the transport does
/// not.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// How a transport-level call can fail before any HTTP status exists.
/// The fetcher maps `Connect` to the rate-limit condition and retries
/// `Other`.
#[derive(Debug, Clone)]
pub enum TransportError {
    /// The connection could not be established at all.
    Connect(String),
    /// The call failed after connecting (body stream, protocol, ...).
    Other(String),
}

/// Seam for the single outbound network call, so the fetcher and gateway
/// can be exercised without a live endpoint.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by reqwest.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    TransportError::Connect(e.to_string())
                } else {
                    TransportError::Other(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
