use crate::errors::{ClientError, ClientResult};
use crate::websocket::WebSocketTransport;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use taskboard_core::rpc::{RpcRequest, RpcResponse};

/// A JSON-RPC channel to a node. Implementations correlate responses by id.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> ClientResult<Value>;
}

/// Open a transport for `url`, picking HTTP or WebSocket from the scheme.
pub async fn connect(url: &str) -> ClientResult<Arc<dyn RpcTransport>> {
    let scheme = url.split_once("://").map(|(scheme, _)| scheme);
    match scheme {
        Some("http") | Some("https") => Ok(Arc::new(HttpTransport::new(url))),
        Some("ws") | Some("wss") => Ok(Arc::new(WebSocketTransport::connect(url).await?)),
        _ => Err(ClientError::UnsupportedEndpoint(url.to_string())),
    }
}

/// JSON-RPC over HTTP POST, one request per call.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpTransport {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> ClientResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        tracing::debug!("RPC {} -> {} (id {})", self.url, method, id);

        let response: RpcResponse = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.into_result()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_scheme_rejected() {
        let result = connect("ftp://localhost:8545").await;
        assert!(matches!(result, Err(ClientError::UnsupportedEndpoint(_))));

        let result = connect("localhost:8545").await;
        assert!(matches!(result, Err(ClientError::UnsupportedEndpoint(_))));
    }
}
