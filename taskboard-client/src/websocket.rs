use crate::errors::{ClientError, ClientResult};
use crate::transport::RpcTransport;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use taskboard_core::rpc::{RpcRequest, RpcResponse};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message};

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<RpcResponse>>>>;

/// JSON-RPC over a persistent WebSocket. A writer task drains outgoing
/// frames; a reader task routes responses to waiting callers by id.
pub struct WebSocketTransport {
    tx: mpsc::Sender<String>,
    pending: PendingMap,
    next_id: AtomicU64,
    is_connected: Arc<AtomicBool>,
}

impl WebSocketTransport {
    pub async fn connect(url: &str) -> ClientResult<Self> {
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| ClientError::WebSocket(e.to_string()))?;
        tracing::info!("Connected to provider WebSocket at {}", url);

        let (write, read) = ws_stream.split();
        let (tx, mut rx) = mpsc::channel::<String>(100);
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let is_connected = Arc::new(AtomicBool::new(true));

        // Spawn writer task
        let is_connected_w = is_connected.clone();
        tokio::spawn(async move {
            let mut write = write;
            while let Some(frame) = rx.recv().await {
                if let Err(e) = write.send(Message::Text(frame)).await {
                    tracing::warn!("WebSocket write failed: {}", e);
                    is_connected_w.store(false, Ordering::Relaxed);
                    break;
                }
            }
        });

        // Spawn reader task
        let is_connected_r = is_connected.clone();
        let pending_r = pending.clone();
        tokio::spawn(async move {
            let mut read = read;
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<RpcResponse>(&text) {
                        Ok(response) => {
                            let Some(id) = response.id else {
                                tracing::debug!("Ignoring frame without id: {}", text);
                                continue;
                            };
                            if let Some(waiter) = pending_r.lock().await.remove(&id) {
                                let _ = waiter.send(response);
                            }
                        }
                        Err(e) => tracing::warn!("Unparseable provider frame: {}", e),
                    },
                    Ok(Message::Close(_)) | Err(_) => break,
                    _ => {}
                }
            }
            is_connected_r.store(false, Ordering::Relaxed);
            // Dropping the senders wakes every caller with a closed channel
            pending_r.lock().await.clear();
            tracing::warn!("Provider WebSocket closed");
        });

        Ok(Self {
            tx,
            pending,
            next_id: AtomicU64::new(1),
            is_connected,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RpcTransport for WebSocketTransport {
    async fn request(&self, method: &str, params: Value) -> ClientResult<Value> {
        if !self.is_connected() {
            return Err(ClientError::ConnectionClosed);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = serde_json::to_string(&RpcRequest::new(id, method, params))?;
        let (waiter, response) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            // The reader clears the map under this lock when the socket closes
            if !self.is_connected() {
                return Err(ClientError::ConnectionClosed);
            }
            pending.insert(id, waiter);
        }
        tracing::debug!("RPC ws -> {} (id {})", method, id);

        if self.tx.send(frame).await.is_err() {
            self.pending.lock().await.remove(&id);
            return Err(ClientError::ConnectionClosed);
        }

        let response = response.await.map_err(|_| ClientError::ConnectionClosed)?;
        Ok(response.into_result()?)
    }
}
