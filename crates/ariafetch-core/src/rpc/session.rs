//! WebSocket session: request/response correlation and notification fan-out.
//!
//! One reader task owns the receive half of the socket. Responses are routed
//! to the pending caller by id; notifications are broadcast to subscribers.
//! When the socket closes every pending call fails with `ConnectionClosed`
//! and the broadcast sender is dropped so subscribers see the closure.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::message::{Incoming, JsonRpcRequest, Notification};
use super::RpcError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Pending = oneshot::Sender<Result<Value, RpcError>>;

/// Capacity of the notification fan-out; slower subscribers see `Lagged`.
const NOTIFICATION_CAPACITY: usize = 64;

/// State shared between callers and the reader task.
struct Shared {
    pending: HashMap<u64, Pending>,
    /// `None` once the reader has exited.
    notifications: Option<broadcast::Sender<Notification>>,
}

/// An open JSON-RPC session with the daemon.
pub struct RpcSession {
    sink: Mutex<SplitSink<WsStream, Message>>,
    shared: Arc<Mutex<Shared>>,
    next_id: AtomicU64,
    reader: JoinHandle<()>,
}

impl RpcSession {
    /// Opens the WebSocket and starts the reader task. No retry.
    pub async fn connect(url: &str) -> Result<Self, RpcError> {
        let (ws, _response) =
            tokio_tungstenite::connect_async(url)
                .await
                .map_err(|source| RpcError::Connect {
                    url: url.to_string(),
                    source,
                })?;
        let (sink, stream) = ws.split();

        let (tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let shared = Arc::new(Mutex::new(Shared {
            pending: HashMap::new(),
            notifications: Some(tx),
        }));
        let reader = tokio::spawn(read_loop(stream, Arc::clone(&shared)));
        tracing::debug!(url, "rpc session open");

        Ok(Self {
            sink: Mutex::new(sink),
            shared,
            next_id: AtomicU64::new(1),
            reader,
        })
    }

    /// Sends one request and waits for its response. No timeout.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let value = self.call_value(method, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn call_value(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let text = serde_json::to_string(&JsonRpcRequest::new(id, method, params))?;

        let (tx, rx) = oneshot::channel();
        {
            let mut shared = self.shared.lock().await;
            if shared.notifications.is_none() {
                return Err(RpcError::ConnectionClosed);
            }
            shared.pending.insert(id, tx);
        }

        tracing::trace!(id, method, "rpc call");
        let sent = self.sink.lock().await.send(Message::Text(text)).await;
        if let Err(e) = sent {
            self.shared.lock().await.pending.remove(&id);
            return Err(e.into());
        }

        rx.await.map_err(|_| RpcError::ConnectionClosed)?
    }

    /// Subscribes to daemon notifications received from now on.
    pub async fn subscribe(&self) -> Result<broadcast::Receiver<Notification>, RpcError> {
        self.shared
            .lock()
            .await
            .notifications
            .as_ref()
            .map(broadcast::Sender::subscribe)
            .ok_or(RpcError::ConnectionClosed)
    }
}

impl Drop for RpcSession {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_loop(mut stream: SplitStream<WsStream>, shared: Arc<Mutex<Shared>>) {
    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!("rpc session read: {}", e);
                break;
            }
        };

        match Incoming::parse(&text) {
            Ok(Incoming::Response { id, outcome }) => {
                let waiter = shared.lock().await.pending.remove(&id);
                match waiter {
                    Some(tx) => {
                        let _ = tx.send(outcome);
                    }
                    None => tracing::debug!(id, "response for unknown request id"),
                }
            }
            Ok(Incoming::Notification(n)) => {
                tracing::debug!(method = %n.method, "rpc notification");
                if let Some(tx) = shared.lock().await.notifications.as_ref() {
                    // No subscribers is fine.
                    let _ = tx.send(n);
                }
            }
            Err(e) => tracing::warn!("ignoring malformed rpc frame: {}", e),
        }
    }

    let mut shared = shared.lock().await;
    shared.notifications = None;
    for (_, tx) in shared.pending.drain() {
        let _ = tx.send(Err(RpcError::ConnectionClosed));
    }
    tracing::debug!("rpc session closed");
}
