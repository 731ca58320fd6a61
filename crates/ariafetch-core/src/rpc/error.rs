//! Errors raised by the JSON-RPC session.

use thiserror::Error;

/// Failure of a single JSON-RPC exchange with the daemon.
#[derive(Debug, Error)]
pub enum RpcError {
    /// WebSocket handshake with the endpoint failed (daemon unreachable, bad URL, ...).
    #[error("could not connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    /// Socket error while sending a frame.
    #[error("websocket transport: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// The session was closed before a response arrived.
    #[error("connection to the daemon closed")]
    ConnectionClosed,

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// The daemon answered with a JSON-RPC error object.
    #[error("daemon returned error: code={code}, message={message}")]
    Server { code: i64, message: String },

    /// The daemon answered with something that is not a valid response.
    #[error("protocol: {0}")]
    Protocol(String),
}
