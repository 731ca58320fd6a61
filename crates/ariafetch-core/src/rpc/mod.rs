//! JSON-RPC 2.0 client over a WebSocket.
//!
//! Knows nothing about aria2 methods; see [`crate::aria2`] for those.

mod error;
mod message;
mod session;

pub use error::RpcError;
pub use message::Notification;
pub use session::RpcSession;
