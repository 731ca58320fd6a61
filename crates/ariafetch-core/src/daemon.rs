//! The daemon operations the fetch flow relies on.
//!
//! [`crate::aria2::Aria2Client`] is the real implementation; tests drive the
//! waiter and reporter with scripted fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::aria2::{DownloadRequest, DownloadState, Gid, StatusKey, StatusSnapshot, VersionInfo};
use crate::rpc::RpcError;

/// Why waiting for a download did not end in completion.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The download reached a terminal state other than `complete`.
    #[error("download {gid} ended with status {state}")]
    Ended { gid: Gid, state: DownloadState },

    #[error(transparent)]
    Rpc(#[from] RpcError),
}

#[async_trait]
pub trait Daemon: Send + Sync {
    /// Version handshake.
    async fn get_version(&self) -> Result<VersionInfo, RpcError>;

    /// Queues one download; the request must carry at least one URI.
    async fn add_uri(&self, request: &DownloadRequest) -> Result<Gid, RpcError>;

    /// Fetches a snapshot restricted to `keys` (all keys when empty).
    async fn tell_status(&self, gid: &Gid, keys: &[StatusKey])
        -> Result<StatusSnapshot, RpcError>;

    /// Blocks until the download is no longer active, waiting or paused.
    /// `Ok` only when it completed.
    async fn wait_for_download(&self, gid: &Gid) -> Result<(), WaitError>;
}
