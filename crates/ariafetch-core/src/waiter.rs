//! Background task that waits for the download to end and reports once.

use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::aria2::{DownloadState, ErrorCode, Gid, StatusKey};
use crate::daemon::Daemon;
use crate::rpc::RpcError;

/// Keys fetched to describe a failed download.
const DIAGNOSTIC_KEYS: [StatusKey; 3] = [
    StatusKey::Status,
    StatusKey::ErrorCode,
    StatusKey::ErrorMessage,
];

/// Why the download did not complete, as sent by the waiter.
#[derive(Debug)]
pub enum DownloadFailure {
    /// Diagnostic fetched from the daemon.
    Failed {
        status: Option<DownloadState>,
        error_code: Option<ErrorCode>,
        error_message: Option<String>,
    },
    /// The download did not complete and its status could not be fetched either.
    StatusUnavailable(RpcError),
}

impl fmt::Display for DownloadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadFailure::Failed {
                status,
                error_code,
                error_message,
            } => {
                write!(f, "failed to download")?;
                if let Some(desc) = error_code.and_then(ErrorCode::description) {
                    write!(f, " ({desc})")?;
                }
                write!(
                    f,
                    ": status={} errorCode={} errorMessage={}",
                    status.map(DownloadState::as_str).unwrap_or("unknown"),
                    error_code.map(ErrorCode::code).unwrap_or(0),
                    error_message.as_deref().unwrap_or("")
                )
            }
            DownloadFailure::StatusUnavailable(e) => {
                write!(f, "failed to get download status: {e}")
            }
        }
    }
}

impl std::error::Error for DownloadFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DownloadFailure::StatusUnavailable(e) => Some(e),
            DownloadFailure::Failed { .. } => None,
        }
    }
}

pub type Completion = Result<(), DownloadFailure>;

/// Spawns the waiter. The receiver yields exactly one value: the sender is
/// consumed by the single send.
pub fn spawn_waiter(daemon: Arc<dyn Daemon>, gid: Gid) -> oneshot::Receiver<Completion> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let completion = wait(daemon.as_ref(), &gid).await;
        if tx.send(completion).is_err() {
            tracing::debug!(%gid, "download outcome dropped: reporter is gone");
        }
    });
    rx
}

async fn wait(daemon: &dyn Daemon, gid: &Gid) -> Completion {
    let err = match daemon.wait_for_download(gid).await {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    tracing::debug!(%gid, "wait for download ended: {}", err);

    match daemon.tell_status(gid, &DIAGNOSTIC_KEYS).await {
        Ok(status) => Err(DownloadFailure::Failed {
            status: status.status,
            error_code: status.error_code,
            error_message: status.error_message,
        }),
        Err(e) => Err(DownloadFailure::StatusUnavailable(e)),
    }
}
