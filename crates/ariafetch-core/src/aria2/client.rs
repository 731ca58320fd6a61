//! aria2 RPC methods on top of an [`RpcSession`].

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;

use super::{
    DownloadEvent, DownloadRequest, DownloadState, EventKind, Gid, StatusKey, StatusSnapshot,
    VersionInfo,
};
use crate::daemon::{Daemon, WaitError};
use crate::rpc::{RpcError, RpcSession};

/// Client for one aria2 daemon.
pub struct Aria2Client {
    session: RpcSession,
    secret: Option<String>,
}

impl Aria2Client {
    /// Opens a session. The handshake is a separate [`Daemon::get_version`] call.
    pub async fn connect(url: &str, secret: Option<&str>) -> Result<Self, RpcError> {
        let session = RpcSession::connect(url).await?;
        Ok(Self {
            session,
            secret: secret.map(str::to_string),
        })
    }

    /// Positional params, prefixed with `token:<secret>` when a secret is set.
    fn params(&self, args: Vec<Value>) -> Value {
        let mut params = Vec::with_capacity(args.len() + 1);
        if let Some(secret) = &self.secret {
            params.push(Value::String(format!("token:{secret}")));
        }
        params.extend(args);
        Value::Array(params)
    }

    async fn current_state(&self, gid: &Gid) -> Result<Option<DownloadState>, RpcError> {
        Ok(self.tell_status(gid, &[StatusKey::Status]).await?.status)
    }
}

#[async_trait]
impl Daemon for Aria2Client {
    async fn get_version(&self) -> Result<VersionInfo, RpcError> {
        self.session
            .call("aria2.getVersion", self.params(Vec::new()))
            .await
    }

    async fn add_uri(&self, request: &DownloadRequest) -> Result<Gid, RpcError> {
        let params = self.params(vec![json!(request.uris), request.options.to_rpc_value()]);
        let gid: String = self.session.call("aria2.addUri", params).await?;
        Ok(Gid::new(gid))
    }

    async fn tell_status(
        &self,
        gid: &Gid,
        keys: &[StatusKey],
    ) -> Result<StatusSnapshot, RpcError> {
        let mut args = vec![Value::String(gid.as_str().to_string())];
        if !keys.is_empty() {
            let keys: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
            args.push(json!(keys));
        }
        self.session.call("aria2.tellStatus", self.params(args)).await
    }

    async fn wait_for_download(&self, gid: &Gid) -> Result<(), WaitError> {
        // Subscribe before the status check so an event between the two is not lost.
        let mut events = self.session.subscribe().await?;

        loop {
            match self.current_state(gid).await? {
                Some(DownloadState::Complete) => return Ok(()),
                Some(state) if state.is_terminal() => {
                    return Err(WaitError::Ended {
                        gid: gid.clone(),
                        state,
                    })
                }
                _ => {}
            }

            loop {
                let notification = match events.recv().await {
                    Ok(n) => n,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(%gid, skipped, "missed daemon notifications; re-checking status");
                        break;
                    }
                    Err(RecvError::Closed) => return Err(RpcError::ConnectionClosed.into()),
                };
                let Some(event) = DownloadEvent::from_notification(&notification) else {
                    continue;
                };
                if event.gid != *gid {
                    continue;
                }
                let state = match event.kind {
                    EventKind::Complete => return Ok(()),
                    EventKind::Error => DownloadState::Error,
                    EventKind::Stop => DownloadState::Removed,
                    EventKind::Start | EventKind::Pause | EventKind::BtComplete => {
                        tracing::debug!(%gid, kind = ?event.kind, "download event");
                        continue;
                    }
                };
                return Err(WaitError::Ended {
                    gid: gid.clone(),
                    state,
                });
            }
        }
    }
}
