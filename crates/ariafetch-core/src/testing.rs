//! Scripted in-memory daemon for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::aria2::{DownloadRequest, Gid, StatusKey, StatusSnapshot, VersionInfo};
use crate::daemon::{Daemon, WaitError};
use crate::rpc::RpcError;

pub(crate) fn progress(total: u64, completed: u64, verified: u64) -> StatusSnapshot {
    StatusSnapshot {
        total_length: total,
        completed_length: completed,
        verified_length: verified,
        ..Default::default()
    }
}

/// Answers `tell_status` from a queue (in call order) and `wait_for_download`
/// with a one-time scripted result; waits forever when none is scripted.
#[derive(Default)]
pub(crate) struct ScriptedDaemon {
    statuses: Mutex<VecDeque<Result<StatusSnapshot, RpcError>>>,
    status_calls: Mutex<Vec<Vec<StatusKey>>>,
    wait_result: Mutex<Option<Result<(), WaitError>>>,
    added: Mutex<Vec<DownloadRequest>>,
}

impl ScriptedDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_status(&self, status: Result<StatusSnapshot, RpcError>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    pub fn set_wait_result(&self, result: Result<(), WaitError>) {
        *self.wait_result.lock().unwrap() = Some(result);
    }

    pub fn status_calls(&self) -> Vec<Vec<StatusKey>> {
        self.status_calls.lock().unwrap().clone()
    }

    pub fn added(&self) -> Vec<DownloadRequest> {
        self.added.lock().unwrap().clone()
    }
}

#[async_trait]
impl Daemon for ScriptedDaemon {
    async fn get_version(&self) -> Result<VersionInfo, RpcError> {
        Ok(VersionInfo {
            version: "1.36.0".to_string(),
            enabled_features: vec!["Async DNS".to_string(), "HTTPS".to_string()],
        })
    }

    async fn add_uri(&self, request: &DownloadRequest) -> Result<Gid, RpcError> {
        self.added.lock().unwrap().push(request.clone());
        Ok(Gid::new("2089b05ecca3d829"))
    }

    async fn tell_status(
        &self,
        _gid: &Gid,
        keys: &[StatusKey],
    ) -> Result<StatusSnapshot, RpcError> {
        self.status_calls.lock().unwrap().push(keys.to_vec());
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RpcError::Protocol("no scripted status left".to_string())))
    }

    async fn wait_for_download(&self, _gid: &Gid) -> Result<(), WaitError> {
        let scripted = self.wait_result.lock().unwrap().take();
        match scripted {
            Some(result) => result,
            None => std::future::pending().await,
        }
    }
}
