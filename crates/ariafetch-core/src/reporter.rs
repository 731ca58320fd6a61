//! Foreground progress loop.
//!
//! Polls the daemon once per interval and logs a progress line until the
//! waiter reports the outcome, then logs the final line and returns.

use std::time::Duration;

use anyhow::{anyhow, Result};
use indicatif::DecimalBytes;
use tokio::sync::oneshot;

use crate::aria2::{Gid, StatusKey};
use crate::daemon::Daemon;
use crate::progress::ProgressReport;
use crate::waiter::Completion;

const PROGRESS_KEYS: [StatusKey; 3] = [
    StatusKey::TotalLength,
    StatusKey::CompletedLength,
    StatusKey::VerifiedLength,
];

/// What the reporter saw of a completed download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Final size, `None` if the last status query failed.
    pub total_length: Option<u64>,
    /// Last progress line logged before completion.
    pub last_progress: Option<ProgressReport>,
    /// Status queries that failed while polling.
    pub failed_polls: u32,
}

pub struct Reporter<'a> {
    daemon: &'a dyn Daemon,
    gid: &'a Gid,
    label: &'a str,
    interval: Duration,
}

impl<'a> Reporter<'a> {
    pub fn new(daemon: &'a dyn Daemon, gid: &'a Gid, label: &'a str, interval: Duration) -> Self {
        Self {
            daemon,
            gid,
            label,
            interval,
        }
    }

    /// Runs until `completion` yields. A failed download is returned as an
    /// error carrying the waiter's diagnostic.
    pub async fn run(&self, mut completion: oneshot::Receiver<Completion>) -> Result<Outcome> {
        let mut outcome = Outcome::default();
        loop {
            tokio::select! {
                received = &mut completion => {
                    return match received {
                        Ok(Ok(())) => {
                            outcome.total_length = self.final_size().await;
                            Ok(outcome)
                        }
                        Ok(Err(failure)) => Err(anyhow!(failure)
                            .context(format!("{} download finished with error", self.label))),
                        Err(_) => Err(anyhow!(
                            "{} download waiter stopped without reporting an outcome",
                            self.label
                        )),
                    };
                }
                () = tokio::time::sleep(self.interval) => {
                    match self.daemon.tell_status(self.gid, &PROGRESS_KEYS).await {
                        Ok(status) => {
                            let report = ProgressReport::from_snapshot(&status);
                            tracing::info!("{} {}", self.label, report);
                            outcome.last_progress = Some(report);
                        }
                        Err(e) => {
                            outcome.failed_polls += 1;
                            tracing::warn!("{} failed to get download status: {}", self.label, e);
                        }
                    }
                }
            }
        }
    }

    async fn final_size(&self) -> Option<u64> {
        match self
            .daemon
            .tell_status(self.gid, &[StatusKey::TotalLength])
            .await
        {
            Ok(status) => {
                tracing::info!(
                    "{} download finished ({})",
                    self.label,
                    DecimalBytes(status.total_length)
                );
                Some(status.total_length)
            }
            Err(e) => {
                tracing::warn!(
                    "{} download finished, but failed to get download status: {}",
                    self.label,
                    e
                );
                None
            }
        }
    }
}
