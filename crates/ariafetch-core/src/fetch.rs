//! The fetch flow: connect, queue one download, follow it to the end.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::aria2::{Aria2Client, DownloadRequest, Gid, VersionInfo};
use crate::config::{FetchConfig, RpcConfig};
use crate::daemon::Daemon;
use crate::reporter::{Outcome, Reporter};
use crate::waiter;

/// How to start a daemon that accepts our connection.
const DAEMON_HINT: &str =
    "you can start it with aria2c --enable-rpc --max-connection-per-server=4 --log=aria2.log";

/// Opens the session and performs the version handshake.
pub async fn connect(rpc: &RpcConfig) -> Result<(Aria2Client, VersionInfo)> {
    tracing::info!("connecting to aria2 at {}...", rpc.url);
    let client = Aria2Client::connect(&rpc.url, rpc.secret.as_deref())
        .await
        .with_context(|| format!("failed to connect to the aria2 rpc server ({DAEMON_HINT})"))?;
    let version = handshake(&client).await?;
    Ok((client, version))
}

pub async fn handshake(daemon: &dyn Daemon) -> Result<VersionInfo> {
    let version = daemon
        .get_version()
        .await
        .context("failed to get aria2 version")?;
    tracing::info!(
        "connected to aria2 {} ({})",
        version.version,
        version.enabled_features.join(", ")
    );
    Ok(version)
}

/// Queues the download and returns its handle. Only the primary URI is
/// submitted; any further URIs are ignored.
pub async fn enqueue(daemon: &dyn Daemon, request: &DownloadRequest) -> Result<Gid> {
    let Some(primary) = request.primary_uri() else {
        bail!("cannot queue a download without a source URI");
    };
    if request.uris.len() > 1 {
        tracing::debug!(
            "ignoring {} extra source URI(s), using {}",
            request.uris.len() - 1,
            primary
        );
    }
    let submitted = DownloadRequest {
        uris: vec![primary.to_string()],
        options: request.options.clone(),
    };
    let label = request.label();
    let gid = daemon
        .add_uri(&submitted)
        .await
        .with_context(|| format!("failed to queue download of {label}"))?;
    tracing::info!("{} download queued as {}", label, gid);
    Ok(gid)
}

/// Runs the waiter in the background and the reporter in the foreground.
pub async fn follow(
    daemon: Arc<dyn Daemon>,
    gid: Gid,
    label: &str,
    interval: Duration,
) -> Result<Outcome> {
    let completion = waiter::spawn_waiter(Arc::clone(&daemon), gid.clone());
    Reporter::new(daemon.as_ref(), &gid, label, interval)
        .run(completion)
        .await
}

/// The whole flow for one configuration. `cwd` is the destination directory
/// when the configuration names none.
pub async fn run(cfg: &FetchConfig, cwd: &Path) -> Result<Outcome> {
    let request = cfg.resolve_request(cwd)?;
    let (client, _version) = connect(&cfg.rpc).await?;
    let daemon: Arc<dyn Daemon> = Arc::new(client);
    let gid = enqueue(daemon.as_ref(), &request).await?;
    follow(daemon, gid, &request.label(), cfg.poll_interval()).await
}
