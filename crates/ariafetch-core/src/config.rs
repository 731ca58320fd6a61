use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::aria2::{DownloadOptions, DownloadRequest};
use crate::checksum::Checksum;
use crate::url_model;

/// Default daemon endpoint (aria2c `--enable-rpc` listens here).
pub const DEFAULT_RPC_URL: &str = "ws://localhost:6800/jsonrpc";

/// Built-in download: Debian 11.2.0 amd64 netinst ISO.
pub const DEFAULT_URI: &str =
    "http://mirrors.up.pt/debian-cd/11.2.0/amd64/iso-cd/debian-11.2.0-amd64-netinst.iso";
pub const DEFAULT_CHECKSUM: &str =
    "sha-256=45c9feabba213bdc6d72e7469de71ea5aeff73faea6bfb109ab5bad37c3b43bd";

const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Daemon connection settings (`[rpc]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// WebSocket JSON-RPC endpoint.
    pub url: String,
    /// Value of aria2c `--rpc-secret`, if the daemon requires one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            secret: None,
        }
    }
}

/// The download to queue (`[download]` section). When the section is present
/// only `uris` is required; a missing section means the built-in download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Mirrors of one file; the first is the primary source.
    pub uris: Vec<String>,
    /// `"<algorithm>=<hex digest>"` checked by the daemon after the transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Resume a partial file with the same name.
    #[serde(rename = "continue", default = "default_true")]
    pub continue_download: bool,
    /// Absolute destination directory; current directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Output filename; derived from the primary URI when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            uris: vec![DEFAULT_URI.to_string()],
            checksum: Some(DEFAULT_CHECKSUM.to_string()),
            continue_download: true,
            dir: None,
            out: None,
        }
    }
}

/// Configuration built once at startup: defaults, then the optional
/// `~/.config/ariafetch/config.toml` (or `--config`), then CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Interval between progress polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Append log lines to this file instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub rpc: RpcConfig,
    pub download: DownloadConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            log_file: None,
            rpc: RpcConfig::default(),
            download: DownloadConfig::default(),
        }
    }
}

impl FetchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Checks everything that can be checked without the daemon.
    pub fn validate(&self) -> Result<()> {
        let rpc = url::Url::parse(&self.rpc.url)
            .with_context(|| format!("invalid rpc url: {}", self.rpc.url))?;
        // The WebSocket client is built without TLS support.
        if rpc.scheme() != "ws" {
            bail!("rpc url must use ws://, got {}", self.rpc.url);
        }
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than 0");
        }

        let download = &self.download;
        if download.uris.is_empty() {
            bail!("no source URI configured");
        }
        for uri in &download.uris {
            url_model::parse_source_uri(uri)?;
        }
        if let Some(checksum) = &download.checksum {
            checksum
                .parse::<Checksum>()
                .with_context(|| format!("invalid checksum {checksum:?}"))?;
        }
        if let Some(dir) = &download.dir {
            if !dir.is_absolute() {
                bail!("download dir must be absolute, got {}", dir.display());
            }
        }
        Ok(())
    }

    /// Builds the enqueue request. `cwd` is the destination when no `dir` is set
    /// and must be absolute.
    pub fn resolve_request(&self, cwd: &Path) -> Result<DownloadRequest> {
        self.validate()?;
        let download = &self.download;

        let checksum = download
            .checksum
            .as_deref()
            .map(str::parse::<Checksum>)
            .transpose()?;
        let dir = download.dir.clone().unwrap_or_else(|| cwd.to_path_buf());
        let out = download
            .out
            .clone()
            .unwrap_or_else(|| url_model::derive_filename(&download.uris[0]));

        Ok(DownloadRequest {
            uris: download.uris.clone(),
            options: DownloadOptions {
                checksum,
                continue_download: download.continue_download,
                dir: Some(dir),
                out: Some(out),
            },
        })
    }
}

/// Path of the user config file (may not exist).
pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ariafetch")?;
    Ok(xdg_dirs
        .get_config_home()
        .join("ariafetch")
        .join("config.toml"))
}

/// Reads and parses one config file.
pub fn load_from_path(path: &Path) -> Result<FetchConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

/// Loads configuration. An explicit path must exist; otherwise the user config
/// file is read if present, else built-in defaults are used. Never writes files.
pub fn load(explicit: Option<&Path>) -> Result<FetchConfig> {
    if let Some(path) = explicit {
        return load_from_path(path);
    }
    let path = config_path()?;
    if path.exists() {
        tracing::debug!("loading config from {}", path.display());
        return load_from_path(&path);
    }
    Ok(FetchConfig::default())
}
