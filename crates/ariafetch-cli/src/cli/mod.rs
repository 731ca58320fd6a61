//! CLI for ariafetch.

use anyhow::Result;
use ariafetch_core::config::{self, FetchConfig};
use ariafetch_core::{fetch, logging};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Queue one download on an aria2 daemon and follow it to completion.
///
/// Every option is optional: without arguments the built-in (or configured)
/// download is queued on the daemon at ws://localhost:6800/jsonrpc.
#[derive(Debug, Parser)]
#[command(name = "ariafetch")]
#[command(about = "ariafetch: queue a download on aria2 and report its progress", long_about = None)]
pub struct Cli {
    /// Source URIs; only the first is downloaded. Replaces the configured download.
    #[arg(value_name = "URI")]
    pub uris: Vec<String>,

    /// Config file (default: ~/.config/ariafetch/config.toml if it exists).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// aria2 WebSocket JSON-RPC endpoint.
    #[arg(long, value_name = "URL")]
    pub rpc_url: Option<String>,

    /// aria2 RPC secret (aria2c --rpc-secret).
    #[arg(long, value_name = "TOKEN")]
    pub rpc_secret: Option<String>,

    /// Destination directory (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Output filename (default: last path segment of the first URI).
    #[arg(long, value_name = "NAME")]
    pub out: Option<String>,

    /// Verify the finished file, e.g. sha-256=<hex>.
    #[arg(long, value_name = "ALGO=HEX")]
    pub checksum: Option<String>,

    /// Do not resume a partially downloaded file.
    #[arg(long)]
    pub no_continue: bool,

    /// Interval between progress lines, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Append log lines to PATH (default ~/.local/state/ariafetch/ariafetch.log) instead of stderr.
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub log_file: Option<Option<PathBuf>>,
}

impl Cli {
    /// Overrides `cfg` with the flags given on the command line. Relative
    /// directories are resolved against `cwd`.
    pub fn apply(self, cfg: &mut FetchConfig, cwd: &Path) -> Result<()> {
        if !self.uris.is_empty() {
            // The configured checksum and filename describe another file.
            cfg.download.uris = self.uris;
            cfg.download.checksum = None;
            cfg.download.out = None;
        }
        if let Some(url) = self.rpc_url {
            cfg.rpc.url = url;
        }
        if let Some(secret) = self.rpc_secret {
            cfg.rpc.secret = Some(secret);
        }
        if let Some(dir) = self.dir {
            cfg.download.dir = Some(cwd.join(dir));
        }
        if let Some(out) = self.out {
            cfg.download.out = Some(out);
        }
        if let Some(checksum) = self.checksum {
            cfg.download.checksum = Some(checksum);
        }
        if self.no_continue {
            cfg.download.continue_download = false;
        }
        if let Some(ms) = self.poll_interval_ms {
            cfg.poll_interval_ms = ms;
        }
        match self.log_file {
            Some(Some(path)) => cfg.log_file = Some(cwd.join(path)),
            Some(None) => cfg.log_file = Some(logging::default_log_path()?),
            None => {}
        }
        Ok(())
    }

    /// Loads the config file and merges the command line into it. Also
    /// returns the working directory the merge resolved paths against.
    fn resolve_config(self) -> Result<(FetchConfig, PathBuf)> {
        let cwd = std::env::current_dir()?;
        let mut cfg = config::load(self.config.as_deref())?;
        self.apply(&mut cfg, &cwd)?;
        Ok((cfg, cwd))
    }

    /// Runs one fetch. A log subscriber is installed before this returns, so
    /// the caller can report an error through `tracing`.
    pub async fn run(self) -> Result<()> {
        let (cfg, cwd) = match self.resolve_config() {
            Ok(resolved) => resolved,
            Err(err) => {
                logging::init_logging_stderr();
                return Err(err);
            }
        };

        // Logging depends on the config (log file), so it starts here.
        let logs_to_file = match logging::init_logging(cfg.log_file.as_deref()) {
            Ok(()) => cfg.log_file.is_some(),
            Err(err) => {
                logging::init_logging_stderr();
                tracing::warn!("file logging unavailable, using stderr: {:#}", err);
                false
            }
        };
        tracing::debug!("effective config: {:?}", cfg);

        let result = fetch::run(&cfg, &cwd).await.map(drop);
        if let Err(err) = &result {
            if logs_to_file {
                // The log file is not on the terminal.
                eprintln!("ariafetch error: {:#}", err);
            }
        }
        result
    }
}
