//! Enqueue request: source URIs plus the per-download options the daemon recognizes.

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::checksum::Checksum;

/// Options for `aria2.addUri`. Absent options are left to the daemon's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Verify the finished file against this digest.
    pub checksum: Option<Checksum>,
    /// Resume a partially downloaded file with the same name.
    pub continue_download: bool,
    /// Absolute destination directory.
    pub dir: Option<PathBuf>,
    /// Destination filename.
    pub out: Option<String>,
}

impl DownloadOptions {
    /// Encodes the options the way the daemon expects: every value is a string.
    pub fn to_rpc_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(checksum) = &self.checksum {
            map.insert("checksum".into(), Value::String(checksum.to_string()));
        }
        map.insert(
            "continue".into(),
            Value::String(self.continue_download.to_string()),
        );
        if let Some(dir) = &self.dir {
            map.insert(
                "dir".into(),
                Value::String(dir.to_string_lossy().into_owned()),
            );
        }
        if let Some(out) = &self.out {
            map.insert("out".into(), Value::String(out.clone()));
        }
        Value::Object(map)
    }
}

/// One download to enqueue. `uris` must be non-empty; the first one is the
/// primary source and the only one the fetch flow submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub uris: Vec<String>,
    pub options: DownloadOptions,
}

impl DownloadRequest {
    pub fn primary_uri(&self) -> Option<&str> {
        self.uris.first().map(String::as_str)
    }

    /// Name used to prefix progress lines: the output filename, else the primary URI.
    pub fn label(&self) -> String {
        self.options
            .out
            .clone()
            .or_else(|| self.primary_uri().map(str::to_string))
            .unwrap_or_default()
    }
}
