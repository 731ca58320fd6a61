//! aria2 daemon API: method wrappers and the values they exchange.

mod client;
mod error_code;
mod event;
mod options;
mod types;

pub use client::Aria2Client;
pub use error_code::ErrorCode;
pub use event::{DownloadEvent, EventKind};
pub use options::{DownloadOptions, DownloadRequest};
pub use types::{DownloadState, Gid, StatusKey, StatusSnapshot, VersionInfo};
