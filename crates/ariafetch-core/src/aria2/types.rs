//! Values exchanged with the aria2 daemon.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::ErrorCode;

/// Opaque job handle assigned by the daemon at enqueue time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gid(String);

impl Gid {
    pub fn new(gid: impl Into<String>) -> Self {
        Self(gid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of `aria2.getVersion`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub enabled_features: Vec<String>,
}

/// Lifecycle state of a download as reported by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadState {
    Active,
    Waiting,
    Paused,
    Error,
    Complete,
    Removed,
}

impl DownloadState {
    pub fn as_str(self) -> &'static str {
        match self {
            DownloadState::Active => "active",
            DownloadState::Waiting => "waiting",
            DownloadState::Paused => "paused",
            DownloadState::Error => "error",
            DownloadState::Complete => "complete",
            DownloadState::Removed => "removed",
        }
    }

    /// True once the daemon will no longer work on the download.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            DownloadState::Error | DownloadState::Complete | DownloadState::Removed
        )
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field names accepted by `aria2.tellStatus` to restrict the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKey {
    Status,
    TotalLength,
    CompletedLength,
    VerifiedLength,
    ErrorCode,
    ErrorMessage,
}

impl StatusKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKey::Status => "status",
            StatusKey::TotalLength => "totalLength",
            StatusKey::CompletedLength => "completedLength",
            StatusKey::VerifiedLength => "verifiedLength",
            StatusKey::ErrorCode => "errorCode",
            StatusKey::ErrorMessage => "errorMessage",
        }
    }
}

/// Point-in-time view of one download. Keys the daemon did not return are
/// zero (lengths) or `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    #[serde(default)]
    pub gid: Option<Gid>,
    #[serde(default)]
    pub status: Option<DownloadState>,
    #[serde(default, deserialize_with = "decimal_string")]
    pub total_length: u64,
    #[serde(default, deserialize_with = "decimal_string")]
    pub completed_length: u64,
    /// Non-zero only while the daemon is checking the file's integrity.
    #[serde(default, deserialize_with = "decimal_string")]
    pub verified_length: u64,
    #[serde(default, deserialize_with = "optional_error_code")]
    pub error_code: Option<ErrorCode>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// The daemon encodes integers as decimal strings; plain numbers are accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum Decimal {
    Text(String),
    Number(u64),
}

impl Decimal {
    fn value<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            Decimal::Number(n) => Ok(n),
            Decimal::Text(s) if s.is_empty() => Ok(0),
            Decimal::Text(s) => s
                .parse()
                .map_err(|_| E::custom(format!("invalid decimal {s:?}"))),
        }
    }
}

fn decimal_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Decimal::deserialize(deserializer)?.value()
}

fn optional_error_code<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<ErrorCode>, D::Error> {
    match Option::<Decimal>::deserialize(deserializer)? {
        None => Ok(None),
        Some(d) => {
            let code = u32::try_from(d.value::<D::Error>()?)
                .map_err(|_| serde::de::Error::custom("error code out of range"))?;
            Ok(Some(ErrorCode::from(code)))
        }
    }
}
