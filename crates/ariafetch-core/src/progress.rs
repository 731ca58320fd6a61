//! Progress reporting for one download (phase, bytes, percentage).
//!
//! The daemon does not signal when it switches from transferring to checking
//! the file, so the phase is inferred from `verifiedLength`: it is non-zero
//! only while verifying.

use std::fmt;

use indicatif::DecimalBytes;

use crate::aria2::StatusSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Downloading,
    Verifying,
}

impl Phase {
    pub fn from_verified_length(verified_length: u64) -> Self {
        if verified_length == 0 {
            Phase::Downloading
        } else {
            Phase::Verifying
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Downloading => "downloading",
            Phase::Verifying => "verifying",
        }
    }
}

/// Progress derived from one status snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReport {
    pub phase: Phase,
    /// Completed bytes while downloading, verified bytes while verifying.
    pub done: u64,
    /// 0 when the daemon has not resolved the size yet.
    pub total: u64,
}

impl ProgressReport {
    pub fn from_snapshot(s: &StatusSnapshot) -> Self {
        let phase = Phase::from_verified_length(s.verified_length);
        let done = match phase {
            Phase::Downloading => s.completed_length,
            Phase::Verifying => s.verified_length,
        };
        Self {
            phase,
            done,
            total: s.total_length,
        }
    }

    /// `ceil(100 * done / total)` clamped to 100; `None` while the size is unknown.
    pub fn percent(&self) -> Option<u64> {
        percent_ceil(self.done, self.total)
    }
}

/// Integer ceiling percentage. `None` when `total` is 0.
pub fn percent_ceil(done: u64, total: u64) -> Option<u64> {
    if total == 0 {
        return None;
    }
    let scaled = u128::from(done) * 100;
    let total = u128::from(total);
    let pct = scaled.div_ceil(total).min(100);
    // pct <= 100
    Some(pct as u64)
}

/// `downloading 250.00 kB of 1.00 MB (25 %)`; size-less form when total is 0.
impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent() {
            Some(pct) => write!(
                f,
                "{} {} of {} ({} %)",
                self.phase.as_str(),
                DecimalBytes(self.done),
                DecimalBytes(self.total),
                pct
            ),
            None => write!(
                f,
                "{} {} of unknown size",
                self.phase.as_str(),
                DecimalBytes(self.done)
            ),
        }
    }
}
