//! Integrity-check option for the daemon: `"<algorithm>=<hex digest>"`.
//!
//! The daemon verifies the file after the transfer; this module only makes
//! sure the option is well formed before it is sent.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Hash algorithms the daemon accepts for `checksum`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Md5,
    Adler32,
}

impl ChecksumAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha1 => "sha-1",
            ChecksumAlgorithm::Sha224 => "sha-224",
            ChecksumAlgorithm::Sha256 => "sha-256",
            ChecksumAlgorithm::Sha384 => "sha-384",
            ChecksumAlgorithm::Sha512 => "sha-512",
            ChecksumAlgorithm::Md5 => "md5",
            ChecksumAlgorithm::Adler32 => "adler32",
        }
    }

    /// Digest length in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            ChecksumAlgorithm::Sha1 => 20,
            ChecksumAlgorithm::Sha224 => 28,
            ChecksumAlgorithm::Sha256 => 32,
            ChecksumAlgorithm::Sha384 => 48,
            ChecksumAlgorithm::Sha512 => 64,
            ChecksumAlgorithm::Md5 => 16,
            ChecksumAlgorithm::Adler32 => 4,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        let algo = match s.to_ascii_lowercase().as_str() {
            "sha-1" => ChecksumAlgorithm::Sha1,
            "sha-224" => ChecksumAlgorithm::Sha224,
            "sha-256" => ChecksumAlgorithm::Sha256,
            "sha-384" => ChecksumAlgorithm::Sha384,
            "sha-512" => ChecksumAlgorithm::Sha512,
            "md5" => ChecksumAlgorithm::Md5,
            "adler32" => ChecksumAlgorithm::Adler32,
            _ => return None,
        };
        Some(algo)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChecksumError {
    #[error("checksum must look like <algorithm>=<hex digest>, got {0:?}")]
    Format(String),
    #[error("unsupported checksum algorithm {0:?}")]
    Algorithm(String),
    #[error("checksum digest is not valid hex: {0}")]
    Hex(String),
    #[error("{algorithm} digest must be {expected} bytes, got {actual}")]
    Length {
        algorithm: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// A validated checksum option. The digest is kept as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checksum {
    algorithm: ChecksumAlgorithm,
    digest: String,
}

impl Checksum {
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }
}

impl FromStr for Checksum {
    type Err = ChecksumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (algo, digest) = s
            .trim()
            .split_once('=')
            .ok_or_else(|| ChecksumError::Format(s.to_string()))?;
        let algorithm = ChecksumAlgorithm::parse(algo.trim())
            .ok_or_else(|| ChecksumError::Algorithm(algo.to_string()))?;
        let digest = digest.trim().to_ascii_lowercase();
        let bytes = hex::decode(&digest).map_err(|e| ChecksumError::Hex(e.to_string()))?;
        if bytes.len() != algorithm.digest_len() {
            return Err(ChecksumError::Length {
                algorithm: algorithm.as_str(),
                expected: algorithm.digest_len(),
                actual: bytes.len(),
            });
        }
        Ok(Self { algorithm, digest })
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.algorithm.as_str(), self.digest)
    }
}
