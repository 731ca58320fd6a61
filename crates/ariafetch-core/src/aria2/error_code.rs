//! aria2 exit status codes, as reported in `errorCode`.

use std::fmt;

/// Numeric error code of a finished download with a readable description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(u32);

impl ErrorCode {
    pub fn code(self) -> u32 {
        self.0
    }

    /// Description from the aria2 manual; `None` for codes it does not list.
    pub fn description(self) -> Option<&'static str> {
        let text = match self.0 {
            0 => "success",
            1 => "unknown error",
            2 => "timeout",
            3 => "resource not found",
            4 => "too many resource-not-found errors",
            5 => "download speed too slow",
            6 => "network problem",
            7 => "unfinished download at shutdown",
            8 => "remote server does not support resume",
            9 => "not enough disk space",
            10 => "piece length differs from control file",
            11 => "same file already being downloaded",
            12 => "same torrent info hash already being downloaded",
            13 => "file already exists",
            14 => "renaming file failed",
            15 => "could not open existing file",
            16 => "could not create or truncate file",
            17 => "file I/O error",
            18 => "could not create directory",
            19 => "name resolution failed",
            20 => "could not parse Metalink document",
            21 => "FTP command failed",
            22 => "bad or unexpected HTTP response header",
            23 => "too many redirects",
            24 => "HTTP authorization failed",
            25 => "could not parse bencoded file",
            26 => "torrent file corrupted or incomplete",
            27 => "bad magnet URI",
            28 => "bad or unrecognized option",
            29 => "remote server overloaded or in maintenance",
            30 => "could not parse JSON-RPC request",
            32 => "checksum validation failed",
            _ => return None,
        };
        Some(text)
    }
}

impl From<u32> for ErrorCode {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

/// Formats as the bare number so log lines stay greppable (`errorCode=9`).
impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
