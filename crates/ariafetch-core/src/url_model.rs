//! Source URI checks and output filename derivation.

use anyhow::{bail, Context, Result};
use url::Url;

/// Used when the URI path yields no usable name.
const DEFAULT_FILENAME: &str = "download.bin";

/// Schemes the daemon can fetch a single file from.
const SOURCE_SCHEMES: [&str; 4] = ["http", "https", "ftp", "sftp"];

/// Parses a source URI and checks that its scheme is one the daemon downloads.
pub fn parse_source_uri(uri: &str) -> Result<Url> {
    let url = Url::parse(uri).with_context(|| format!("invalid source URI: {uri}"))?;
    if !SOURCE_SCHEMES.contains(&url.scheme()) {
        bail!(
            "unsupported scheme {:?} in source URI {} (expected one of {})",
            url.scheme(),
            uri,
            SOURCE_SCHEMES.join(", ")
        );
    }
    Ok(url)
}

/// Output filename for a download: the last non-empty path segment of `uri`,
/// made safe for a Linux filesystem, or `download.bin`.
///
/// - `derive_filename("http://mirror/debian-cd/netinst.iso")` → `"netinst.iso"`
/// - `derive_filename("https://example.com/")` → `"download.bin"`
pub fn derive_filename(uri: &str) -> String {
    Url::parse(uri)
        .ok()
        .and_then(|url| {
            url.path_segments()?
                .filter(|s| !s.is_empty())
                .last()
                .map(sanitize)
        })
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

/// Replaces path separators and control characters, trims dots and blanks at
/// both ends, and caps the length at NAME_MAX (255 bytes).
fn sanitize(segment: &str) -> String {
    const NAME_MAX: usize = 255;

    let replaced: String = segment
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());

    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
