//! HTTP Host Extraction
//!
//! Finds the `Host: ` header line in a TCP payload and returns the
//! hostname token that follows it.
//!
//! Matching rules:
//! - marker is the literal `Host: ` (field name is case-sensitive here)
//! - first occurrence wins
//! - token ends at the first `\r` inside the payload
//! - no `\r` before the end of the payload → not found
//!
//! Both searches are bounded by the payload slice; NUL bytes are data,
//! not terminators.

use memchr::memchr;
use memchr::memmem;

/// Header marker preceding the hostname token
pub const HOST_MARKER: &[u8] = b"Host: ";

/// Extract the `Host` token from an HTTP request payload
///
/// Returns `None` when the marker is absent or the token is not
/// terminated by `\r` within `payload`. The returned slice borrows from
/// `payload` and may be empty (`Host: \r`).
pub fn extract_host(payload: &[u8]) -> Option<&[u8]> {
    let start = memmem::find(payload, HOST_MARKER)? + HOST_MARKER.len();
    let rest = &payload[start..];
    let end = memchr(b'\r', rest)?;
    Some(&rest[..end])
}
