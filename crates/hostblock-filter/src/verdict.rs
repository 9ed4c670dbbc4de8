//! Verdict Engine
//!
//! Composes `PacketView`, `extract_host` and `HostnameSet` into one
//! forward/discard decision per packet.
//!
//! Flow:
//! 1. Decode headers → on failure, forward (fail-open)
//! 2. Extract `Host` token → none found, forward
//! 3. Token in the hostname set → discard, otherwise forward
//!
//! The engine keeps no per-packet state: the same bytes against the same
//! set always produce the same verdict.

use crate::hostname_set::HostnameSet;
use crate::http::extract_host;
use crate::packet::{DecodeError, PacketView};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What to do with a queued packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Let the packet continue on its path
    Forward,
    /// Drop the packet silently
    Discard,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => write!(f, "forward"),
            Self::Discard => write!(f, "discard"),
        }
    }
}

/// Verdict together with the reason it was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    /// Headers could not be decoded (fail-open)
    Undecodable(DecodeError),
    /// No terminated `Host: ` header in the payload
    NoHost,
    /// Host found but not in the set
    Allowed(&'a [u8]),
    /// Host found in the set
    Blocked(&'a [u8]),
}

impl Decision<'_> {
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Blocked(_) => Verdict::Discard,
            Self::Undecodable(_) | Self::NoHost | Self::Allowed(_) => Verdict::Forward,
        }
    }
}

impl fmt::Display for Decision<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undecodable(e) => write!(f, "undecodable ({e})"),
            Self::NoHost => write!(f, "no Host header"),
            Self::Allowed(host) => write!(f, "allowed host {}", String::from_utf8_lossy(host)),
            Self::Blocked(host) => write!(f, "blocked host {}", String::from_utf8_lossy(host)),
        }
    }
}

/// Classify one buffer against a hostname set
pub fn classify<'a>(buffer: &'a [u8], hostnames: &HostnameSet) -> Decision<'a> {
    let view = match PacketView::decode(buffer) {
        Ok(view) => view,
        Err(e) => return Decision::Undecodable(e),
    };

    match extract_host(view.payload()) {
        None => Decision::NoHost,
        Some(host) if hostnames.contains(host) => Decision::Blocked(host),
        Some(host) => Decision::Allowed(host),
    }
}

/// Forward or discard one buffer
#[inline]
pub fn decide(buffer: &[u8], hostnames: &HostnameSet) -> Verdict {
    classify(buffer, hostnames).verdict()
}

/// Shares one loaded `HostnameSet` across decisions
#[derive(Debug, Clone)]
pub struct VerdictEngine {
    hostnames: Arc<HostnameSet>,
}

impl VerdictEngine {
    pub fn new(hostnames: Arc<HostnameSet>) -> Self {
        Self { hostnames }
    }

    pub fn hostnames(&self) -> &HostnameSet {
        &self.hostnames
    }

    /// Decision with its reason, for logging
    pub fn classify<'a>(&self, buffer: &'a [u8]) -> Decision<'a> {
        classify(buffer, &self.hostnames)
    }

    #[inline]
    pub fn decide(&self, buffer: &[u8]) -> Verdict {
        decide(buffer, &self.hostnames)
    }
}

impl From<HostnameSet> for VerdictEngine {
    fn from(hostnames: HostnameSet) -> Self {
        Self::new(Arc::new(hostnames))
    }
}
