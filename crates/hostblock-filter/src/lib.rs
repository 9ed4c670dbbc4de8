//! hostblock Filter Core
//!
//! Classifies IPv4/TCP packets diverted from the kernel by the HTTP
//! `Host` header they carry.
//!
//! Pipeline:
//! 1. Raw buffer → `PacketView` (bounds-checked IPv4 + TCP headers)
//! 2. Payload → `extract_host` (bounded `Host: ` scan)
//! 3. Host token → `HostnameSet` exact-match lookup
//! 4. → `Verdict::Forward` or `Verdict::Discard`
//!
//! Anything that cannot be decoded is forwarded: this filter blocks
//! hostnames, it is not a general-purpose firewall.

mod hostname_set;
mod http;
mod packet;
mod verdict;

pub use hostname_set::{ConfigError, HostnameSet};
pub use http::{HOST_MARKER, extract_host};
pub use packet::{DecodeError, IPPROTO_TCP, IPV4_MIN_HEADER_LEN, PacketView, TCP_MIN_HEADER_LEN};
pub use verdict::{Decision, Verdict, VerdictEngine, classify, decide};
