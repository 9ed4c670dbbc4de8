//! hostblock Queue Adapter
//!
//! Diverts packets from the kernel through NFQUEUE and hands them to the
//! filter core one at a time.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  NFQNL_MSG_PACKET   ┌──────────────┐  &[u8]   ┌───────────────┐
//! │   netfilter  │────────────────────▶│ NetlinkQueue │─────────▶│ VerdictEngine │
//! │  (iptables   │                     │   recv()     │          │   decide()    │
//! │   NFQUEUE)   │◀────────────────────│ set_verdict()│◀─────────│               │
//! └──────────────┘  NFQNL_MSG_VERDICT  └──────────────┘  Verdict └───────────────┘
//! ```
//!
//! The loop is explicit (`driver::run`): receive, decide, submit the
//! verdict, in delivery order. No kernel callback is registered.
//!
//! The queue only sees what a firewall rule sends it, e.g.
//! `iptables -A OUTPUT -p tcp --dport 80 -j NFQUEUE --queue-num 0`.

mod config;
pub mod driver;
pub mod netlink;
mod queue;

#[cfg(target_os = "linux")]
mod linux;

pub use config::{ConfigError, QueueConfig};
pub use queue::{
    PacketQueue, QueueError, QueueStats, QueuedPacket, SetupStep, StatsSnapshot, open_queue,
};

#[cfg(target_os = "linux")]
pub use linux::NetlinkQueue;
