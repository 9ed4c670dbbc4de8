//! Packet Queue Abstraction
//!
//! The driver only sees this trait: receive a queued packet, hand back a
//! verdict. `NetlinkQueue` implements it on Linux; tests use an in-memory
//! queue.

use crate::config::{ConfigError, QueueConfig};
use crate::netlink::NetlinkError;
use hostblock_filter::Verdict;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// One packet diverted to userspace by the kernel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueuedPacket {
    /// Kernel id the verdict must echo
    pub id: u32,
    /// Link-layer protocol (ETH_P_*)
    pub hw_protocol: u16,
    /// Netfilter hook the packet was queued from
    pub hook: u8,
    pub mark: u32,
    pub indev: u32,
    pub outdev: u32,
    pub physindev: u32,
    pub physoutdev: u32,
    /// Source link-layer address; empty when the kernel sent none
    pub hw_addr: Vec<u8>,
    /// Packet bytes starting at the IP header, up to the copy range
    pub payload: Vec<u8>,
}

/// Stage of queue setup that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    OpenSocket,
    BindSocket,
    SetRecvBuffer,
    UnbindFamily,
    BindFamily,
    BindQueue,
    SetCopyMode,
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Self::OpenSocket => "opening netlink socket",
            Self::BindSocket => "binding netlink socket",
            Self::SetRecvBuffer => "setting receive buffer size",
            Self::UnbindFamily => "unbinding existing nf_queue handler for AF_INET",
            Self::BindFamily => "binding nf_queue handler for AF_INET",
            Self::BindQueue => "binding queue",
            Self::SetCopyMode => "setting copy_packet mode",
        };
        f.write_str(step)
    }
}

/// Queue errors
#[derive(Debug, Error)]
pub enum QueueError {
    /// Kernel dropped packets because the socket buffer was full
    #[error("receive buffer overrun")]
    Overrun,

    #[error("invalid queue configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("error during {step}: {source}")]
    Setup {
        step: SetupStep,
        #[source]
        source: io::Error,
    },

    #[error("queue I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed netlink message: {0}")]
    Netlink(#[from] NetlinkError),

    /// Datagram was larger than the receive buffer and got cut short
    #[error("netlink datagram of {len} bytes truncated to {capacity}")]
    DatagramTruncated { len: usize, capacity: usize },

    #[error("NFQUEUE is only available on Linux")]
    Unsupported,
}

impl QueueError {
    /// Whether the receive loop may continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Overrun | Self::Netlink(_) | Self::DatagramTruncated { .. }
        )
    }
}

/// A source of queued packets that accepts verdicts
pub trait PacketQueue {
    /// Block until the next packet is available
    fn recv(&mut self) -> Result<QueuedPacket, QueueError>;

    /// Issue exactly one verdict for a received packet id
    fn set_verdict(&mut self, id: u32, verdict: Verdict) -> Result<(), QueueError>;

    fn stats(&self) -> &QueueStats;
}

impl<Q: PacketQueue + ?Sized> PacketQueue for Box<Q> {
    fn recv(&mut self) -> Result<QueuedPacket, QueueError> {
        (**self).recv()
    }

    fn set_verdict(&mut self, id: u32, verdict: Verdict) -> Result<(), QueueError> {
        (**self).set_verdict(id, verdict)
    }

    fn stats(&self) -> &QueueStats {
        (**self).stats()
    }
}

/// Queue counters
#[derive(Debug, Default)]
pub struct QueueStats {
    pub received: AtomicU64,
    pub forwarded: AtomicU64,
    pub discarded: AtomicU64,
    pub overruns: AtomicU64,
    pub malformed: AtomicU64,
}

impl QueueStats {
    pub fn record_verdict(&self, verdict: Verdict) {
        match verdict {
            Verdict::Forward => self.forwarded.fetch_add(1, Ordering::Relaxed),
            Verdict::Discard => self.discarded.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`QueueStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub received: u64,
    pub forwarded: u64,
    pub discarded: u64,
    pub overruns: u64,
    pub malformed: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} received, {} forwarded, {} discarded, {} overruns, {} malformed",
            self.received, self.forwarded, self.discarded, self.overruns, self.malformed
        )
    }
}

/// Open the platform queue for `config`
#[cfg(target_os = "linux")]
pub fn open_queue(config: &QueueConfig) -> Result<Box<dyn PacketQueue>, QueueError> {
    let queue = crate::linux::NetlinkQueue::open(config)?;
    Ok(Box::new(queue))
}

/// Open the platform queue for `config`
#[cfg(not(target_os = "linux"))]
pub fn open_queue(_config: &QueueConfig) -> Result<Box<dyn PacketQueue>, QueueError> {
    Err(QueueError::Unsupported)
}
