//! Queue Configuration
//!
//! Settings for binding one NFQUEUE and sizing its socket buffers.

use crate::netlink::PACKET_MSG_OVERHEAD;
use serde::{Deserialize, Serialize};

/// Largest copy range the kernel accepts (one full IP datagram)
pub const MAX_COPY_RANGE: u32 = 0xffff;

/// NFQUEUE binding configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue number used in the `--queue-num` firewall rule
    #[serde(default)]
    pub queue_num: u16,
    /// Bytes of each packet copied to userspace
    #[serde(default = "default_copy_range")]
    pub copy_range: u32,
    /// Kernel socket receive buffer (SO_RCVBUF)
    #[serde(default = "default_recv_buffer_size")]
    pub recv_buffer_size: usize,
    /// Userspace buffer for one netlink datagram
    #[serde(default = "default_datagram_size")]
    pub datagram_size: usize,
}

fn default_copy_range() -> u32 {
    MAX_COPY_RANGE
}

fn default_recv_buffer_size() -> usize {
    1024 * 1024 // 1 MB
}

fn default_datagram_size() -> usize {
    MAX_COPY_RANGE as usize + PACKET_MSG_OVERHEAD
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_num: 0,
            copy_range: default_copy_range(),
            recv_buffer_size: default_recv_buffer_size(),
            datagram_size: default_datagram_size(),
        }
    }
}

impl QueueConfig {
    /// Configuration for a specific queue number
    pub fn with_queue(queue_num: u16) -> Self {
        Self {
            queue_num,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.copy_range == 0 {
            return Err(ConfigError::ZeroCopyRange);
        }
        if self.copy_range > MAX_COPY_RANGE {
            return Err(ConfigError::CopyRangeTooLarge(self.copy_range));
        }
        if self.recv_buffer_size == 0 {
            return Err(ConfigError::ZeroRecvBuffer);
        }
        let required = self.copy_range as usize + PACKET_MSG_OVERHEAD;
        if self.datagram_size < required {
            return Err(ConfigError::DatagramTooSmall {
                datagram_size: self.datagram_size,
                required,
            });
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("copy range must be at least 1 byte")]
    ZeroCopyRange,

    #[error("copy range {0} exceeds the maximum of 65535 bytes")]
    CopyRangeTooLarge(u32),

    #[error("receive buffer size must be non-zero")]
    ZeroRecvBuffer,

    #[error("datagram buffer of {datagram_size} bytes cannot hold a full copy range, need {required}")]
    DatagramTooSmall {
        datagram_size: usize,
        required: usize,
    },
}
