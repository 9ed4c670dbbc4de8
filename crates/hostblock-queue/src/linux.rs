//! NFQUEUE over a raw netlink socket
//!
//! Talks `nfnetlink_queue` directly; no libnetfilter_queue is needed.
//! Requires CAP_NET_ADMIN.

use crate::config::QueueConfig;
use crate::netlink::{self, AF_INET, ConfigCommand, Inbound, NETLINK_NETFILTER};
use crate::queue::{PacketQueue, QueueError, QueueStats, QueuedPacket, SetupStep};
use hostblock_filter::Verdict;
use socket2::{Domain, Protocol, Socket, Type};
use std::collections::VecDeque;
use std::io;
use std::os::fd::AsRawFd;
use std::sync::atomic::Ordering;
use tracing::{debug, info, warn};

/// One bound NFQUEUE
pub struct NetlinkQueue {
    socket: Socket,
    queue_num: u16,
    seq: u32,
    buf: Vec<u8>,
    /// Packets already read from a datagram but not yet handed out
    pending: VecDeque<QueuedPacket>,
    stats: QueueStats,
}

impl NetlinkQueue {
    /// Open the socket and bind it to `config.queue_num` in copy-packet mode
    pub fn open(config: &QueueConfig) -> Result<Self, QueueError> {
        config.validate()?;

        info!("Opening netlink socket");
        let socket = Socket::new(
            Domain::from(libc::AF_NETLINK),
            Type::RAW,
            Some(Protocol::from(NETLINK_NETFILTER)),
        )
        .map_err(|source| QueueError::Setup {
            step: SetupStep::OpenSocket,
            source,
        })?;

        bind_netlink(&socket).map_err(|source| QueueError::Setup {
            step: SetupStep::BindSocket,
            source,
        })?;

        socket
            .set_recv_buffer_size(config.recv_buffer_size)
            .map_err(|source| QueueError::Setup {
                step: SetupStep::SetRecvBuffer,
                source,
            })?;

        let mut queue = Self {
            socket,
            queue_num: config.queue_num,
            seq: 0,
            buf: vec![0u8; config.datagram_size],
            pending: VecDeque::new(),
            stats: QueueStats::default(),
        };

        info!("Unbinding existing nf_queue handler for AF_INET (if any)");
        let seq = queue.next_seq();
        queue.request(
            SetupStep::UnbindFamily,
            seq,
            netlink::config_command(seq, 0, ConfigCommand::PfUnbind, AF_INET),
        )?;

        info!("Binding nfnetlink_queue as nf_queue handler for AF_INET");
        let seq = queue.next_seq();
        queue.request(
            SetupStep::BindFamily,
            seq,
            netlink::config_command(seq, 0, ConfigCommand::PfBind, AF_INET),
        )?;

        info!("Binding this socket to queue {}", config.queue_num);
        let seq = queue.next_seq();
        queue.request(
            SetupStep::BindQueue,
            seq,
            netlink::config_command(seq, config.queue_num, ConfigCommand::Bind, 0),
        )?;

        info!("Setting copy_packet mode ({} bytes)", config.copy_range);
        let seq = queue.next_seq();
        queue.request(
            SetupStep::SetCopyMode,
            seq,
            netlink::config_params(seq, config.queue_num, config.copy_range),
        )?;

        Ok(queue)
    }

    fn next_seq(&mut self) -> u32 {
        self.seq = self.seq.wrapping_add(1);
        self.seq
    }

    /// Send a config message and wait for the kernel's ack
    fn request(&mut self, step: SetupStep, seq: u32, message: Vec<u8>) -> Result<(), QueueError> {
        let setup = |source: io::Error| QueueError::Setup { step, source };
        let invalid = |e: netlink::NetlinkError| setup(io::Error::new(io::ErrorKind::InvalidData, e));

        self.send(&message).map_err(setup)?;

        loop {
            let len = self.recv_datagram().map_err(setup)?.min(self.buf.len());
            for message in netlink::messages(&self.buf[..len]) {
                match netlink::decode(&message.map_err(invalid)?).map_err(invalid)? {
                    Inbound::Ack { seq: acked } if acked == seq => return Ok(()),
                    Inbound::Error { seq: failed, errno } if failed == seq => {
                        return Err(setup(io::Error::from_raw_os_error(errno)));
                    }
                    Inbound::Packet(packet) => self.pending.push_back(packet),
                    other => debug!("Ignoring {:?} while waiting for ack {}", other, seq),
                }
            }
        }
    }

    fn send(&self, message: &[u8]) -> io::Result<()> {
        // Destination pid 0 is the kernel
        // SAFETY: sockaddr_nl is plain data; all-zero is a valid value.
        let mut kernel: libc::sockaddr_nl = unsafe { std::mem::zeroed() };
        kernel.nl_family = libc::AF_NETLINK as libc::sa_family_t;

        loop {
            // SAFETY: pointers and lengths describe live, correctly sized buffers.
            let rc = unsafe {
                libc::sendto(
                    self.socket.as_raw_fd(),
                    message.as_ptr() as *const libc::c_void,
                    message.len(),
                    0,
                    &kernel as *const libc::sockaddr_nl as *const libc::sockaddr,
                    std::mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
                )
            };
            if rc >= 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    /// Read one datagram into `self.buf`, retrying on EINTR
    ///
    /// Returns the datagram's real length, which exceeds `self.buf.len()`
    /// when it did not fit.
    fn recv_datagram(&mut self) -> io::Result<usize> {
        loop {
            // SAFETY: buf is a live allocation of buf.len() bytes.
            let rc = unsafe {
                libc::recv(
                    self.socket.as_raw_fd(),
                    self.buf.as_mut_ptr() as *mut libc::c_void,
                    self.buf.len(),
                    libc::MSG_TRUNC,
                )
            };
            if rc >= 0 {
                return Ok(rc as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }
}

impl PacketQueue for NetlinkQueue {
    fn recv(&mut self) -> Result<QueuedPacket, QueueError> {
        loop {
            if let Some(packet) = self.pending.pop_front() {
                self.stats.received.fetch_add(1, Ordering::Relaxed);
                return Ok(packet);
            }

            let len = match self.recv_datagram() {
                Ok(len) => len,
                Err(e) if e.raw_os_error() == Some(libc::ENOBUFS) => {
                    self.stats.overruns.fetch_add(1, Ordering::Relaxed);
                    return Err(QueueError::Overrun);
                }
                Err(e) => return Err(QueueError::Io(e)),
            };

            absorb_datagram(&self.buf, len, &mut self.pending, &self.stats)?;
        }
    }

    fn set_verdict(&mut self, id: u32, verdict: Verdict) -> Result<(), QueueError> {
        let seq = self.next_seq();
        self.send(&netlink::verdict(seq, self.queue_num, id, verdict))?;
        self.stats.record_verdict(verdict);
        Ok(())
    }

    fn stats(&self) -> &QueueStats {
        &self.stats
    }
}

impl Drop for NetlinkQueue {
    fn drop(&mut self) {
        info!("Unbinding from queue {}", self.queue_num);
        let seq = self.next_seq();
        let message = netlink::config_command(seq, self.queue_num, ConfigCommand::Unbind, 0);
        if let Err(e) = self.send(&message) {
            warn!("Failed to unbind queue {}: {}", self.queue_num, e);
        }
    }
}

/// Queue every packet carried by the first `len` bytes of `buf`
///
/// Packets decoded before a malformed message or a truncation point are
/// kept so they still get a verdict; the datagram is then reported as an
/// error.
fn absorb_datagram(
    buf: &[u8],
    len: usize,
    pending: &mut VecDeque<QueuedPacket>,
    stats: &QueueStats,
) -> Result<(), QueueError> {
    let decoded = netlink::packets(&buf[..len.min(buf.len())]);
    pending.extend(decoded.packets);

    if len > buf.len() {
        stats.malformed.fetch_add(1, Ordering::Relaxed);
        return Err(QueueError::DatagramTruncated {
            len,
            capacity: buf.len(),
        });
    }
    if let Some(e) = decoded.error {
        stats.malformed.fetch_add(1, Ordering::Relaxed);
        return Err(QueueError::Netlink(e));
    }
    Ok(())
}

/// Bind to an auto-assigned port id with no multicast groups
fn bind_netlink(socket: &Socket) -> io::Result<()> {
    // SAFETY: sockaddr_nl is plain data; all-zero is a valid value.
    let mut addr: libc::sockaddr_nl = unsafe { std::mem::zeroed() };
    addr.nl_family = libc::AF_NETLINK as libc::sa_family_t;

    // SAFETY: addr outlives the call and the length matches its type.
    let rc = unsafe {
        libc::bind(
            socket.as_raw_fd(),
            &addr as *const libc::sockaddr_nl as *const libc::sockaddr,
            std::mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
        )
    };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
