//! nfnetlink_queue Wire Codec
//!
//! Encoders and decoders for the messages exchanged with the kernel's
//! `nfnetlink_queue` subsystem. No socket I/O happens here.
//!
//! Message layout:
//!
//! ```text
//! +-----------------+---------------+--------------------------------+
//! | nlmsghdr (16)   | nfgenmsg (4)  | nlattr, nlattr, ...            |
//! | len type flags  | family ver    | (len, type, value, pad to 4)   |
//! | seq pid         | res_id (BE)   |                                |
//! +-----------------+---------------+--------------------------------+
//! ```
//!
//! Netlink headers are host byte order; nfnetlink payload values are
//! big endian. One datagram can carry several messages.

use crate::queue::QueuedPacket;
use hostblock_filter::Verdict;
use thiserror::Error;
use tracing::{trace, warn};

/// Netlink protocol family for netfilter
pub const NETLINK_NETFILTER: i32 = 12;

/// Size of `struct nlmsghdr`
pub const NLMSG_HDR_LEN: usize = 16;

/// Size of `struct nfgenmsg`
pub const NFGENMSG_LEN: usize = 4;

/// Room around a copied payload for the netlink, nfgenmsg and packet
/// metadata attribute headers of one `NFQNL_MSG_PACKET`
pub const PACKET_MSG_OVERHEAD: usize = 4096;

const NLA_HDR_LEN: usize = 4;

// Strips NLA_F_NESTED and NLA_F_NET_BYTEORDER
const NLA_TYPE_MASK: u16 = 0x3fff;

// Control message types
pub const NLMSG_NOOP: u16 = 1;
pub const NLMSG_ERROR: u16 = 2;
pub const NLMSG_DONE: u16 = 3;

// Message flags
pub const NLM_F_REQUEST: u16 = 1;
pub const NLM_F_ACK: u16 = 4;

// nfnetlink subsystem id of the queue, high byte of the message type
const NFNL_SUBSYS_QUEUE: u16 = 3;
const NFNETLINK_V0: u8 = 0;

pub const NFQNL_MSG_PACKET: u16 = NFNL_SUBSYS_QUEUE << 8;
pub const NFQNL_MSG_VERDICT: u16 = (NFNL_SUBSYS_QUEUE << 8) | 1;
pub const NFQNL_MSG_CONFIG: u16 = (NFNL_SUBSYS_QUEUE << 8) | 2;

// Packet attributes
const NFQA_PACKET_HDR: u16 = 1;
const NFQA_VERDICT_HDR: u16 = 2;
const NFQA_MARK: u16 = 3;
const NFQA_IFINDEX_INDEV: u16 = 5;
const NFQA_IFINDEX_OUTDEV: u16 = 6;
const NFQA_IFINDEX_PHYSINDEV: u16 = 7;
const NFQA_IFINDEX_PHYSOUTDEV: u16 = 8;
const NFQA_HWADDR: u16 = 9;
const NFQA_PAYLOAD: u16 = 10;

// Config attributes
const NFQA_CFG_CMD: u16 = 1;
const NFQA_CFG_PARAMS: u16 = 2;

const NFQNL_COPY_PACKET: u8 = 2;

// Address families (same values on every Linux target)
pub const AF_UNSPEC: u8 = 0;
pub const AF_INET: u16 = 2;

// Netfilter verdict codes
pub const NF_DROP: u32 = 0;
pub const NF_ACCEPT: u32 = 1;

/// `NFQNL_CFG_CMD_*` commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConfigCommand {
    /// Bind this socket to a queue number
    Bind = 1,
    /// Release the queue number
    Unbind = 2,
    /// Register as queue handler for a protocol family
    PfBind = 3,
    /// Drop any existing handler for a protocol family
    PfUnbind = 4,
}

/// Malformed netlink input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetlinkError {
    #[error("truncated netlink data: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("invalid netlink length field {0}")]
    BadLength(usize),

    #[error("packet message without NFQA_PACKET_HDR")]
    MissingPacketHeader,
}

/// Kernel verdict code for a filter verdict
pub fn verdict_code(verdict: Verdict) -> u32 {
    match verdict {
        Verdict::Forward => NF_ACCEPT,
        Verdict::Discard => NF_DROP,
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Builds one nfnetlink message: header, nfgenmsg, attributes
struct MessageBuilder {
    buf: Vec<u8>,
}

impl MessageBuilder {
    fn new(msg_type: u16, flags: u16, seq: u32, family: u8, res_id: u16) -> Self {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&0u32.to_ne_bytes()); // nlmsg_len, patched in finish()
        buf.extend_from_slice(&msg_type.to_ne_bytes());
        buf.extend_from_slice(&flags.to_ne_bytes());
        buf.extend_from_slice(&seq.to_ne_bytes());
        buf.extend_from_slice(&0u32.to_ne_bytes()); // nlmsg_pid: kernel
        buf.push(family);
        buf.push(NFNETLINK_V0);
        buf.extend_from_slice(&res_id.to_be_bytes());
        Self { buf }
    }

    fn attr(mut self, attr_type: u16, data: &[u8]) -> Self {
        let len = (NLA_HDR_LEN + data.len()) as u16;
        self.buf.extend_from_slice(&len.to_ne_bytes());
        self.buf.extend_from_slice(&attr_type.to_ne_bytes());
        self.buf.extend_from_slice(data);
        self.buf.resize(align4(self.buf.len()), 0);
        self
    }

    fn finish(mut self) -> Vec<u8> {
        let len = self.buf.len() as u32;
        self.buf[..4].copy_from_slice(&len.to_ne_bytes());
        self.buf
    }
}

/// `NFQNL_MSG_CONFIG` carrying a command; the kernel acks it
pub fn config_command(seq: u32, queue_num: u16, command: ConfigCommand, pf: u16) -> Vec<u8> {
    // struct nfqnl_msg_config_cmd { u8 command; u8 pad; __be16 pf; }
    let pf = pf.to_be_bytes();
    MessageBuilder::new(NFQNL_MSG_CONFIG, NLM_F_REQUEST | NLM_F_ACK, seq, AF_UNSPEC, queue_num)
        .attr(NFQA_CFG_CMD, &[command as u8, 0, pf[0], pf[1]])
        .finish()
}

/// `NFQNL_MSG_CONFIG` switching the queue to copy-packet mode
pub fn config_params(seq: u32, queue_num: u16, copy_range: u32) -> Vec<u8> {
    // struct nfqnl_msg_config_params { __be32 copy_range; u8 copy_mode; } (packed)
    let mut params = [0u8; 5];
    params[..4].copy_from_slice(&copy_range.to_be_bytes());
    params[4] = NFQNL_COPY_PACKET;
    MessageBuilder::new(NFQNL_MSG_CONFIG, NLM_F_REQUEST | NLM_F_ACK, seq, AF_UNSPEC, queue_num)
        .attr(NFQA_CFG_PARAMS, &params)
        .finish()
}

/// `NFQNL_MSG_VERDICT` for one packet id (no ack requested)
pub fn verdict(seq: u32, queue_num: u16, packet_id: u32, verdict: Verdict) -> Vec<u8> {
    // struct nfqnl_msg_verdict_hdr { __be32 verdict; __be32 id; }
    let mut hdr = [0u8; 8];
    hdr[..4].copy_from_slice(&verdict_code(verdict).to_be_bytes());
    hdr[4..].copy_from_slice(&packet_id.to_be_bytes());
    MessageBuilder::new(NFQNL_MSG_VERDICT, NLM_F_REQUEST, seq, AF_UNSPEC, queue_num)
        .attr(NFQA_VERDICT_HDR, &hdr)
        .finish()
}

// ============================================================================
// Decoding
// ============================================================================

/// One netlink message borrowed from a datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message<'a> {
    pub msg_type: u16,
    pub flags: u16,
    pub seq: u32,
    /// Bytes after the 16-byte header
    pub payload: &'a [u8],
}

/// Decoded meaning of an inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A queued packet waiting for a verdict
    Packet(QueuedPacket),
    /// Positive acknowledgement of request `seq`
    Ack { seq: u32 },
    /// Request `seq` failed with a positive errno
    Error { seq: u32, errno: i32 },
    /// Anything else (NOOP, DONE, unknown types)
    Other { msg_type: u16 },
}

/// Iterate over the messages packed into one datagram
pub fn messages(datagram: &[u8]) -> Messages<'_> {
    Messages { rest: datagram }
}

/// Iterator returned by [`messages`]; stops after the first error
pub struct Messages<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Messages<'a> {
    type Item = Result<Message<'a>, NetlinkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        match split_message(self.rest) {
            Ok((message, rest)) => {
                self.rest = rest;
                Some(Ok(message))
            }
            Err(e) => {
                self.rest = &[];
                Some(Err(e))
            }
        }
    }
}

fn split_message(buf: &[u8]) -> Result<(Message<'_>, &[u8]), NetlinkError> {
    if buf.len() < NLMSG_HDR_LEN {
        return Err(NetlinkError::Truncated {
            needed: NLMSG_HDR_LEN,
            available: buf.len(),
        });
    }

    let len = read_u32_ne(buf, 0) as usize;
    if len < NLMSG_HDR_LEN {
        return Err(NetlinkError::BadLength(len));
    }
    if len > buf.len() {
        return Err(NetlinkError::Truncated {
            needed: len,
            available: buf.len(),
        });
    }

    let message = Message {
        msg_type: read_u16_ne(buf, 4),
        flags: read_u16_ne(buf, 6),
        seq: read_u32_ne(buf, 8),
        payload: &buf[NLMSG_HDR_LEN..len],
    };
    let next = align4(len).min(buf.len());
    Ok((message, &buf[next..]))
}

/// Interpret one message
pub fn decode(message: &Message<'_>) -> Result<Inbound, NetlinkError> {
    match message.msg_type {
        NFQNL_MSG_PACKET => decode_packet(message.payload).map(Inbound::Packet),
        NLMSG_ERROR => {
            // struct nlmsgerr { int error; struct nlmsghdr msg; }
            if message.payload.len() < 4 {
                return Err(NetlinkError::Truncated {
                    needed: 4,
                    available: message.payload.len(),
                });
            }
            let error = read_u32_ne(message.payload, 0) as i32;
            if error == 0 {
                Ok(Inbound::Ack { seq: message.seq })
            } else {
                Ok(Inbound::Error {
                    seq: message.seq,
                    errno: error.saturating_neg(),
                })
            }
        }
        msg_type => Ok(Inbound::Other { msg_type }),
    }
}

/// Decode an `NFQNL_MSG_PACKET` payload (nfgenmsg + attributes)
pub fn decode_packet(payload: &[u8]) -> Result<QueuedPacket, NetlinkError> {
    if payload.len() < NFGENMSG_LEN {
        return Err(NetlinkError::Truncated {
            needed: NFGENMSG_LEN,
            available: payload.len(),
        });
    }

    let mut header = None;
    let mut packet = QueuedPacket::default();

    for attr in attributes(&payload[NFGENMSG_LEN..]) {
        let (attr_type, value) = attr?;
        match attr_type {
            // struct nfqnl_msg_packet_hdr { __be32 packet_id; __be16 hw_protocol; u8 hook; }
            NFQA_PACKET_HDR if value.len() >= 7 => {
                header = Some((read_u32_be(value, 0), read_u16_be(value, 4), value[6]));
            }
            NFQA_MARK if value.len() >= 4 => packet.mark = read_u32_be(value, 0),
            NFQA_IFINDEX_INDEV if value.len() >= 4 => packet.indev = read_u32_be(value, 0),
            NFQA_IFINDEX_OUTDEV if value.len() >= 4 => packet.outdev = read_u32_be(value, 0),
            NFQA_IFINDEX_PHYSINDEV if value.len() >= 4 => packet.physindev = read_u32_be(value, 0),
            NFQA_IFINDEX_PHYSOUTDEV if value.len() >= 4 => {
                packet.physoutdev = read_u32_be(value, 0)
            }
            // struct nfqnl_msg_packet_hw { __be16 hw_addrlen; u16 pad; u8 hw_addr[8]; }
            NFQA_HWADDR if value.len() >= 4 => {
                let len = usize::from(read_u16_be(value, 0)).min(value.len() - 4).min(8);
                packet.hw_addr = value[4..4 + len].to_vec();
            }
            NFQA_PAYLOAD => packet.payload = value.to_vec(),
            _ => {}
        }
    }

    let (id, hw_protocol, hook) = header.ok_or(NetlinkError::MissingPacketHeader)?;
    packet.id = id;
    packet.hw_protocol = hw_protocol;
    packet.hook = hook;
    Ok(packet)
}

/// Queued packets decoded from one datagram
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DatagramPackets {
    /// Every packet decoded before `error`, in delivery order
    pub packets: Vec<QueuedPacket>,
    /// What stopped decoding, if anything
    pub error: Option<NetlinkError>,
}

/// Collect every queued packet carried by one datagram, in order
///
/// Decoding stops at the first malformed message; packets before it are
/// still returned so each one can get its verdict. Kernel error reports
/// are logged; acks and other control messages are skipped.
pub fn packets(datagram: &[u8]) -> DatagramPackets {
    let mut decoded = DatagramPackets::default();
    for message in messages(datagram) {
        let inbound = match message.and_then(|message| decode(&message)) {
            Ok(inbound) => inbound,
            Err(e) => {
                decoded.error = Some(e);
                break;
            }
        };
        match inbound {
            Inbound::Packet(packet) => decoded.packets.push(packet),
            Inbound::Error { seq, errno } => {
                warn!(
                    "Kernel reported error for request {}: {}",
                    seq,
                    std::io::Error::from_raw_os_error(errno)
                );
            }
            Inbound::Ack { seq } => trace!("Ack for request {}", seq),
            Inbound::Other { msg_type } => trace!("Skipping netlink message type {}", msg_type),
        }
    }
    decoded
}

/// Iterate over `(type, value)` attribute pairs
fn attributes(buf: &[u8]) -> impl Iterator<Item = Result<(u16, &[u8]), NetlinkError>> {
    let mut rest = buf;
    std::iter::from_fn(move || {
        if rest.len() < NLA_HDR_LEN {
            return None; // trailing padding
        }
        let len = usize::from(read_u16_ne(rest, 0));
        let attr_type = read_u16_ne(rest, 2) & NLA_TYPE_MASK;
        if len < NLA_HDR_LEN || len > rest.len() {
            rest = &[];
            return Some(Err(NetlinkError::BadLength(len)));
        }
        let value = &rest[NLA_HDR_LEN..len];
        rest = &rest[align4(len).min(rest.len())..];
        Some(Ok((attr_type, value)))
    })
}

#[inline]
fn align4(len: usize) -> usize {
    (len + 3) & !3
}

fn read_u16_ne(buf: &[u8], at: usize) -> u16 {
    u16::from_ne_bytes([buf[at], buf[at + 1]])
}

fn read_u32_ne(buf: &[u8], at: usize) -> u32 {
    u32::from_ne_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn read_u16_be(buf: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([buf[at], buf[at + 1]])
}

fn read_u32_be(buf: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

#[cfg(test)]
pub(crate) const ETH_P_IP: u16 = 0x0800;

#[cfg(test)]
pub(crate) const NF_INET_LOCAL_OUT: u8 = 3;

/// A kernel-style packet message, as delivered on the queue socket
#[cfg(test)]
pub(crate) fn packet_message(id: u32, payload: &[u8]) -> Vec<u8> {
    let mut hdr = [0u8; 7];
    hdr[..4].copy_from_slice(&id.to_be_bytes());
    hdr[4..6].copy_from_slice(&ETH_P_IP.to_be_bytes());
    hdr[6] = NF_INET_LOCAL_OUT;

    let mut hw = [0u8; 12];
    hw[..2].copy_from_slice(&6u16.to_be_bytes());
    hw[4..10].copy_from_slice(&[0x02, 0x42, 0xac, 0x11, 0x00, 0x02]);

    MessageBuilder::new(NFQNL_MSG_PACKET, 0, 0, AF_INET as u8, 0)
        .attr(NFQA_PACKET_HDR, &hdr)
        .attr(NFQA_MARK, &7u32.to_be_bytes())
        .attr(NFQA_IFINDEX_OUTDEV, &2u32.to_be_bytes())
        .attr(NFQA_HWADDR, &hw)
        .attr(NFQA_PAYLOAD, payload)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_message(seq: u32, error: i32) -> Vec<u8> {
        let mut msg = Vec::new();
        msg.extend_from_slice(&36u32.to_ne_bytes());
        msg.extend_from_slice(&NLMSG_ERROR.to_ne_bytes());
        msg.extend_from_slice(&0u16.to_ne_bytes());
        msg.extend_from_slice(&seq.to_ne_bytes());
        msg.extend_from_slice(&0u32.to_ne_bytes());
        msg.extend_from_slice(&error.to_ne_bytes());
        msg.extend_from_slice(&[0u8; NLMSG_HDR_LEN]); // echoed request header
        msg
    }

    #[test]
    fn test_verdict_message_layout() {
        let msg = verdict(9, 0, 0x0102_0304, Verdict::Discard);

        assert_eq!(msg.len(), NLMSG_HDR_LEN + NFGENMSG_LEN + NLA_HDR_LEN + 8);
        assert_eq!(read_u32_ne(&msg, 0) as usize, msg.len());
        assert_eq!(read_u16_ne(&msg, 4), NFQNL_MSG_VERDICT);
        assert_eq!(read_u16_ne(&msg, 6), NLM_F_REQUEST);
        assert_eq!(read_u32_ne(&msg, 8), 9);

        // attribute: len 12, type VERDICT_HDR, NF_DROP, packet id (both big endian)
        assert_eq!(read_u16_ne(&msg, 20), 12);
        assert_eq!(read_u16_ne(&msg, 22), NFQA_VERDICT_HDR);
        assert_eq!(&msg[24..28], &NF_DROP.to_be_bytes());
        assert_eq!(&msg[28..32], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_verdict_codes() {
        assert_eq!(verdict_code(Verdict::Forward), NF_ACCEPT);
        assert_eq!(verdict_code(Verdict::Discard), NF_DROP);
    }

    #[test]
    fn test_config_command_layout() {
        let msg = config_command(1, 0, ConfigCommand::PfBind, AF_INET);

        assert_eq!(read_u16_ne(&msg, 4), NFQNL_MSG_CONFIG);
        assert_eq!(read_u16_ne(&msg, 6), NLM_F_REQUEST | NLM_F_ACK);
        assert_eq!(msg[16], AF_UNSPEC);
        assert_eq!(&msg[24..28], &[3, 0, 0, 2]);
    }

    #[test]
    fn test_config_bind_uses_queue_number() {
        let msg = config_command(2, 5, ConfigCommand::Bind, 0);
        assert_eq!(read_u16_be(&msg, 18), 5);
        assert_eq!(msg[24], ConfigCommand::Bind as u8);
    }

    #[test]
    fn test_config_params_padding() {
        let msg = config_params(3, 0, 0xffff);

        // 5-byte value padded to 8
        assert_eq!(msg.len(), NLMSG_HDR_LEN + NFGENMSG_LEN + 12);
        assert_eq!(read_u16_ne(&msg, 20), 9);
        assert_eq!(read_u16_ne(&msg, 22), NFQA_CFG_PARAMS);
        assert_eq!(&msg[24..29], &[0, 0, 0xff, 0xff, NFQNL_COPY_PACKET]);
        assert_eq!(&msg[29..32], &[0, 0, 0]);
    }

    #[test]
    fn test_decode_packet_message() {
        let msg = packet_message(42, b"\x45\x00\x00\x28");
        let message = messages(&msg).next().unwrap().unwrap();

        assert_eq!(message.msg_type, NFQNL_MSG_PACKET);
        match decode(&message).unwrap() {
            Inbound::Packet(packet) => {
                assert_eq!(packet.id, 42);
                assert_eq!(packet.hw_protocol, ETH_P_IP);
                assert_eq!(packet.hook, NF_INET_LOCAL_OUT);
                assert_eq!(packet.mark, 7);
                assert_eq!(packet.indev, 0);
                assert_eq!(packet.outdev, 2);
                assert_eq!(packet.hw_addr, [0x02, 0x42, 0xac, 0x11, 0x00, 0x02]);
                assert_eq!(packet.payload, b"\x45\x00\x00\x28");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_datagram_with_several_messages() {
        let mut datagram = packet_message(1, b"first");
        datagram.extend(error_message(5, 0));
        datagram.extend(packet_message(2, b"second"));

        let decoded = packets(&datagram);
        assert_eq!(decoded.error, None);
        let packets = decoded.packets;
        let ids: Vec<u32> = packets.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(packets[1].payload, b"second");
    }

    #[test]
    fn test_decode_ack_and_error() {
        let ack = error_message(7, 0);
        let message = messages(&ack).next().unwrap().unwrap();
        assert_eq!(decode(&message).unwrap(), Inbound::Ack { seq: 7 });

        let err = error_message(8, -libc::EPERM);
        let message = messages(&err).next().unwrap().unwrap();
        assert_eq!(
            decode(&message).unwrap(),
            Inbound::Error { seq: 8, errno: libc::EPERM }
        );
    }

    #[test]
    fn test_truncated_datagram() {
        let msg = packet_message(1, b"payload");

        let err = messages(&msg[..10]).next().unwrap().unwrap_err();
        assert_eq!(err, NetlinkError::Truncated { needed: 16, available: 10 });

        let err = messages(&msg[..msg.len() - 4]).next().unwrap().unwrap_err();
        assert!(matches!(err, NetlinkError::Truncated { .. }));
    }

    #[test]
    fn test_zero_length_message_rejected() {
        let mut msg = packet_message(1, b"x");
        msg[..4].copy_from_slice(&0u32.to_ne_bytes());

        let mut iter = messages(&msg);
        assert_eq!(iter.next(), Some(Err(NetlinkError::BadLength(0))));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_bad_attribute_length() {
        let mut msg = packet_message(1, b"x");
        // first attribute claims to run past the message
        msg[20..22].copy_from_slice(&0xfff0u16.to_ne_bytes());
        let decoded = packets(&msg);
        assert!(decoded.packets.is_empty());
        assert_eq!(decoded.error, Some(NetlinkError::BadLength(0xfff0)));
    }

    #[test]
    fn test_missing_packet_header() {
        let msg = MessageBuilder::new(NFQNL_MSG_PACKET, 0, 0, AF_INET as u8, 0)
            .attr(NFQA_PAYLOAD, b"data")
            .finish();
        assert_eq!(packets(&msg).error, Some(NetlinkError::MissingPacketHeader));
    }

    #[test]
    fn test_packets_before_malformed_message_are_kept() {
        let mut datagram = packet_message(11, b"kept");
        datagram.extend_from_slice(&[0u8; 10]);

        let decoded = packets(&datagram);

        assert_eq!(decoded.packets.len(), 1);
        assert_eq!(decoded.packets[0].id, 11);
        assert_eq!(decoded.packets[0].payload, b"kept");
        assert_eq!(
            decoded.error,
            Some(NetlinkError::Truncated { needed: 16, available: 10 })
        );
    }

    #[test]
    fn test_short_hw_addr_attribute() {
        let msg = MessageBuilder::new(NFQNL_MSG_PACKET, 0, 0, AF_INET as u8, 0)
            .attr(NFQA_PACKET_HDR, &[0, 0, 0, 1, 8, 0, 3])
            .attr(NFQA_HWADDR, &[0, 6, 0, 0, 0xaa, 0xbb])
            .finish();

        let decoded = packets(&msg);
        assert_eq!(decoded.error, None);
        assert_eq!(decoded.packets[0].hw_addr, [0xaa, 0xbb]);
    }
}
