//! Packet View
//!
//! Bounds-checked interpretation of a raw IPv4 datagram as
//! {IPv4 header, TCP header, payload}.
//!
//! The buffer comes straight from the kernel queue and is untrusted:
//! every header length is validated against the buffer length before
//! any field behind it is exposed.
//!
//! ```text
//! 0            ip_header_len        ip_header_len + tcp_header_len     len
//! +-------------------+-----------------------+--------------------------+
//! |  IPv4 header      |  TCP header           |  payload                 |
//! |  IHL * 4 bytes    |  data offset * 4      |  len - (ip + tcp)        |
//! +-------------------+-----------------------+--------------------------+
//! ```

use std::net::Ipv4Addr;
use thiserror::Error;

/// Smallest valid IPv4 header (IHL = 5)
pub const IPV4_MIN_HEADER_LEN: usize = 20;

/// Smallest valid TCP header (data offset = 5)
pub const TCP_MIN_HEADER_LEN: usize = 20;

/// IP protocol number for TCP
pub const IPPROTO_TCP: u8 = 6;

/// Reasons a buffer cannot be viewed as IPv4 + TCP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated IPv4 header: header length {header_len} bytes, buffer {buffer_len} bytes")]
    TruncatedIpHeader { header_len: usize, buffer_len: usize },

    #[error("truncated TCP header: headers end at byte {header_end}, buffer {buffer_len} bytes")]
    TruncatedTcpHeader { header_end: usize, buffer_len: usize },
}

/// Validated view over one packet buffer
#[derive(Debug, Clone, Copy)]
pub struct PacketView<'a> {
    buffer: &'a [u8],
    ip_header_len: usize,
    tcp_header_len: usize,
}

impl<'a> PacketView<'a> {
    /// Validate header lengths and build the view
    ///
    /// Protocol and version fields are exposed but not enforced; the
    /// firewall rule feeding the queue decides what traffic arrives.
    pub fn decode(buffer: &'a [u8]) -> Result<Self, DecodeError> {
        let buffer_len = buffer.len();

        // Byte 0: version (high nibble) + IHL in 32-bit words (low nibble)
        let ip_header_len = buffer.first().map_or(0, |b| usize::from(b & 0x0f) * 4);
        if buffer_len < IPV4_MIN_HEADER_LEN
            || ip_header_len < IPV4_MIN_HEADER_LEN
            || ip_header_len > buffer_len
        {
            return Err(DecodeError::TruncatedIpHeader {
                header_len: ip_header_len,
                buffer_len,
            });
        }

        let tcp = &buffer[ip_header_len..];
        if tcp.len() < TCP_MIN_HEADER_LEN {
            return Err(DecodeError::TruncatedTcpHeader {
                header_end: ip_header_len + TCP_MIN_HEADER_LEN,
                buffer_len,
            });
        }

        // Byte 12: data offset in 32-bit words (high nibble)
        let tcp_header_len = usize::from(tcp[12] >> 4) * 4;
        let header_end = ip_header_len + tcp_header_len;
        if tcp_header_len < TCP_MIN_HEADER_LEN || header_end > buffer_len {
            return Err(DecodeError::TruncatedTcpHeader {
                header_end,
                buffer_len,
            });
        }

        Ok(Self {
            buffer,
            ip_header_len,
            tcp_header_len,
        })
    }

    /// IPv4 header length in bytes (IHL * 4)
    pub fn ip_header_len(&self) -> usize {
        self.ip_header_len
    }

    /// TCP header length in bytes (data offset * 4)
    pub fn tcp_header_len(&self) -> usize {
        self.tcp_header_len
    }

    /// IP version nibble (4 for well-formed input)
    pub fn version(&self) -> u8 {
        self.buffer[0] >> 4
    }

    /// IP protocol field
    pub fn protocol(&self) -> u8 {
        self.buffer[9]
    }

    pub fn source(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.buffer[12], self.buffer[13], self.buffer[14], self.buffer[15])
    }

    pub fn destination(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.buffer[16], self.buffer[17], self.buffer[18], self.buffer[19])
    }

    pub fn source_port(&self) -> u16 {
        let tcp = self.tcp_header();
        u16::from_be_bytes([tcp[0], tcp[1]])
    }

    pub fn destination_port(&self) -> u16 {
        let tcp = self.tcp_header();
        u16::from_be_bytes([tcp[2], tcp[3]])
    }

    fn tcp_header(&self) -> &'a [u8] {
        &self.buffer[self.ip_header_len..self.ip_header_len + self.tcp_header_len]
    }

    /// Bytes after the TCP header: `len - (ip_header_len + tcp_header_len)`
    pub fn payload(&self) -> &'a [u8] {
        &self.buffer[self.ip_header_len + self.tcp_header_len..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// IPv4 (IHL 5) + TCP (offset 5) headers, 10.0.0.1:40000 -> 93.184.216.34:80
    fn headers(ihl: u8, data_offset: u8) -> Vec<u8> {
        let ip_len = usize::from(ihl) * 4;
        let tcp_len = usize::from(data_offset) * 4;
        let mut buf = vec![0u8; ip_len.max(IPV4_MIN_HEADER_LEN) + tcp_len.max(TCP_MIN_HEADER_LEN)];
        buf[0] = 0x40 | ihl;
        buf[9] = IPPROTO_TCP;
        buf[12..16].copy_from_slice(&[10, 0, 0, 1]);
        buf[16..20].copy_from_slice(&[93, 184, 216, 34]);

        let tcp = ip_len.max(IPV4_MIN_HEADER_LEN);
        buf[tcp..tcp + 2].copy_from_slice(&40000u16.to_be_bytes());
        buf[tcp + 2..tcp + 4].copy_from_slice(&80u16.to_be_bytes());
        buf[tcp + 12] = data_offset << 4;
        buf
    }

    #[test]
    fn test_decode_minimal_headers() {
        let mut buf = headers(5, 5);
        buf.extend_from_slice(b"GET / HTTP/1.1\r\n");

        let view = PacketView::decode(&buf).unwrap();
        assert_eq!(view.ip_header_len(), 20);
        assert_eq!(view.tcp_header_len(), 20);
        assert_eq!(view.version(), 4);
        assert_eq!(view.protocol(), IPPROTO_TCP);
        assert_eq!(view.source(), Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(view.destination(), Ipv4Addr::new(93, 184, 216, 34));
        assert_eq!(view.source_port(), 40000);
        assert_eq!(view.destination_port(), 80);
        assert_eq!(view.payload(), b"GET / HTTP/1.1\r\n");
    }

    #[test]
    fn test_decode_with_options() {
        // IHL 6 (4 bytes of IP options), data offset 8 (12 bytes of TCP options)
        let mut buf = headers(6, 8);
        assert_eq!(buf.len(), 24 + 32);
        buf.extend_from_slice(b"xyz");

        let view = PacketView::decode(&buf).unwrap();
        assert_eq!(view.ip_header_len(), 24);
        assert_eq!(view.tcp_header_len(), 32);
        assert_eq!(view.payload(), b"xyz");
        assert_eq!(view.payload().len(), buf.len() - (24 + 32));
    }

    #[test]
    fn test_decode_empty_payload() {
        let buf = headers(5, 5);
        let view = PacketView::decode(&buf).unwrap();
        assert!(view.payload().is_empty());
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(
            PacketView::decode(&[]).unwrap_err(),
            DecodeError::TruncatedIpHeader { header_len: 0, buffer_len: 0 }
        );
    }

    #[test]
    fn test_ip_header_longer_than_buffer() {
        // IHL 15 = 60 bytes declared, only 40 present
        let mut buf = headers(5, 5);
        buf[0] = 0x4f;
        assert_eq!(
            PacketView::decode(&buf).unwrap_err(),
            DecodeError::TruncatedIpHeader { header_len: 60, buffer_len: 40 }
        );
    }

    #[test]
    fn test_ip_header_length_below_minimum() {
        let mut buf = headers(5, 5);
        buf[0] = 0x44;
        assert!(matches!(
            PacketView::decode(&buf),
            Err(DecodeError::TruncatedIpHeader { header_len: 16, .. })
        ));
    }

    #[test]
    fn test_buffer_shorter_than_fixed_ip_header() {
        let buf = [0x45u8; 12];
        assert!(matches!(
            PacketView::decode(&buf),
            Err(DecodeError::TruncatedIpHeader { buffer_len: 12, .. })
        ));
    }

    #[test]
    fn test_missing_tcp_header() {
        let buf = headers(5, 5);
        assert_eq!(
            PacketView::decode(&buf[..30]).unwrap_err(),
            DecodeError::TruncatedTcpHeader { header_end: 40, buffer_len: 30 }
        );
    }

    #[test]
    fn test_tcp_data_offset_past_buffer() {
        let mut buf = headers(5, 5);
        buf[20 + 12] = 0xf0; // 60-byte TCP header declared
        buf.extend_from_slice(b"0123456789");
        assert_eq!(
            PacketView::decode(&buf).unwrap_err(),
            DecodeError::TruncatedTcpHeader { header_end: 80, buffer_len: 50 }
        );
    }

    #[test]
    fn test_tcp_data_offset_below_minimum() {
        let mut buf = headers(5, 5);
        buf[20 + 12] = 0x20;
        assert!(matches!(
            PacketView::decode(&buf),
            Err(DecodeError::TruncatedTcpHeader { header_end: 28, .. })
        ));
    }
}
