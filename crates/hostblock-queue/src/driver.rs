//! Receive → decide → verdict loop
//!
//! Packets are handled one at a time, in the order the queue delivers
//! them. Every received packet gets exactly one verdict.

use crate::queue::{PacketQueue, QueueError, QueuedPacket};
use hostblock_filter::{Verdict, VerdictEngine};
use std::convert::Infallible;
use tracing::{debug, warn};

/// Handle one packet: receive it, decide, submit the verdict
pub fn process_one<Q>(queue: &mut Q, engine: &VerdictEngine) -> Result<Verdict, QueueError>
where
    Q: PacketQueue + ?Sized,
{
    let packet = queue.recv()?;
    log_packet(&packet);

    let decision = engine.classify(&packet.payload);
    let verdict = decision.verdict();
    debug!("Packet {}: {} -> {}", packet.id, decision, verdict);

    queue.set_verdict(packet.id, verdict)?;
    Ok(verdict)
}

/// Run until a non-recoverable queue error
///
/// Overruns and malformed datagrams are logged and skipped.
pub fn run<Q>(queue: &mut Q, engine: &VerdictEngine) -> Result<Infallible, QueueError>
where
    Q: PacketQueue + ?Sized,
{
    loop {
        match process_one(queue, engine) {
            Ok(_) => {}
            Err(QueueError::Overrun) => warn!("losing packets!"),
            Err(e) if e.is_recoverable() => warn!("Skipping datagram: {}", e),
            Err(e) => return Err(e),
        }
    }
}

fn log_packet(packet: &QueuedPacket) {
    debug!(
        "Packet {}: hw_protocol=0x{:04x} hook={} hw_src_addr={} mark={} indev={} outdev={} physindev={} physoutdev={} payload_len={}",
        packet.id,
        packet.hw_protocol,
        packet.hook,
        format_hw_addr(&packet.hw_addr),
        packet.mark,
        packet.indev,
        packet.outdev,
        packet.physindev,
        packet.physoutdev,
        packet.payload.len()
    );
}

/// `aa:bb:cc:..` form of a link-layer address, `-` when absent
fn format_hw_addr(addr: &[u8]) -> String {
    if addr.is_empty() {
        return "-".to_string();
    }
    addr.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}
