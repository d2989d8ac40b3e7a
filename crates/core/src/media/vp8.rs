use super::Packetizer;
use super::rtp::{RTP_HEADER_LEN, RtpHeader};

const DESCRIPTOR_LEN: usize = 1;
/// `S` bit: first packet of a VP8 partition (RFC 7741 §4.2).
const START_OF_PARTITION: u8 = 0x10;

/// VP8 RTP packetizer (RFC 7741).
///
/// Each packet carries the minimal 1-byte payload descriptor:
///
/// ```text
///  0 1 2 3 4 5 6 7
/// +-+-+-+-+-+-+-+-+
/// |X|R|N|S|R| PID |
/// +-+-+-+-+-+-+-+-+
/// ```
///
/// Only `S` is used: set on the first packet of a frame. Frames larger than
/// one packet are split at arbitrary byte boundaries, which §4.4 permits.
/// The marker bit is set on the last packet of the frame.
#[derive(Debug)]
pub struct Vp8Packetizer {
    header: RtpHeader,
    clock_rate: u32,
    max_fragment: usize,
}

impl Vp8Packetizer {
    /// `mtu` bounds the full packet size, RTP header included.
    pub fn new(pt: u8, ssrc: u32, clock_rate: u32, mtu: usize) -> Self {
        Self::with_header(RtpHeader::new(pt, ssrc), clock_rate, mtu)
    }

    pub fn with_header(header: RtpHeader, clock_rate: u32, mtu: usize) -> Self {
        let max_fragment = mtu
            .saturating_sub(RTP_HEADER_LEN + DESCRIPTOR_LEN)
            .max(1);
        Self {
            header,
            clock_rate,
            max_fragment,
        }
    }
}

impl Packetizer for Vp8Packetizer {
    fn packetize(&mut self, sample: &[u8], timestamp_increment: u32) -> Vec<Vec<u8>> {
        let mut packets = Vec::new();
        let mut chunks = sample.chunks(self.max_fragment).peekable();
        let mut first = true;

        while let Some(chunk) = chunks.next() {
            let last = chunks.peek().is_none();
            let hdr = self.header.write(last);

            let mut packet = Vec::with_capacity(RTP_HEADER_LEN + DESCRIPTOR_LEN + chunk.len());
            packet.extend_from_slice(&hdr);
            packet.push(if first { START_OF_PARTITION } else { 0 });
            packet.extend_from_slice(chunk);
            packets.push(packet);

            first = false;
        }

        self.header.advance_timestamp(timestamp_increment);
        tracing::trace!(
            rtp_packets = packets.len(),
            frame_bytes = sample.len(),
            "VP8 frame packetized"
        );
        packets
    }

    fn codec_name(&self) -> &'static str {
        "VP8"
    }

    fn clock_rate(&self) -> u32 {
        self.clock_rate
    }

    fn payload_type(&self) -> u8 {
        self.header.pt
    }

    fn next_sequence(&self) -> u16 {
        self.header.sequence()
    }

    fn next_rtp_timestamp(&self) -> u32 {
        self.header.timestamp() as u32
    }
}
