use super::Packetizer;
use super::rtp::RtpHeader;

/// Whole-frame packetizer for audio codecs.
///
/// Opus (RFC 7587 §4.2) and the G.711/G.722 profiles (RFC 3551 §4.5) carry
/// one encoded frame per packet with no payload header. Audio frames are
/// far below any sane MTU, so frames are never split. The marker bit is
/// left clear.
#[derive(Debug)]
pub struct FramePacketizer {
    header: RtpHeader,
    clock_rate: u32,
}

impl FramePacketizer {
    pub fn new(pt: u8, ssrc: u32, clock_rate: u32) -> Self {
        Self::with_header(RtpHeader::new(pt, ssrc), clock_rate)
    }

    pub fn with_header(header: RtpHeader, clock_rate: u32) -> Self {
        Self { header, clock_rate }
    }
}

impl Packetizer for FramePacketizer {
    fn packetize(&mut self, sample: &[u8], timestamp_increment: u32) -> Vec<Vec<u8>> {
        let packets = if sample.is_empty() {
            Vec::new()
        } else {
            let hdr = self.header.write(false);
            let mut packet = Vec::with_capacity(hdr.len() + sample.len());
            packet.extend_from_slice(&hdr);
            packet.extend_from_slice(sample);
            vec![packet]
        };

        self.header.advance_timestamp(timestamp_increment);
        packets
    }

    fn codec_name(&self) -> &'static str {
        "audio"
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
