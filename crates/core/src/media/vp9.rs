use super::Packetizer;
use super::rtp::{RTP_HEADER_LEN, RtpHeader};

const DESCRIPTOR_LEN: usize = 1;
/// `P`: inter-picture predicted frame (RFC 9628 §4.2).
const INTER_PICTURE: u8 = 0x40;
/// `B`: first packet of a frame.
const START_OF_FRAME: u8 = 0x08;
/// `E`: last packet of a frame.
const END_OF_FRAME: u8 = 0x04;

/// VP9 RTP packetizer (RFC 9628), non-flexible mode without picture ID.
///
/// Each packet carries the minimal 1-byte payload descriptor:
///
/// ```text
///  0 1 2 3 4 5 6 7
/// +-+-+-+-+-+-+-+-+
/// |I|P|L|F|B|E|V|Z|
/// +-+-+-+-+-+-+-+-+
/// ```
///
/// `B` and `E` bracket the frame, `P` is taken from the frame's uncompressed
/// header. `I`, `L`, `F`, `V` and `Z` stay clear: one spatial layer, no
/// scalability structure. The marker bit is set on the last packet.
#[derive(Debug)]
pub struct Vp9Packetizer {
    header: RtpHeader,
    clock_rate: u32,
    max_fragment: usize,
}

impl Vp9Packetizer {
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

    /// Whether `frame` is an inter frame, read from the first byte of its
    /// uncompressed header (VP9 bitstream spec §6.2).
    ///
    /// `show_existing_frame` repeats a decoded frame and is never a key
    /// frame, so it counts as inter.
    pub fn is_inter_frame(frame: &[u8]) -> bool {
        let Some(&b) = frame.first() else {
            return false;
        };
        let bit = |i: u8| (b >> (7 - i)) & 1 == 1;

        // frame_marker(2) profile_low_bit(1) profile_high_bit(1)
        let profile = (u8::from(bit(3)) << 1) | u8::from(bit(2));
        let mut i = 4;
        if profile == 3 {
            i += 1; // reserved_zero
        }
        if bit(i) {
            return true;
        }
        bit(i + 1)
    }
}

impl Packetizer for Vp9Packetizer {
    fn packetize(&mut self, sample: &[u8], timestamp_increment: u32) -> Vec<Vec<u8>> {
        let inter = if Self::is_inter_frame(sample) {
            INTER_PICTURE
        } else {
            0
        };
        let mut packets = Vec::new();
        let mut chunks = sample.chunks(self.max_fragment).peekable();
        let mut first = true;

        while let Some(chunk) = chunks.next() {
            let last = chunks.peek().is_none();
            let hdr = self.header.write(last);

            let mut descriptor = inter;
            if first {
                descriptor |= START_OF_FRAME;
            }
            if last {
                descriptor |= END_OF_FRAME;
            }

            let mut packet = Vec::with_capacity(RTP_HEADER_LEN + DESCRIPTOR_LEN + chunk.len());
            packet.extend_from_slice(&hdr);
            packet.push(descriptor);
            packet.extend_from_slice(chunk);
            packets.push(packet);

            first = false;
        }

        self.header.advance_timestamp(timestamp_increment);
        tracing::trace!(
            rtp_packets = packets.len(),
            frame_bytes = sample.len(),
            inter = inter != 0,
            "VP9 frame packetized"
        );
        packets
    }

    fn codec_name(&self) -> &'static str {
        "VP9"
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
