/// Size of the RTP fixed header with no CSRCs.
pub const RTP_HEADER_LEN: usize = 12;

/// Generic RTP fixed header builder (RFC 3550 §5.1).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|X|  CC   |M|     PT      |       Sequence Number         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             SSRC                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Shared by all packetizers. It manages:
/// - **Sequence number**: 16-bit, wrapping, incremented on every packet.
///   Starts at a random value (RFC 3550 §5.1).
/// - **Timestamp**: stored as u64 internally; the lower 32 bits are written
///   to the wire. Also starts at a random value.
/// - **SSRC**: fixed for the life of the header state.
///
/// Version is always 2. Padding, extension, and CSRC count are always 0.
#[derive(Debug)]
pub struct RtpHeader {
    /// RTP payload type (7-bit, RFC 3551).
    pub pt: u8,
    /// Synchronization source identifier (RFC 3550 §8.1).
    pub ssrc: u32,
    sequence: u16,
    timestamp: u64,
}

impl RtpHeader {
    /// Header state with random initial sequence number and timestamp.
    pub fn new(pt: u8, ssrc: u32) -> Self {
        Self::with_state(pt, ssrc, rand::random::<u16>(), u64::from(rand::random::<u32>()))
    }

    /// Header state with explicit initial sequence number and timestamp.
    pub fn with_state(pt: u8, ssrc: u32, sequence: u16, timestamp: u64) -> Self {
        tracing::debug!(
            pt,
            ssrc = format_args!("{:#010X}", ssrc),
            sequence,
            "RTP header state created"
        );
        Self {
            pt: pt & 0x7f,
            ssrc,
            sequence,
            timestamp,
        }
    }

    /// Current sequence number (before the next [`write`](Self::write) call).
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Current timestamp (internal u64 representation).
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Serialize a 12-byte RTP fixed header and advance the sequence number.
    ///
    /// The `marker` bit signals the last packet of a video frame.
    pub fn write(&mut self, marker: bool) -> [u8; RTP_HEADER_LEN] {
        let first_byte: u8 = 2 << 6;
        let second_byte: u8 = ((marker as u8) << 7) | self.pt;

        let mut header = [0u8; RTP_HEADER_LEN];
        header[0] = first_byte;
        header[1] = second_byte;
        header[2..4].copy_from_slice(&self.sequence.to_be_bytes());
        header[4..8].copy_from_slice(&(self.timestamp as u32).to_be_bytes());
        header[8..12].copy_from_slice(&self.ssrc.to_be_bytes());

        self.sequence = self.sequence.wrapping_add(1);
        header
    }

    /// Advance the RTP timestamp by the given increment.
    pub fn advance_timestamp(&mut self, increment: u32) {
        self.timestamp = self.timestamp.wrapping_add(u64::from(increment));
    }
}

/// Overwrite the payload type and SSRC of a serialized RTP packet in place.
///
/// Returns `false` (and leaves `packet` untouched) if it is shorter than a
/// fixed header or not RTP version 2.
pub fn rewrite_pt_ssrc(packet: &mut [u8], pt: u8, ssrc: u32) -> bool {
    if packet.len() < RTP_HEADER_LEN || packet[0] >> 6 != 2 {
        return false;
    }
    packet[1] = (packet[1] & 0x80) | (pt & 0x7f);
    packet[8..12].copy_from_slice(&ssrc.to_be_bytes());
    true
}
