use super::Packetizer;
use super::rtp::{RTP_HEADER_LEN, RtpHeader};

const FU_A_TYPE: u8 = 28;
const FU_HEADER_LEN: usize = 2;

/// H.264 RTP packetizer (RFC 6184).
///
/// Converts H.264 Annex B bitstreams into RTP packets using two of the
/// RFC 6184 packetization modes:
///
/// - **Single NAL Unit** (§5.6): NALs that fit in one packet are sent as-is
///   (12-byte header + NAL bytes).
///
/// - **FU-A Fragmentation** (§5.8): larger NALs are split across packets,
///   each carrying a 2-byte FU header before the fragment:
///
///   ```text
///   FU indicator:  [F|NRI|Type=28]     (1 byte)
///   FU header:     [S|E|R|NAL_Type]    (1 byte)
///   Fragment data: [...]
///   ```
///
/// The marker bit is set on the last packet of an access unit (§5.1).
#[derive(Debug)]
pub struct H264Packetizer {
    header: RtpHeader,
    clock_rate: u32,
    /// Largest NAL (or FU-A payload incl. FU header) that fits one packet.
    max_payload: usize,
}

impl H264Packetizer {
    /// `mtu` bounds the full packet size, RTP header included.
    pub fn new(pt: u8, ssrc: u32, clock_rate: u32, mtu: usize) -> Self {
        Self::with_header(RtpHeader::new(pt, ssrc), clock_rate, mtu)
    }

    pub fn with_header(header: RtpHeader, clock_rate: u32, mtu: usize) -> Self {
        // Leave room for at least one fragment byte after the FU header.
        let max_payload = mtu
            .saturating_sub(RTP_HEADER_LEN)
            .max(FU_HEADER_LEN + 1);
        Self {
            header,
            clock_rate,
            max_payload,
        }
    }

    /// Packetize a single NAL unit into one or more RTP packets.
    fn packetize_nal(&mut self, nal_unit: &[u8], is_last_nal: bool) -> Vec<Vec<u8>> {
        let mut packets = Vec::new();

        if nal_unit.is_empty() {
            return packets;
        }

        if nal_unit.len() <= self.max_payload {
            let hdr = self.header.write(is_last_nal);
            let mut packet = Vec::with_capacity(RTP_HEADER_LEN + nal_unit.len());
            packet.extend_from_slice(&hdr);
            packet.extend_from_slice(nal_unit);
            packets.push(packet);
            return packets;
        }

        let nal_header = nal_unit[0];
        let nal_type = nal_header & 0x1f;
        let nri = nal_header & 0x60;
        let fu_indicator = nri | FU_A_TYPE;
        let payload = &nal_unit[1..];

        let max_fragment = self.max_payload - FU_HEADER_LEN;
        let mut chunks = payload.chunks(max_fragment).peekable();
        let mut first = true;

        while let Some(chunk) = chunks.next() {
            let last_fragment = chunks.peek().is_none();

            let start_bit = if first { 0x80 } else { 0x00 };
            let end_bit = if last_fragment { 0x40 } else { 0x00 };
            let fu_header = start_bit | end_bit | nal_type;

            let hdr = self.header.write(is_last_nal && last_fragment);

            let mut packet = Vec::with_capacity(RTP_HEADER_LEN + FU_HEADER_LEN + chunk.len());
            packet.extend_from_slice(&hdr);
            packet.push(fu_indicator);
            packet.push(fu_header);
            packet.extend_from_slice(chunk);
            packets.push(packet);

            first = false;
        }

        tracing::trace!(
            nal_type,
            nal_size = nal_unit.len(),
            fragments = packets.len(),
            "FU-A fragmented NAL unit"
        );

        packets
    }

    /// Extract NAL units from an H.264 Annex B bitstream.
    ///
    /// Handles both 4-byte `00 00 00 01` and 3-byte `00 00 01` start codes
    /// and returns the NAL data between them.
    pub fn extract_nal_units(data: &[u8]) -> Vec<&[u8]> {
        let mut nal_units = Vec::new();
        let mut i = 0usize;

        // (nal_data_start_index, start_code_length)
        let mut start_entries: Vec<(usize, usize)> = Vec::new();

        while i < data.len() {
            if i + 3 < data.len() && data[i..i + 4] == [0, 0, 0, 1] {
                start_entries.push((i + 4, 4));
                i += 4;
            } else if i + 2 < data.len() && data[i..i + 3] == [0, 0, 1] {
                start_entries.push((i + 3, 3));
                i += 3;
            } else {
                i += 1;
            }
        }

        for (idx, &(start, _)) in start_entries.iter().enumerate() {
            let end = match start_entries.get(idx + 1) {
                Some(&(next_start, next_sc_len)) => next_start - next_sc_len,
                None => data.len(),
            };

            if start < end {
                nal_units.push(&data[start..end]);
            }
        }

        nal_units
    }
}

impl Packetizer for H264Packetizer {
    fn packetize(&mut self, sample: &[u8], timestamp_increment: u32) -> Vec<Vec<u8>> {
        let nal_units = Self::extract_nal_units(sample);
        let mut packets = Vec::new();

        for (i, nal) in nal_units.iter().enumerate() {
            let is_last = i + 1 == nal_units.len();
            packets.append(&mut self.packetize_nal(nal, is_last));
        }

        self.header.advance_timestamp(timestamp_increment);

        tracing::trace!(
            nal_count = nal_units.len(),
            rtp_packets = packets.len(),
            frame_bytes = sample.len(),
            seq = self.header.sequence(),
            ts = self.header.timestamp(),
            "frame packetized"
        );

        packets
    }

    fn codec_name(&self) -> &'static str {
        "H264"
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

#[cfg(test)]
mod tests {
    use super::*;

    const MTU: usize = 100;

    fn make_packetizer() -> H264Packetizer {
        H264Packetizer::with_header(RtpHeader::with_state(102, 0xAABBCCDD, 0, 0), 90000, MTU)
    }

    // --- NAL extraction ---

    #[test]
    fn extract_single_nal_4byte_sc() {
        let data = [0, 0, 0, 1, 0x65, 0xAA, 0xBB];
        let nals = H264Packetizer::extract_nal_units(&data);
        assert_eq!(nals, vec![&[0x65, 0xAA, 0xBB][..]]);
    }

    #[test]
    fn extract_mixed_start_codes() {
        let mut data = vec![0, 0, 0, 1, 0x67, 0x42];
        data.extend_from_slice(&[0, 0, 1, 0x68, 0xCE]);
        let nals = H264Packetizer::extract_nal_units(&data);
        assert_eq!(nals.len(), 2);
        assert_eq!(nals[0], &[0x67, 0x42]);
        assert_eq!(nals[1], &[0x68, 0xCE]);
    }

    #[test]
    fn extract_no_start_code() {
        assert!(H264Packetizer::extract_nal_units(&[]).is_empty());
        assert!(H264Packetizer::extract_nal_units(&[0xFF, 0xFE]).is_empty());
    }

    // --- Packetization ---

    #[test]
    fn small_nal_single_packet() {
        let mut p = make_packetizer();
        let packets = p.packetize_nal(&[0x65, 0xAA, 0xBB, 0xCC], true);
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].len(), RTP_HEADER_LEN + 4);
        assert_eq!(packets[0][1] & 0x80, 0x80);
    }

    #[test]
    fn large_nal_fragmented_within_mtu() {
        let mut p = make_packetizer();
        let mut nal = vec![0x65];
        nal.extend(vec![0xAA; MTU * 3]);
        let packets = p.packetize_nal(&nal, true);
        assert!(packets.len() > 1);
        assert!(packets.iter().all(|pkt| pkt.len() <= MTU));

        assert_eq!(packets[0][12] & 0x1f, FU_A_TYPE);
        assert_eq!(packets[0][13] & 0x80, 0x80);
        assert_eq!(packets[0][1] & 0x80, 0);

        let last = packets.last().unwrap();
        assert_eq!(last[13] & 0x40, 0x40);
        assert_eq!(last[1] & 0x80, 0x80);

        let carried: usize = packets.iter().map(|pkt| pkt.len() - 14).sum();
        assert_eq!(carried, nal.len() - 1);
    }

    #[test]
    fn marker_only_on_last_nal() {
        let mut p = make_packetizer();
        let mut frame = vec![0, 0, 0, 1, 0x67, 0x42];
        frame.extend_from_slice(&[0, 0, 0, 1, 0x65, 0xAA]);
        let packets = p.packetize(&frame, 3000);
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0][1] & 0x80, 0);
        assert_eq!(packets[1][1] & 0x80, 0x80);
    }

    #[test]
    fn packetize_advances_timestamp() {
        let mut p = make_packetizer();
        let frame = [0, 0, 0, 1, 0x65, 0xAA, 0xBB];
        p.packetize(&frame, 3000);
        p.packetize(&frame, 3000);
        assert_eq!(p.next_rtp_timestamp(), 6000);
        assert_eq!(p.next_sequence(), 2);
    }
}
