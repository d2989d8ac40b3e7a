//! RTP packetization for sample-oriented tracks.
//!
//! A [`Packetizer`] turns one encoded media sample into one or more RTP
//! packets for a fixed payload type and clock rate. Sample tracks build one
//! through a [`PacketizerFactory`] once a session has negotiated a codec.
//!
//! ## Supported codecs
//!
//! | Codec | Module | RFC | Strategy |
//! |-------|--------|-----|----------|
//! | H.264 | [`h264`] | [RFC 6184](https://tools.ietf.org/html/rfc6184) | Single NAL / FU-A |
//! | VP8 | [`vp8`] | [RFC 7741](https://tools.ietf.org/html/rfc7741) | Payload descriptor + split |
//! | VP9 | [`vp9`] | [RFC 9628](https://tools.ietf.org/html/rfc9628) | Non-flexible descriptor + split |
//! | Audio (Opus, G.711, G.722) | [`frame`] | RFC 7587 / RFC 3551 | One frame per packet |
//!
//! `rtx`, `red` and `ulpfec` are repair formats derived from other streams
//! and have no packetizer; a sample track created with one of them fails to
//! bind. Raw RTP tracks accept any codec.

pub mod frame;
pub mod h264;
pub mod rtp;
pub mod vp8;
pub mod vp9;

use crate::codec::{MIME_TYPE_H264, MIME_TYPE_VP8, MIME_TYPE_VP9, RtpCodecKind, RtpCodecParameters, Ssrc};
use crate::error::{MediaError, Result};

pub use frame::FramePacketizer;
pub use h264::H264Packetizer;
pub use vp8::Vp8Packetizer;
pub use vp9::Vp9Packetizer;

/// Codec-specific RTP packetizer.
///
/// The generic RTP header is handled by [`rtp::RtpHeader`]; packetizers
/// compose it rather than reimplementing header serialization.
pub trait Packetizer: Send {
    /// Packetize one encoded sample into complete RTP packets.
    ///
    /// Each returned `Vec<u8>` is a 12-byte header (RFC 3550 §5.1) followed
    /// by the codec payload. `timestamp_increment` advances the RTP
    /// timestamp after this sample.
    fn packetize(&mut self, sample: &[u8], timestamp_increment: u32) -> Vec<Vec<u8>>;

    /// Codec name as it appears in `a=rtpmap` (e.g. `"H264"`).
    fn codec_name(&self) -> &'static str;

    /// RTP clock rate in Hz.
    fn clock_rate(&self) -> u32;

    fn payload_type(&self) -> u8;

    /// Sequence number the next packet will carry.
    fn next_sequence(&self) -> u16;

    /// RTP timestamp the next sample will carry.
    fn next_rtp_timestamp(&self) -> u32;
}

/// Builds packetizers for negotiated codecs.
pub trait PacketizerFactory: Send + Sync {
    /// Build a packetizer emitting packets of at most `mtu` bytes for
    /// `codec`, stamped with `ssrc`.
    fn build(
        &self,
        codec: &RtpCodecParameters,
        ssrc: Ssrc,
        mtu: usize,
    ) -> Result<Box<dyn Packetizer>>;
}

/// Picks a packetizer by MIME type (ASCII case-insensitive).
///
/// H.264, VP8 and VP9 get their RFC payload formats. Any audio codec is sent
/// one frame per packet. Everything else is rejected with
/// [`MediaError::UnsupportedCodec`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultPacketizerFactory;

impl PacketizerFactory for DefaultPacketizerFactory {
    fn build(
        &self,
        codec: &RtpCodecParameters,
        ssrc: Ssrc,
        mtu: usize,
    ) -> Result<Box<dyn Packetizer>> {
        let mime_type = codec.mime_type();
        let pt = codec.payload_type;
        let clock_rate = codec.clock_rate();

        let packetizer: Box<dyn Packetizer> = if mime_type.eq_ignore_ascii_case(MIME_TYPE_H264) {
            Box::new(H264Packetizer::new(pt, ssrc, clock_rate, mtu))
        } else if mime_type.eq_ignore_ascii_case(MIME_TYPE_VP8) {
            Box::new(Vp8Packetizer::new(pt, ssrc, clock_rate, mtu))
        } else if mime_type.eq_ignore_ascii_case(MIME_TYPE_VP9) {
            Box::new(Vp9Packetizer::new(pt, ssrc, clock_rate, mtu))
        } else if RtpCodecKind::from_mime_type(mime_type) == RtpCodecKind::Audio {
            Box::new(FramePacketizer::new(pt, ssrc, clock_rate))
        } else {
            return Err(MediaError::UnsupportedCodec {
                mime_type: mime_type.to_string(),
            });
        };

        tracing::debug!(
            pt,
            clock_rate,
            mtu,
            codec = packetizer.codec_name(),
            "packetizer built"
        );
        Ok(packetizer)
    }
}
