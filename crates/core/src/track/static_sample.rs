use std::time::Duration;

use parking_lot::Mutex;

use super::{TrackBinding, TrackLocal, TrackLocalContext, TrackLocalStaticRtp};
use crate::codec::{RtpCodecCapability, RtpCodecKind, RtpCodecParameters};
use crate::config::MediaConfig;
use crate::error::{MediaError, Result};
use crate::media::{DefaultPacketizerFactory, Packetizer, PacketizerFactory};

/// One encoded media unit and how long it plays.
#[derive(Debug, Clone, Default)]
pub struct Sample {
    pub data: Vec<u8>,
    pub duration: Duration,
}

impl Sample {
    pub fn new(data: impl Into<Vec<u8>>, duration: Duration) -> Self {
        Self {
            data: data.into(),
            duration,
        }
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// The live packetizer and the media time it has been fed.
struct Packetizing {
    packetizer: Box<dyn Packetizer>,
    elapsed_nanos: u128,
    emitted_ticks: u128,
}

impl Packetizing {
    fn new(packetizer: Box<dyn Packetizer>) -> Self {
        Self {
            packetizer,
            elapsed_nanos: 0,
            emitted_ticks: 0,
        }
    }

    /// Clock ticks to advance after a sample of `duration`.
    ///
    /// Derived from total elapsed time, rounded, so per-sample rounding
    /// never accumulates drift.
    fn timestamp_increment(&mut self, duration: Duration) -> u32 {
        self.elapsed_nanos += duration.as_nanos();
        let clock_rate = u128::from(self.packetizer.clock_rate());
        let target = (self.elapsed_nanos * clock_rate + NANOS_PER_SEC / 2) / NANOS_PER_SEC;
        let increment = target - self.emitted_ticks;
        self.emitted_ticks = target;
        increment as u32
    }
}

/// A local track that packetizes encoded samples itself.
///
/// Binding state is delegated to an inner [`TrackLocalStaticRtp`]. The
/// packetizer is built on the first successful bind from the codec that
/// session negotiated and dropped when the last session unbinds; each
/// packet it emits is then rewritten per binding on the way out.
///
/// Lock order is packetizer, then bindings.
pub struct TrackLocalStaticSample {
    rtp: TrackLocalStaticRtp,
    packetizer: Mutex<Option<Packetizing>>,
    factory: Box<dyn PacketizerFactory>,
}

impl TrackLocalStaticSample {
    pub fn new(codec: RtpCodecCapability, id: &str, stream_id: &str) -> Self {
        Self::with_config(codec, id, stream_id, MediaConfig::default())
    }

    pub fn with_config(
        codec: RtpCodecCapability,
        id: &str,
        stream_id: &str,
        config: MediaConfig,
    ) -> Self {
        Self::with_factory(codec, id, stream_id, config, DefaultPacketizerFactory)
    }

    pub fn with_factory(
        codec: RtpCodecCapability,
        id: &str,
        stream_id: &str,
        config: MediaConfig,
        factory: impl PacketizerFactory + 'static,
    ) -> Self {
        Self {
            rtp: TrackLocalStaticRtp::with_config(codec, id, stream_id, config),
            packetizer: Mutex::new(None),
            factory: Box::new(factory),
        }
    }

    pub fn codec(&self) -> &RtpCodecCapability {
        self.rtp.codec()
    }

    /// Snapshot of the live bindings, in no particular order.
    pub fn bindings(&self) -> Vec<TrackBinding> {
        self.rtp.bindings()
    }

    pub fn binding_count(&self) -> usize {
        self.rtp.binding_count()
    }

    /// Whether a packetizer is live, i.e. at least one session is bound.
    pub fn is_ready(&self) -> bool {
        self.packetizer.lock().is_some()
    }

    /// Packetize `sample` and send the packets to every bound session.
    ///
    /// The RTP timestamp advances by `duration * clock_rate` after the
    /// sample, tracked over the whole stream so rounding does not drift.
    ///
    /// Fails with [`MediaError::TrackNotBound`] when no session is bound and
    /// with [`MediaError::MalformedSample`] when non-empty data yields no
    /// packets; the sample's duration still counts in that case. Write
    /// failures follow [`TrackLocalStaticRtp::write_rtp`]: every packet
    /// still goes out and the first error is returned.
    pub fn write_sample(&self, sample: &Sample) -> Result<()> {
        let packets = {
            let mut guard = self.packetizer.lock();
            let Some(state) = guard.as_mut() else {
                return Err(MediaError::TrackNotBound);
            };
            let increment = state.timestamp_increment(sample.duration);
            let packets = state.packetizer.packetize(&sample.data, increment);

            tracing::trace!(
                track_id = %self.rtp.id(),
                bytes = sample.data.len(),
                packets = packets.len(),
                next_seq = state.packetizer.next_sequence(),
                next_ts = state.packetizer.next_rtp_timestamp(),
                "sample packetized"
            );

            if packets.is_empty() && !sample.data.is_empty() {
                return Err(MediaError::MalformedSample {
                    codec: state.packetizer.codec_name(),
                    len: sample.data.len(),
                });
            }
            packets
        };

        let mut first_err = None;
        for packet in &packets {
            if let Err(e) = self.rtp.write_rtp(packet) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for TrackLocalStaticSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackLocalStaticSample")
            .field("rtp", &self.rtp)
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

impl TrackLocal for TrackLocalStaticSample {
    fn bind(&self, ctx: &TrackLocalContext) -> Result<RtpCodecParameters> {
        let mut packetizer = self.packetizer.lock();
        let codec = self.rtp.bind(ctx)?;

        if packetizer.is_none() {
            match self
                .factory
                .build(&codec, ctx.ssrc(), self.rtp.config().mtu)
            {
                Ok(p) => *packetizer = Some(Packetizing::new(p)),
                Err(e) => {
                    tracing::warn!(
                        track_id = %self.rtp.id(),
                        mime_type = %codec.mime_type(),
                        error = %e,
                        "packetizer unavailable, rolling back bind"
                    );
                    self.rtp.unbind(ctx)?;
                    return Err(e);
                }
            }
        }
        Ok(codec)
    }

    fn unbind(&self, ctx: &TrackLocalContext) -> Result<()> {
        let mut packetizer = self.packetizer.lock();
        self.rtp.unbind(ctx)?;

        if self.rtp.binding_count() == 0 && packetizer.take().is_some() {
            tracing::debug!(track_id = %self.rtp.id(), "last session gone, packetizer dropped");
        }
        Ok(())
    }

    fn id(&self) -> &str {
        self.rtp.id()
    }

    fn stream_id(&self) -> &str {
        self.rtp.stream_id()
    }

    fn kind(&self) -> RtpCodecKind {
        self.rtp.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{MIME_TYPE_H264, MIME_TYPE_OPUS, MIME_TYPE_RTX, MIME_TYPE_VP9, Ssrc};
    use crate::track::testing::recording_stream;

    fn opus() -> RtpCodecCapability {
        RtpCodecCapability::new(MIME_TYPE_OPUS, 48000, 2)
    }

    fn opus_params(pt: u8) -> Vec<RtpCodecParameters> {
        vec![RtpCodecParameters::new(opus(), pt)]
    }

    fn rtp_ts(packet: &[u8]) -> u32 {
        u32::from_be_bytes([packet[4], packet[5], packet[6], packet[7]])
    }

    fn rtp_ssrc(packet: &[u8]) -> Ssrc {
        u32::from_be_bytes([packet[8], packet[9], packet[10], packet[11]])
    }

    struct NoPacketizer;

    impl PacketizerFactory for NoPacketizer {
        fn build(&self, codec: &RtpCodecParameters, _: Ssrc, _: usize) -> Result<Box<dyn Packetizer>> {
            Err(MediaError::UnsupportedCodec {
                mime_type: codec.mime_type().to_string(),
            })
        }
    }

    #[test]
    fn write_before_bind_fails() {
        let track = TrackLocalStaticSample::new(opus(), "audio0", "stream0");
        assert!(!track.is_ready());
        let err = track
            .write_sample(&Sample::new(vec![1, 2, 3], Duration::from_millis(20)))
            .unwrap_err();
        assert!(matches!(err, MediaError::TrackNotBound));
    }

    #[test]
    fn samples_fan_out_with_session_pt_and_ssrc() {
        let track = TrackLocalStaticSample::new(opus(), "audio0", "stream0");
        let (wa, sa) = recording_stream();
        let (wb, sb) = recording_stream();
        track
            .bind(&TrackLocalContext::new("pc-a", 0xA1, opus_params(111), sa))
            .unwrap();
        track
            .bind(&TrackLocalContext::new("pc-b", 0xB2, opus_params(109), sb))
            .unwrap();
        assert!(track.is_ready());

        track
            .write_sample(&Sample::new(vec![0xF8, 0x01], Duration::from_millis(20)))
            .unwrap();

        let a = wa.packets.lock();
        let b = wb.packets.lock();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0][1] & 0x7f, 111);
        assert_eq!(rtp_ssrc(&a[0]), 0xA1);
        assert_eq!(b[0][1] & 0x7f, 109);
        assert_eq!(rtp_ssrc(&b[0]), 0xB2);
        assert_eq!(&a[0][12..], &[0xF8, 0x01]);
    }

    #[test]
    fn timestamp_advances_by_duration() {
        let track = TrackLocalStaticSample::new(opus(), "audio0", "stream0");
        let (writer, stream) = recording_stream();
        track
            .bind(&TrackLocalContext::new("pc", 1, opus_params(111), stream))
            .unwrap();

        let sample = Sample::new(vec![0x01], Duration::from_millis(20));
        track.write_sample(&sample).unwrap();
        track.write_sample(&sample).unwrap();

        let packets = writer.packets.lock();
        assert_eq!(rtp_ts(&packets[1]).wrapping_sub(rtp_ts(&packets[0])), 960);
    }

    #[test]
    fn last_unbind_drops_packetizer() {
        let track = TrackLocalStaticSample::new(opus(), "audio0", "stream0");
        let (_wa, sa) = recording_stream();
        let (_wb, sb) = recording_stream();
        let a = TrackLocalContext::new("pc-a", 1, opus_params(111), sa);
        let b = TrackLocalContext::new("pc-b", 2, opus_params(111), sb);
        track.bind(&a).unwrap();
        track.bind(&b).unwrap();

        track.unbind(&a).unwrap();
        assert!(track.is_ready());
        track.unbind(&b).unwrap();
        assert!(!track.is_ready());

        let err = track
            .write_sample(&Sample::new(vec![1], Duration::from_millis(20)))
            .unwrap_err();
        assert!(matches!(err, MediaError::TrackNotBound));
    }

    #[test]
    fn packetizer_failure_rolls_back_bind() {
        let track = TrackLocalStaticSample::with_factory(
            opus(),
            "audio0",
            "stream0",
            MediaConfig::default(),
            NoPacketizer,
        );
        let (_w, stream) = recording_stream();
        let ctx = TrackLocalContext::new("pc", 1, opus_params(111), stream);

        assert!(matches!(track.bind(&ctx), Err(MediaError::UnsupportedCodec { .. })));
        assert_eq!(track.binding_count(), 0);
        assert!(!track.is_ready());
    }

    #[test]
    fn repair_format_without_packetizer_is_rejected() {
        let rtx = RtpCodecCapability::new(MIME_TYPE_RTX, 90000, 0).with_fmtp("apt=96");
        let track = TrackLocalStaticSample::new(rtx.clone(), "video0", "stream0");
        let (_w, stream) = recording_stream();
        let ctx = TrackLocalContext::new("pc", 1, vec![RtpCodecParameters::new(rtx, 97)], stream);
        assert!(matches!(track.bind(&ctx), Err(MediaError::UnsupportedCodec { .. })));
        assert_eq!(track.binding_count(), 0);
    }

    #[test]
    fn vp9_track_binds_and_writes() {
        let vp9 = RtpCodecCapability::new(MIME_TYPE_VP9, 90000, 0).with_fmtp("profile-id=0");
        let track = TrackLocalStaticSample::new(vp9.clone(), "video0", "stream0");
        let (writer, stream) = recording_stream();
        let ctx = TrackLocalContext::new("pc", 3, vec![RtpCodecParameters::new(vp9, 98)], stream);
        assert_eq!(track.bind(&ctx).unwrap().payload_type, 98);

        track
            .write_sample(&Sample::new(vec![0x80, 1, 2, 3], Duration::from_millis(33)))
            .unwrap();
        let packets = writer.packets.lock();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0][1] & 0x7f, 98);
    }

    #[test]
    fn bindings_visible_through_wrapper() {
        let track = TrackLocalStaticSample::new(opus(), "audio0", "stream0");
        let (_w, stream) = recording_stream();
        let ctx = TrackLocalContext::new("pc", 0x77, opus_params(111), stream);
        track.bind(&ctx).unwrap();

        let bindings = track.bindings();
        assert_eq!(track.binding_count(), 1);
        assert_eq!(bindings[0].ssrc, 0x77);
        assert_eq!(bindings[0].payload_type, 111);
        assert_eq!(&bindings[0].write_stream, ctx.write_stream());

        // Bound means writable.
        assert!(track.is_ready());
        track
            .write_sample(&Sample::new(vec![1], Duration::from_millis(20)))
            .unwrap();
    }

    #[test]
    fn sample_without_start_code_is_malformed() {
        let h264 = RtpCodecCapability::new(MIME_TYPE_H264, 90000, 0);
        let track = TrackLocalStaticSample::new(h264.clone(), "video0", "stream0");
        let (writer, stream) = recording_stream();
        track
            .bind(&TrackLocalContext::new("pc", 1, vec![RtpCodecParameters::new(h264, 102)], stream))
            .unwrap();

        let err = track
            .write_sample(&Sample::new(vec![0xAA; 50], Duration::from_millis(33)))
            .unwrap_err();
        assert!(matches!(err, MediaError::MalformedSample { codec: "H264", len: 50 }));
        assert!(writer.packets.lock().is_empty());

        // An empty sample is only a gap in time.
        track
            .write_sample(&Sample::new(Vec::new(), Duration::from_millis(33)))
            .unwrap();
    }

    #[test]
    fn fractional_durations_do_not_drift() {
        let vp8 = RtpCodecCapability::new(crate::codec::MIME_TYPE_VP8, 90000, 0);
        let track = TrackLocalStaticSample::new(vp8.clone(), "video0", "stream0");
        let (writer, stream) = recording_stream();
        track
            .bind(&TrackLocalContext::new("pc", 1, vec![RtpCodecParameters::new(vp8, 96)], stream))
            .unwrap();

        // 1/30 s is not a whole number of 90 kHz ticks once truncated to ns.
        let frame = Sample::new(vec![0x10], Duration::from_nanos(33_333_333));
        for _ in 0..=30 {
            track.write_sample(&frame).unwrap();
        }

        let packets = writer.packets.lock();
        assert_eq!(packets.len(), 31);
        assert_eq!(rtp_ts(&packets[30]).wrapping_sub(rtp_ts(&packets[0])), 90000);
        assert_eq!(rtp_ts(&packets[1]).wrapping_sub(rtp_ts(&packets[0])), 3000);
    }

    #[test]
    fn h264_frames_respect_mtu() {
        let config = MediaConfig {
            mtu: 200,
            ..Default::default()
        };
        let h264 = RtpCodecCapability::new(MIME_TYPE_H264, 90000, 0);
        let track = TrackLocalStaticSample::with_config(h264.clone(), "video0", "stream0", config);
        assert_eq!(track.kind(), RtpCodecKind::Video);

        let (writer, stream) = recording_stream();
        track
            .bind(&TrackLocalContext::new(
                "pc",
                7,
                vec![RtpCodecParameters::new(h264, 102)],
                stream,
            ))
            .unwrap();

        let mut frame = vec![0, 0, 0, 1, 0x65];
        frame.extend(vec![0xAB; 1000]);
        track
            .write_sample(&Sample::new(frame, Duration::from_millis(33)))
            .unwrap();

        let packets = writer.packets.lock();
        assert!(packets.len() > 1);
        assert!(packets.iter().all(|p| p.len() <= 200));
        assert!(packets.iter().all(|p| p[1] & 0x7f == 102));
        assert_eq!(packets.last().unwrap()[1] & 0x80, 0x80);
    }
}
