use parking_lot::Mutex;

use super::{TrackBinding, TrackLocal, TrackLocalContext};
use crate::codec::{RtpCodecCapability, RtpCodecKind, RtpCodecParameters};
use crate::config::MediaConfig;
use crate::error::{MediaError, Result};
use crate::media::rtp::{RTP_HEADER_LEN, rewrite_pt_ssrc};

/// A local track with a fixed codec that forwards caller-built RTP packets.
///
/// The binding list is the only state shared between sessions; it lives
/// behind a per-track mutex so concurrent binds and unbinds from different
/// sessions never lose or misplace each other's entries.
#[derive(Debug)]
pub struct TrackLocalStaticRtp {
    codec: RtpCodecCapability,
    id: String,
    stream_id: String,
    kind: RtpCodecKind,
    config: MediaConfig,
    bindings: Mutex<Vec<TrackBinding>>,
}

impl TrackLocalStaticRtp {
    pub fn new(codec: RtpCodecCapability, id: &str, stream_id: &str) -> Self {
        Self::with_config(codec, id, stream_id, MediaConfig::default())
    }

    pub fn with_config(
        codec: RtpCodecCapability,
        id: &str,
        stream_id: &str,
        config: MediaConfig,
    ) -> Self {
        let kind = RtpCodecKind::from_mime_type(&codec.mime_type);
        Self {
            codec,
            id: id.to_string(),
            stream_id: stream_id.to_string(),
            kind,
            config,
            bindings: Mutex::new(Vec::new()),
        }
    }

    /// The codec this track was created with.
    pub fn codec(&self) -> &RtpCodecCapability {
        &self.codec
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Snapshot of the live bindings, in no particular order.
    pub fn bindings(&self) -> Vec<TrackBinding> {
        self.bindings.lock().clone()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.lock().len()
    }

    /// First negotiated codec whose MIME type matches this track's.
    fn select_codec(&self, ctx: &TrackLocalContext) -> Option<RtpCodecParameters> {
        ctx.codec_parameters()
            .iter()
            .find(|c| {
                self.config
                    .mime_match
                    .matches(&self.codec.mime_type, c.mime_type())
            })
            .cloned()
    }

    /// Send `packet` to every bound session, with its payload type and SSRC
    /// rewritten to each session's negotiated values.
    ///
    /// Every binding is attempted even if an earlier one fails; the first
    /// failure is returned. Returns the total bytes written, `0` when no
    /// session is bound.
    pub fn write_rtp(&self, packet: &[u8]) -> Result<usize> {
        if packet.len() < RTP_HEADER_LEN || packet[0] >> 6 != 2 {
            return Err(MediaError::MalformedRtpPacket { len: packet.len() });
        }

        // Write outside the lock so a slow transport never blocks bind/unbind.
        let bindings = self.bindings();
        let mut written = 0;
        let mut first_err = None;
        let mut out = packet.to_vec();

        for binding in &bindings {
            rewrite_pt_ssrc(&mut out, binding.payload_type, binding.ssrc);
            match binding.write_stream.write_rtp(&out) {
                Ok(n) => written += n,
                Err(e) => {
                    tracing::warn!(
                        track_id = %self.id,
                        ssrc = binding.ssrc,
                        error = %e,
                        "RTP write to session failed"
                    );
                    first_err.get_or_insert(e);
                }
            }
        }

        tracing::trace!(track_id = %self.id, sessions = bindings.len(), written, "RTP packet fanned out");

        match first_err {
            Some(e) => Err(e.into()),
            None => Ok(written),
        }
    }
}

impl TrackLocal for TrackLocalStaticRtp {
    fn bind(&self, ctx: &TrackLocalContext) -> Result<RtpCodecParameters> {
        let Some(codec) = self.select_codec(ctx) else {
            tracing::warn!(
                track_id = %self.id,
                session = %ctx.id(),
                mime_type = %self.codec.mime_type,
                "no negotiated codec matches track"
            );
            return Err(MediaError::UnsupportedCodec {
                mime_type: self.codec.mime_type.clone(),
            });
        };

        let mut bindings = self.bindings.lock();
        bindings.push(TrackBinding {
            ssrc: ctx.ssrc(),
            payload_type: codec.payload_type,
            write_stream: ctx.write_stream().clone(),
        });

        tracing::debug!(
            track_id = %self.id,
            session = %ctx.id(),
            ssrc = ctx.ssrc(),
            pt = codec.payload_type,
            bindings = bindings.len(),
            "track bound"
        );
        Ok(codec)
    }

    fn unbind(&self, ctx: &TrackLocalContext) -> Result<()> {
        let mut bindings = self.bindings.lock();
        let Some(pos) = bindings
            .iter()
            .position(|b| b.write_stream == *ctx.write_stream())
        else {
            return Err(MediaError::UnbindFailed);
        };

        let removed = bindings.swap_remove(pos);
        tracing::debug!(
            track_id = %self.id,
            session = %ctx.id(),
            ssrc = removed.ssrc,
            bindings = bindings.len(),
            "track unbound"
        );
        Ok(())
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn stream_id(&self) -> &str {
        &self.stream_id
    }

    fn kind(&self) -> RtpCodecKind {
        self.kind
    }
}
