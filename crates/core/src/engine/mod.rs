//! Codec and header-extension capability registry.
//!
//! A [`MediaEngine`] holds, per media kind, the ordered list of codecs this
//! endpoint supports and the set of header extensions it understands. The
//! negotiation layer reads it to build offers and to interpret answers.
//!
//! ## Lifecycle
//!
//! ```text
//! MediaEngine::new()            -> empty
//! register_* (&mut self)        -> single writer, any number of calls
//! into_shared() -> Arc<Self>    -> sealed: shared reads only
//! ```
//!
//! Registration takes `&mut self`, so the borrow checker already keeps it
//! from racing with reads. Once the engine is wrapped in an `Arc` it can
//! be handed to any number of sessions and read without locking.
//!
//! ## Ordering
//!
//! Registration order is preference order: the first codec registered for
//! a kind is the most preferred. The registry does not deduplicate codecs;
//! registering the same capability twice yields two entries with distinct
//! stats ids.

mod defaults;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use crate::codec::{
    PayloadType, RtpCodecCapability, RtpCodecKind, RtpCodecParameters,
    RtpHeaderExtensionCapability, RtpParameters,
};
use crate::error::{MediaError, Result};
use crate::stats::{CodecStats, StatsCollector};

static CODEC_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Next stats id. Unique for the life of the process, so unique across
/// every engine as well.
fn next_stats_id() -> String {
    let n = CODEC_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("RTPCodec-{}", n)
}

/// The codecs and header extensions supported by a peer connection.
#[derive(Debug, Default, Clone)]
pub struct MediaEngine {
    audio_codecs: Vec<RtpCodecParameters>,
    video_codecs: Vec<RtpCodecParameters>,
    audio_header_extensions: Vec<RtpHeaderExtensionCapability>,
    video_header_extensions: Vec<RtpHeaderExtensionCapability>,
}

impl MediaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seal the engine for concurrent reads.
    pub fn into_shared(self) -> Arc<Self> {
        tracing::debug!(
            audio_codecs = self.audio_codecs.len(),
            video_codecs = self.video_codecs.len(),
            "media engine sealed"
        );
        Arc::new(self)
    }

    /// Register the default codec and header-extension set.
    ///
    /// The table lives in `engine/defaults.rs`; its contents are what remote
    /// peers expect to see offered. Calling this twice registers every codec
    /// twice.
    pub fn register_default_codecs(&mut self) -> Result<()> {
        for codec in defaults::audio_codecs() {
            self.register_parameters(codec, RtpCodecKind::Audio)?;
        }
        for uri in defaults::AUDIO_HEADER_EXTENSIONS {
            self.register_header_extension(
                RtpHeaderExtensionCapability::new(uri),
                RtpCodecKind::Audio,
            )?;
        }

        for codec in defaults::video_codecs() {
            self.register_parameters(codec, RtpCodecKind::Video)?;
        }
        for uri in defaults::VIDEO_HEADER_EXTENSIONS {
            self.register_header_extension(
                RtpHeaderExtensionCapability::new(uri),
                RtpCodecKind::Video,
            )?;
        }

        tracing::info!(
            audio_codecs = self.audio_codecs.len(),
            video_codecs = self.video_codecs.len(),
            "default codecs registered"
        );
        Ok(())
    }

    /// Append a codec to the registry for `kind` with `payload_type` as its
    /// preferred payload type.
    ///
    /// Returns the stats id assigned to the new entry.
    pub fn register_codec(
        &mut self,
        capability: RtpCodecCapability,
        payload_type: PayloadType,
        kind: RtpCodecKind,
    ) -> Result<String> {
        self.register_parameters(RtpCodecParameters::new(capability, payload_type), kind)
    }

    /// Append prepared codec parameters. A fresh stats id replaces whatever
    /// id the parameters carried.
    pub fn register_parameters(
        &mut self,
        codec: RtpCodecParameters,
        kind: RtpCodecKind,
    ) -> Result<String> {
        let codecs = match kind {
            RtpCodecKind::Audio => &mut self.audio_codecs,
            RtpCodecKind::Video => &mut self.video_codecs,
            RtpCodecKind::Unspecified => return Err(MediaError::UnknownMediaKind),
        };

        let stats_id = next_stats_id();
        tracing::debug!(
            %kind,
            pt = codec.payload_type,
            mime_type = %codec.mime_type(),
            stats_id = %stats_id,
            "codec registered"
        );
        codecs.push(codec.with_stats_id(stats_id.clone()));
        Ok(stats_id)
    }

    /// Add a header extension for `kind`. Registering a URI that is already
    /// present for that kind is a no-op.
    pub fn register_header_extension(
        &mut self,
        extension: RtpHeaderExtensionCapability,
        kind: RtpCodecKind,
    ) -> Result<()> {
        let extensions = match kind {
            RtpCodecKind::Audio => &mut self.audio_header_extensions,
            RtpCodecKind::Video => &mut self.video_header_extensions,
            RtpCodecKind::Unspecified => return Err(MediaError::UnknownMediaKind),
        };

        if extensions.iter().any(|e| e.uri == extension.uri) {
            tracing::trace!(%kind, uri = %extension.uri, "header extension already registered");
            return Ok(());
        }

        tracing::debug!(%kind, uri = %extension.uri, "header extension registered");
        extensions.push(extension);
        Ok(())
    }

    /// Registered codecs for `kind`, most preferred first. Empty for
    /// [`RtpCodecKind::Unspecified`].
    pub fn codecs_by_kind(&self, kind: RtpCodecKind) -> &[RtpCodecParameters] {
        match kind {
            RtpCodecKind::Audio => &self.audio_codecs,
            RtpCodecKind::Video => &self.video_codecs,
            RtpCodecKind::Unspecified => &[],
        }
    }

    /// Registered header extensions for `kind`. Empty for
    /// [`RtpCodecKind::Unspecified`].
    pub fn header_extensions_by_kind(&self, kind: RtpCodecKind) -> &[RtpHeaderExtensionCapability] {
        match kind {
            RtpCodecKind::Audio => &self.audio_header_extensions,
            RtpCodecKind::Video => &self.video_header_extensions,
            RtpCodecKind::Unspecified => &[],
        }
    }

    /// Everything offered for `kind`, in the shape an offer generator wants.
    pub fn rtp_parameters_by_kind(&self, kind: RtpCodecKind) -> RtpParameters {
        RtpParameters {
            header_extensions: self.header_extensions_by_kind(kind).to_vec(),
            codecs: self
                .codecs_by_kind(kind)
                .iter()
                .map(|c| c.capability.clone())
                .collect(),
        }
    }

    /// First registered codec for `kind` using `payload_type`.
    ///
    /// If several entries share a payload type, the earliest registration
    /// wins.
    pub fn lookup_codec(
        &self,
        payload_type: PayloadType,
        kind: RtpCodecKind,
    ) -> Result<RtpCodecParameters> {
        self.codecs_by_kind(kind)
            .iter()
            .find(|c| c.payload_type == payload_type)
            .cloned()
            .ok_or(MediaError::CodecNotFound { payload_type, kind })
    }

    /// Push a snapshot of every registered video codec into `collector`.
    ///
    /// Collector failures are logged and otherwise ignored.
    pub fn collect_stats(&self, collector: &dyn StatsCollector) {
        for codec in &self.video_codecs {
            let stats = CodecStats {
                timestamp: SystemTime::now(),
                id: codec.stats_id().to_string(),
                payload_type: codec.payload_type,
                mime_type: codec.capability.mime_type.clone(),
                clock_rate: codec.capability.clock_rate,
                channels: u8::try_from(codec.capability.channels).unwrap_or(u8::MAX),
                sdp_fmtp_line: codec.capability.sdp_fmtp_line.clone(),
            };

            if let Err(e) = collector.collect(codec.stats_id(), stats) {
                tracing::warn!(stats_id = %codec.stats_id(), error = %e, "stats collector rejected codec report");
            }
        }
    }
}
