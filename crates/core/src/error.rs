//! Error types for the codec registry and track binding layer.

use crate::codec::{PayloadType, RtpCodecKind};

/// Errors that can occur in the media layer.
///
/// Every error is scoped to the single call that produced it; none of them
/// are retried internally.
///
/// - **Registry**: [`UnknownMediaKind`](Self::UnknownMediaKind),
///   [`CodecNotFound`](Self::CodecNotFound).
/// - **Binding**: [`UnsupportedCodec`](Self::UnsupportedCodec),
///   [`UnbindFailed`](Self::UnbindFailed).
/// - **Writing**: [`TrackNotBound`](Self::TrackNotBound),
///   [`MalformedSample`](Self::MalformedSample),
///   [`MalformedRtpPacket`](Self::MalformedRtpPacket), [`Io`](Self::Io).
/// - **Telemetry**: [`StatsCollector`](Self::StatsCollector).
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// A registration or lookup named a kind other than audio or video.
    #[error("unknown media kind")]
    UnknownMediaKind,

    /// No registered codec uses this payload type.
    #[error("codec not found: payload type {payload_type} ({kind})")]
    CodecNotFound {
        payload_type: PayloadType,
        kind: RtpCodecKind,
    },

    /// The session negotiated no codec with the track's MIME type.
    #[error("unsupported codec: {mime_type}")]
    UnsupportedCodec { mime_type: String },

    /// Unbind found no binding for the session's write stream.
    #[error("failed to unbind track: no binding for this write stream")]
    UnbindFailed,

    /// A sample was written while the track had no live binding.
    #[error("track is not bound to any session")]
    TrackNotBound,

    /// A non-empty sample produced no RTP packets, e.g. H.264 data without
    /// an Annex B start code.
    #[error("malformed {codec} sample ({len} bytes)")]
    MalformedSample { codec: &'static str, len: usize },

    /// A raw write was given bytes that are not an RTP packet (RFC 3550 §5.1).
    #[error("malformed RTP packet ({len} bytes)")]
    MalformedRtpPacket { len: usize },

    /// A stats collector rejected a report.
    #[error("stats collector error: {0}")]
    StatsCollector(String),

    /// The session's write stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result<T, MediaError>`.
pub type Result<T> = std::result::Result<T, MediaError>;
