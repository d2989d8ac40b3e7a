//! Local tracks and their bindings to negotiated sessions.
//!
//! A local track is a long-lived media source identified by `(id, stream_id)`.
//! Once a session (peer connection) finishes negotiation it calls
//! [`TrackLocal::bind`] with a [`TrackLocalContext`] describing what it
//! negotiated. The track picks its codec from that list and records a
//! [`TrackBinding`]: the session's SSRC, the negotiated payload type, and
//! the session's [`WriteStream`].
//!
//! ## Binding lifecycle (per track, per session)
//!
//! ```text
//! Unbound --bind(ctx)--> Bound         (codec MIME type found in ctx)
//! Unbound --bind(ctx)--> Unbound       (UnsupportedCodec, nothing recorded)
//! Bound   --unbind(ctx)--> Unbound     (binding keyed by ctx.write_stream)
//! Unbound --unbind(ctx)--> Unbound     (UnbindFailed)
//! ```
//!
//! One track may be bound to many sessions at once. Bindings are keyed by
//! write-stream identity, never by SSRC or by value, so two sessions that
//! happen to share an SSRC stay distinct. Binding order carries no meaning.
//!
//! Two track flavours exist:
//! - [`TrackLocalStaticRtp`]: the caller writes finished RTP packets.
//! - [`TrackLocalStaticSample`]: wraps a `TrackLocalStaticRtp` and
//!   packetizes encoded samples itself.

pub mod static_rtp;
pub mod static_sample;

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::codec::{PayloadType, RtpCodecKind, RtpCodecParameters, Ssrc};
use crate::error::Result;

pub use static_rtp::TrackLocalStaticRtp;
pub use static_sample::{Sample, TrackLocalStaticSample};

/// Capabilities shared by every local track.
pub trait TrackLocal: Send + Sync {
    /// Attach to a session. Returns the negotiated codec the track selected.
    fn bind(&self, ctx: &TrackLocalContext) -> Result<RtpCodecParameters>;

    /// Detach from the session identified by `ctx.write_stream()`.
    fn unbind(&self, ctx: &TrackLocalContext) -> Result<()>;

    fn id(&self) -> &str;

    fn stream_id(&self) -> &str;

    fn kind(&self) -> RtpCodecKind;
}

/// Sink for a session's outbound RTP, owned by the transport layer.
pub trait TrackLocalWriter: Send + Sync {
    /// Send one serialized RTP packet. Returns the bytes written.
    fn write_rtp(&self, packet: &[u8]) -> io::Result<usize>;
}

/// Opaque handle to a session's write channel.
///
/// Equality is identity: two handles are equal only when they point at the
/// same writer allocation, however alike the writers look.
#[derive(Clone)]
pub struct WriteStream(Arc<dyn TrackLocalWriter>);

impl WriteStream {
    pub fn new(writer: Arc<dyn TrackLocalWriter>) -> Self {
        Self(writer)
    }

    pub fn write_rtp(&self, packet: &[u8]) -> io::Result<usize> {
        self.0.write_rtp(packet)
    }
}

impl PartialEq for WriteStream {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl Eq for WriteStream {}

impl fmt::Debug for WriteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WriteStream({:p})", Arc::as_ptr(&self.0) as *const ())
    }
}

/// What one session negotiated, handed to a track on bind and unbind.
#[derive(Debug, Clone)]
pub struct TrackLocalContext {
    id: String,
    ssrc: Ssrc,
    codec_parameters: Vec<RtpCodecParameters>,
    write_stream: WriteStream,
}

impl TrackLocalContext {
    /// `id` names the session in logs; it plays no part in matching.
    pub fn new(
        id: &str,
        ssrc: Ssrc,
        codec_parameters: Vec<RtpCodecParameters>,
        write_stream: WriteStream,
    ) -> Self {
        Self {
            id: id.to_string(),
            ssrc,
            codec_parameters,
            write_stream,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn ssrc(&self) -> Ssrc {
        self.ssrc
    }

    /// Final negotiated codecs for the session, in preference order.
    pub fn codec_parameters(&self) -> &[RtpCodecParameters] {
        &self.codec_parameters
    }

    pub fn write_stream(&self) -> &WriteStream {
        &self.write_stream
    }
}

/// Outcome of one successful bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackBinding {
    pub ssrc: Ssrc,
    pub payload_type: PayloadType,
    pub write_stream: WriteStream,
}
