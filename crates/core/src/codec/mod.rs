//! Codec taxonomy and capability model.
//!
//! ## Media kinds
//!
//! Every codec belongs to exactly one [`RtpCodecKind`]: audio or video.
//! The enum also carries [`RtpCodecKind::Unspecified`], the "zero" value
//! produced when a string names neither kind. Registries reject it with
//! [`MediaError::UnknownMediaKind`](crate::MediaError::UnknownMediaKind).
//!
//! ```text
//! "audio" | "AUDIO" | "Audio"  -> Audio
//! "video" | "VIDEO" | "Video"  -> Video
//! anything else                -> Unspecified
//! ```
//!
//! ## MIME types
//!
//! Codecs are named by `media/subtype` strings (e.g. `video/VP8`). The
//! constants below are the spellings used by the default registry.

pub mod capability;

use std::fmt;

pub use capability::{
    RtcpFeedback, RtpCodecCapability, RtpCodecParameters, RtpHeaderExtensionCapability,
    RtpParameters,
};

/// RTP payload type (7-bit on the wire, RFC 3550 §5.1).
pub type PayloadType = u8;

/// Synchronization source identifier (RFC 3550 §8).
pub type Ssrc = u32;

pub const MIME_TYPE_OPUS: &str = "audio/opus";
pub const MIME_TYPE_G722: &str = "audio/G722";
pub const MIME_TYPE_PCMU: &str = "audio/PCMU";
pub const MIME_TYPE_PCMA: &str = "audio/PCMA";
pub const MIME_TYPE_VP8: &str = "video/VP8";
pub const MIME_TYPE_VP9: &str = "video/VP9";
pub const MIME_TYPE_H264: &str = "video/H264";
/// Retransmission shadow codec (RFC 4588).
pub const MIME_TYPE_RTX: &str = "video/rtx";
/// Redundant coding (RFC 2198).
pub const MIME_TYPE_RED: &str = "video/red";
/// Uneven level protection FEC (RFC 5109).
pub const MIME_TYPE_ULPFEC: &str = "video/ulpfec";

const UNKNOWN_KIND: &str = "unknown media kind";

/// Media kind of a codec or track.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RtpCodecKind {
    /// Neither audio nor video. Never valid for registration.
    #[default]
    Unspecified,
    Audio,
    Video,
}

impl RtpCodecKind {
    /// Kind named by the top-level type of a MIME string.
    ///
    /// `"audio/opus"` -> Audio, `"VIDEO/vp8"` -> Video, `"text/plain"` -> Unspecified.
    pub fn from_mime_type(mime_type: &str) -> Self {
        let top = mime_type.split('/').next().unwrap_or_default();
        Self::from(top)
    }

    /// Whether this is a kind registries accept.
    pub fn is_specified(self) -> bool {
        !matches!(self, Self::Unspecified)
    }
}

/// Case-insensitive parse. Unrecognized input maps to
/// [`RtpCodecKind::Unspecified`] rather than an error.
impl From<&str> for RtpCodecKind {
    fn from(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("audio") {
            Self::Audio
        } else if raw.eq_ignore_ascii_case("video") {
            Self::Video
        } else {
            Self::Unspecified
        }
    }
}

impl fmt::Display for RtpCodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
            Self::Unspecified => write!(f, "{UNKNOWN_KIND}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(RtpCodecKind::from("audio"), RtpCodecKind::Audio);
        assert_eq!(RtpCodecKind::from("AUDIO"), RtpCodecKind::Audio);
        assert_eq!(RtpCodecKind::from("Video"), RtpCodecKind::Video);
        assert_eq!(RtpCodecKind::from("vIdEo"), RtpCodecKind::Video);
    }

    #[test]
    fn unknown_strings_map_to_unspecified() {
        assert_eq!(RtpCodecKind::from(""), RtpCodecKind::Unspecified);
        assert_eq!(RtpCodecKind::from("application"), RtpCodecKind::Unspecified);
        assert_eq!(RtpCodecKind::from(" audio"), RtpCodecKind::Unspecified);
    }

    #[test]
    fn display_round_trips_canonical_form() {
        for raw in ["audio", "Audio", "AUDIO", "video", "VIDEO"] {
            let kind = RtpCodecKind::from(raw);
            assert_eq!(kind.to_string(), raw.to_ascii_lowercase());
            assert_eq!(RtpCodecKind::from(kind.to_string().as_str()), kind);
        }
    }

    #[test]
    fn unspecified_display_is_descriptive() {
        let s = RtpCodecKind::Unspecified.to_string();
        assert!(!s.is_empty());
        assert!(s.contains("unknown"));
    }

    #[test]
    fn kind_from_mime_type() {
        assert_eq!(RtpCodecKind::from_mime_type(MIME_TYPE_OPUS), RtpCodecKind::Audio);
        assert_eq!(RtpCodecKind::from_mime_type(MIME_TYPE_H264), RtpCodecKind::Video);
        assert_eq!(RtpCodecKind::from_mime_type("Video/vp8"), RtpCodecKind::Video);
        assert_eq!(
            RtpCodecKind::from_mime_type("application/json"),
            RtpCodecKind::Unspecified
        );
        assert_eq!(RtpCodecKind::from_mime_type(""), RtpCodecKind::Unspecified);
    }

    #[test]
    fn default_is_unspecified() {
        assert!(!RtpCodecKind::default().is_specified());
        assert!(RtpCodecKind::Audio.is_specified());
    }
}
