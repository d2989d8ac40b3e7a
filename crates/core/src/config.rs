/// Default maximum RTP packet size handed to packetizers.
///
/// Leaves headroom below a 1500-byte Ethernet MTU for IP/UDP, SRTP auth
/// tags and header extensions.
pub const DEFAULT_MTU: usize = 1200;

/// How [`bind`](crate::track::TrackLocal::bind) compares the track's MIME
/// type against the session's negotiated MIME types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MimeMatch {
    /// Byte-for-byte equality.
    #[default]
    Exact,
    /// ASCII case-insensitive equality (`audio/OPUS` matches `audio/opus`).
    CaseInsensitive,
}

impl MimeMatch {
    pub fn matches(self, local: &str, negotiated: &str) -> bool {
        match self {
            Self::Exact => local == negotiated,
            Self::CaseInsensitive => local.eq_ignore_ascii_case(negotiated),
        }
    }
}

/// Track-level configuration.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Maximum size of each packet a sample track emits, header included.
    pub mtu: usize,
    /// MIME comparison used during bind.
    pub mime_match: MimeMatch,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            mtu: DEFAULT_MTU,
            mime_match: MimeMatch::Exact,
        }
    }
}
