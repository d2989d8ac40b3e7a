use super::PayloadType;

/// A congestion or loss feedback mechanism a codec supports (RFC 4585 §4.2).
///
/// Rendered in SDP as `a=rtcp-fb:<pt> <type> [<parameter>]`, e.g.
/// `nack pli` or `transport-cc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RtcpFeedback {
    pub typ: String,
    pub parameter: String,
}

impl RtcpFeedback {
    pub fn new(typ: &str, parameter: &str) -> Self {
        Self {
            typ: typ.to_string(),
            parameter: parameter.to_string(),
        }
    }
}

/// The negotiable properties of a codec.
///
/// Equality is structural: two capabilities with the same fields are equal
/// regardless of where they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtpCodecCapability {
    /// `media/subtype`, e.g. `audio/opus`.
    pub mime_type: String,
    /// RTP clock rate in Hz.
    pub clock_rate: u32,
    /// Channel count. Only meaningful for audio.
    pub channels: u16,
    /// Format parameters (`a=fmtp`), e.g. `minptime=10;useinbandfec=1`.
    pub sdp_fmtp_line: String,
    pub rtcp_feedback: Vec<RtcpFeedback>,
}

impl RtpCodecCapability {
    pub fn new(mime_type: &str, clock_rate: u32, channels: u16) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            clock_rate,
            channels,
            ..Default::default()
        }
    }

    pub fn with_fmtp(mut self, sdp_fmtp_line: &str) -> Self {
        self.sdp_fmtp_line = sdp_fmtp_line.to_string();
        self
    }

    pub fn with_feedback(mut self, rtcp_feedback: Vec<RtcpFeedback>) -> Self {
        self.rtcp_feedback = rtcp_feedback;
        self
    }
}

/// An RFC 5285 header extension, identified only by its URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RtpHeaderExtensionCapability {
    pub uri: String,
}

impl RtpHeaderExtensionCapability {
    pub fn new(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
        }
    }
}

/// A codec capability together with its payload type.
///
/// Until `negotiated` is set the payload type is only a local preference;
/// after an offer/answer round confirms it, it is final for that session.
///
/// `stats_id` is assigned once by
/// [`MediaEngine::register_codec`](crate::MediaEngine::register_codec) and
/// never recomputed. Entries built directly (e.g. by a negotiation layer)
/// carry an empty id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtpCodecParameters {
    pub capability: RtpCodecCapability,
    pub payload_type: PayloadType,
    negotiated: bool,
    stats_id: String,
}

impl RtpCodecParameters {
    pub fn new(capability: RtpCodecCapability, payload_type: PayloadType) -> Self {
        Self {
            capability,
            payload_type,
            negotiated: false,
            stats_id: String::new(),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.capability.mime_type
    }

    pub fn clock_rate(&self) -> u32 {
        self.capability.clock_rate
    }

    /// Whether the payload type has been confirmed by both endpoints.
    pub fn is_negotiated(&self) -> bool {
        self.negotiated
    }

    /// Record that an offer/answer round confirmed this payload type.
    pub fn mark_negotiated(&mut self) {
        self.negotiated = true;
    }

    /// Stable identifier used for stats reporting.
    pub fn stats_id(&self) -> &str {
        &self.stats_id
    }

    pub(crate) fn with_stats_id(mut self, stats_id: String) -> Self {
        self.stats_id = stats_id;
        self
    }
}

/// Codecs and header extensions offered for one media kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtpParameters {
    pub header_extensions: Vec<RtpHeaderExtensionCapability>,
    pub codecs: Vec<RtpCodecCapability>,
}
