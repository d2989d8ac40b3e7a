//! Default codec and header-extension table.
//!
//! These values are what remote WebRTC peers expect a browser-compatible
//! endpoint to offer. Order is preference order and payload types are the
//! conventional ones, so changing either changes generated offers.

use crate::codec::{
    MIME_TYPE_G722, MIME_TYPE_H264, MIME_TYPE_OPUS, MIME_TYPE_PCMA, MIME_TYPE_PCMU, MIME_TYPE_RED,
    MIME_TYPE_RTX, MIME_TYPE_ULPFEC, MIME_TYPE_VP8, MIME_TYPE_VP9, PayloadType, RtcpFeedback,
    RtpCodecCapability, RtpCodecParameters,
};

pub(super) const AUDIO_HEADER_EXTENSIONS: [&str; 6] = [
    "urn:ietf:params:rtp-hdrext:ssrc-audio-level",
    "http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time",
    "http://www.ietf.org/id/draft-holmer-rmcat-transport-wide-cc-extensions-01",
    "urn:ietf:params:rtp-hdrext:sdes:mid",
    "urn:ietf:params:rtp-hdrext:sdes:rtp-stream-id",
    "urn:ietf:params:rtp-hdrext:sdes:repaired-rtp-stream-id",
];

pub(super) const VIDEO_HEADER_EXTENSIONS: [&str; 11] = [
    "urn:ietf:params:rtp-hdrext:toffset",
    "http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time",
    "urn:3gpp:video-orientation",
    "http://www.ietf.org/id/draft-holmer-rmcat-transport-wide-cc-extensions-01",
    "http://www.webrtc.org/experiments/rtp-hdrext/playout-delay",
    "http://www.webrtc.org/experiments/rtp-hdrext/video-content-type",
    "http://www.webrtc.org/experiments/rtp-hdrext/video-timing",
    "http://www.webrtc.org/experiments/rtp-hdrext/color-space",
    "urn:ietf:params:rtp-hdrext:sdes:mid",
    "urn:ietf:params:rtp-hdrext:sdes:rtp-stream-id",
    "urn:ietf:params:rtp-hdrext:sdes:repaired-rtp-stream-id",
];

const VIDEO_CLOCK_RATE: u32 = 90000;

/// `(mime_type, fmtp, payload_type)` in preference order.
const VIDEO_TABLE: [(&str, &str, PayloadType); 21] = [
    (MIME_TYPE_VP8, "", 96),
    (MIME_TYPE_RTX, "apt=96", 97),
    (MIME_TYPE_VP9, "profile-id=0", 98),
    (MIME_TYPE_RTX, "apt=98", 99),
    (MIME_TYPE_VP9, "profile-id=1", 100),
    (MIME_TYPE_RTX, "apt=100", 101),
    (
        MIME_TYPE_H264,
        "level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42001f",
        102,
    ),
    (MIME_TYPE_RTX, "apt=102", 121),
    (
        MIME_TYPE_H264,
        "level-asymmetry-allowed=1;packetization-mode=0;profile-level-id=42001f",
        127,
    ),
    (MIME_TYPE_RTX, "apt=127", 120),
    (
        MIME_TYPE_H264,
        "level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=42e01f",
        125,
    ),
    (MIME_TYPE_RTX, "apt=125", 107),
    (
        MIME_TYPE_H264,
        "level-asymmetry-allowed=1;packetization-mode=0;profile-level-id=42e01f",
        108,
    ),
    (MIME_TYPE_RTX, "apt=108", 109),
    // Published tables list this pair twice; peers tolerate it and lookups
    // resolve to the first occurrence.
    (
        MIME_TYPE_H264,
        "level-asymmetry-allowed=1;packetization-mode=0;profile-level-id=42001f",
        127,
    ),
    (MIME_TYPE_RTX, "apt=127", 120),
    (
        MIME_TYPE_H264,
        "level-asymmetry-allowed=1;packetization-mode=1;profile-level-id=640032",
        123,
    ),
    (MIME_TYPE_RTX, "apt=123", 118),
    (MIME_TYPE_RED, "", 114),
    (MIME_TYPE_RTX, "apt=114", 115),
    (MIME_TYPE_ULPFEC, "", 116),
];

/// Feedback attached to every video entry: REMB, transport-wide CC,
/// full intra request, generic NACK and PLI.
pub fn video_rtcp_feedback() -> Vec<RtcpFeedback> {
    vec![
        RtcpFeedback::new("goog-remb", ""),
        RtcpFeedback::new("transport-cc", ""),
        RtcpFeedback::new("ccm", "fir"),
        RtcpFeedback::new("nack", ""),
        RtcpFeedback::new("nack", "pli"),
    ]
}

pub(super) fn audio_codecs() -> Vec<RtpCodecParameters> {
    vec![
        RtpCodecParameters::new(
            RtpCodecCapability::new(MIME_TYPE_OPUS, 48000, 2)
                .with_fmtp("minptime=10;useinbandfec=1")
                .with_feedback(vec![RtcpFeedback::new("transport-cc", "")]),
            111,
        ),
        RtpCodecParameters::new(RtpCodecCapability::new(MIME_TYPE_G722, 8000, 1), 9),
        RtpCodecParameters::new(RtpCodecCapability::new(MIME_TYPE_PCMU, 8000, 1), 0),
        RtpCodecParameters::new(RtpCodecCapability::new(MIME_TYPE_PCMA, 8000, 1), 8),
    ]
}

pub(super) fn video_codecs() -> Vec<RtpCodecParameters> {
    VIDEO_TABLE
        .iter()
        .map(|&(mime_type, fmtp, payload_type)| {
            RtpCodecParameters::new(
                RtpCodecCapability::new(mime_type, VIDEO_CLOCK_RATE, 1)
                    .with_fmtp(fmtp)
                    .with_feedback(video_rtcp_feedback()),
                payload_type,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RtpCodecKind;
    use crate::engine::MediaEngine;

    fn engine() -> MediaEngine {
        let mut m = MediaEngine::new();
        m.register_default_codecs().unwrap();
        m
    }

    #[test]
    fn audio_table() {
        let m = engine();
        let audio: Vec<_> = m
            .codecs_by_kind(RtpCodecKind::Audio)
            .iter()
            .map(|c| (c.mime_type(), c.clock_rate(), c.payload_type))
            .collect();
        assert_eq!(
            audio,
            vec![
                (MIME_TYPE_OPUS, 48000, 111),
                (MIME_TYPE_G722, 8000, 9),
                (MIME_TYPE_PCMU, 8000, 0),
                (MIME_TYPE_PCMA, 8000, 8),
            ]
        );

        let opus = m.lookup_codec(111, RtpCodecKind::Audio).unwrap();
        assert_eq!(opus.capability.channels, 2);
        assert_eq!(opus.capability.sdp_fmtp_line, "minptime=10;useinbandfec=1");
    }

    #[test]
    fn video_codecs_registered_as_video() {
        let m = engine();
        let video = m.codecs_by_kind(RtpCodecKind::Video);
        assert_eq!(video.len(), VIDEO_TABLE.len());
        assert!(video.iter().all(|c| c.mime_type().starts_with("video/")));
        assert!(
            m.codecs_by_kind(RtpCodecKind::Audio)
                .iter()
                .all(|c| c.mime_type().starts_with("audio/"))
        );
    }

    #[test]
    fn every_video_entry_carries_feedback_set() {
        let m = engine();
        for codec in m.codecs_by_kind(RtpCodecKind::Video) {
            assert_eq!(codec.capability.rtcp_feedback, video_rtcp_feedback());
            assert_eq!(codec.clock_rate(), 90000);
        }
        let fb = video_rtcp_feedback();
        assert!(fb.contains(&RtcpFeedback::new("nack", "pli")));
        assert!(fb.contains(&RtcpFeedback::new("ccm", "fir")));
    }

    #[test]
    fn video_table_contents() {
        let m = engine();
        let vp8 = m.lookup_codec(96, RtpCodecKind::Video).unwrap();
        assert_eq!(vp8.mime_type(), MIME_TYPE_VP8);

        let vp9_profiles: Vec<_> = m
            .codecs_by_kind(RtpCodecKind::Video)
            .iter()
            .filter(|c| c.mime_type() == MIME_TYPE_VP9)
            .map(|c| c.capability.sdp_fmtp_line.as_str())
            .collect();
        assert_eq!(vp9_profiles, vec!["profile-id=0", "profile-id=1"]);

        let h264 = m.lookup_codec(102, RtpCodecKind::Video).unwrap();
        assert!(h264.capability.sdp_fmtp_line.contains("profile-level-id=42001f"));

        let rtx = m.lookup_codec(97, RtpCodecKind::Video).unwrap();
        assert_eq!(rtx.mime_type(), MIME_TYPE_RTX);
        assert_eq!(rtx.capability.sdp_fmtp_line, "apt=96");

        assert_eq!(m.lookup_codec(114, RtpCodecKind::Video).unwrap().mime_type(), MIME_TYPE_RED);
        assert_eq!(
            m.lookup_codec(116, RtpCodecKind::Video).unwrap().mime_type(),
            MIME_TYPE_ULPFEC
        );
    }

    #[test]
    fn repeated_entry_resolves_to_first() {
        let m = engine();
        let video = m.codecs_by_kind(RtpCodecKind::Video);
        let positions: Vec<_> = video
            .iter()
            .enumerate()
            .filter(|(_, c)| c.payload_type == 127)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(positions.len(), 2);

        let found = m.lookup_codec(127, RtpCodecKind::Video).unwrap();
        assert_eq!(found.stats_id(), video[positions[0]].stats_id());
    }

    #[test]
    fn header_extensions() {
        let m = engine();
        assert_eq!(
            m.header_extensions_by_kind(RtpCodecKind::Audio).len(),
            AUDIO_HEADER_EXTENSIONS.len()
        );
        assert_eq!(
            m.header_extensions_by_kind(RtpCodecKind::Video).len(),
            VIDEO_HEADER_EXTENSIONS.len()
        );
        assert_eq!(
            m.header_extensions_by_kind(RtpCodecKind::Audio)[0].uri,
            "urn:ietf:params:rtp-hdrext:ssrc-audio-level"
        );
    }

    #[test]
    fn default_stats_ids_unique() {
        let m = engine();
        let mut ids: Vec<_> = m
            .codecs_by_kind(RtpCodecKind::Audio)
            .iter()
            .chain(m.codecs_by_kind(RtpCodecKind::Video))
            .map(|c| c.stats_id().to_string())
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
