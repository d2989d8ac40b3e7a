pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod media;
pub mod stats;
pub mod track;

pub use codec::{
    PayloadType, RtcpFeedback, RtpCodecCapability, RtpCodecKind, RtpCodecParameters,
    RtpHeaderExtensionCapability, RtpParameters, Ssrc,
};
pub use config::{MediaConfig, MimeMatch};
pub use engine::MediaEngine;
pub use error::{MediaError, Result};
pub use media::{Packetizer, PacketizerFactory};
pub use stats::{CodecStats, StatsCollector, StatsReport};
pub use track::{
    Sample, TrackBinding, TrackLocal, TrackLocalContext, TrackLocalStaticRtp,
    TrackLocalStaticSample, TrackLocalWriter, WriteStream,
};
